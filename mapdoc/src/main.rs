//! mapdoc - layer composition and map export engine
//!
//! A CLI tool for composing layered map documents and exporting them as
//! self-contained Leaflet HTML artifacts.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::enum_variant_names)]

mod cli;
mod map_config;

// Core data model
mod document;
mod feature;
mod geometry;
mod layer;
mod registry;

// Pipeline stages
mod artifact;
mod bounds;
mod html_exporter;
mod pipeline;
mod resolver;

// Built-in demo suite
mod showcase;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

use crate::artifact::{ArtifactSink, DirectorySink};
use crate::html_exporter::DocumentExporter;
use crate::map_config::MapConfig;

/// Main entry point for the mapdoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            output,
            config,
            verbose,
        } => {
            init_logging(verbose);
            handle_build_command(output, config)?;
        }

        Commands::Index { dir, verbose } => {
            init_logging(verbose);
            handle_index_command(dir)?;
        }
    }

    Ok(())
}

/// Initialize logging for verbose runs
fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
}

/// Handle the build command
fn handle_build_command(output: std::path::PathBuf, config: std::path::PathBuf) -> Result<()> {
    let config = MapConfig::load_or_default(&config)
        .with_context(|| format!("Failed to load configuration from {}", config.display()))?;

    println!("Building map documents...");
    println!("Output: {}", output.display());

    let documents = showcase::documents();
    let calculator = config.bounds_calculator();
    let exporter = config.exporter();

    println!("\n[Stage 1/2] Exporting {} documents...", documents.len());
    let artifacts = pipeline::build_artifacts(&documents, &calculator, &exporter)
        .context("Failed to export showcase documents")?;
    println!("✓ Exported {} artifacts", artifacts.len());

    println!("\n[Stage 2/2] Publishing to {}...", output.display());
    let sink = DirectorySink::new(&output);
    pipeline::publish_artifacts(&artifacts, &sink)
        .with_context(|| format!("Failed to publish artifacts to {}", output.display()))?;

    let index = exporter.export_index(&artifacts);
    sink.publish(&index)
        .with_context(|| format!("Failed to publish index to {}", output.display()))?;
    println!("✓ Published {} artifacts plus index.html", artifacts.len());

    println!("\n✓ Build completed successfully!");

    Ok(())
}

/// Handle the index command
fn handle_index_command(dir: std::path::PathBuf) -> Result<()> {
    println!("Rebuilding navigation page...");
    println!("Directory: {}", dir.display());

    let ids = pipeline::scan_artifact_ids(&dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    println!("Found {} artifacts", ids.len());

    let index = DocumentExporter::default().export_index_from_ids(&ids);
    DirectorySink::new(&dir)
        .publish(&index)
        .with_context(|| format!("Failed to publish index to {}", dir.display()))?;
    println!("✓ Wrote index.html");

    Ok(())
}
