//! Four-stage document pipeline
//!
//! This module orchestrates the stages every artifact goes through:
//! 1. **Resolution**: validate references and freeze the document
//! 2. **Framing**: decide the initial viewport
//! 3. **Export**: render the self-contained HTML artifact
//! 4. **Publish**: hand the artifact to a sink
//!
//! Stages 1-3 are pure and in-memory; only publishing touches the
//! filesystem.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::artifact::{Artifact, ArtifactSink, SinkError};
use crate::bounds::BoundsCalculator;
use crate::document::MapDocument;
use crate::html_exporter::{DocumentExporter, ExportError};
use crate::resolver::{ReferenceResolver, ResolutionError, ResolvedDocument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pipeline errors, tagged with the document that failed
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to resolve document '{0}': {1}")]
    Resolution(String, #[source] ResolutionError),

    #[error("failed to export document '{0}': {1}")]
    Export(String, #[source] ExportError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("error scanning artifact directory {path}: {source}", path = .0.display(), source = .1)]
    Scan(PathBuf, #[source] std::io::Error),
}

/// Stages 1 and 2: resolve a document and frame its viewport
///
/// # Parameters
/// * `document` - The live document to freeze
/// * `calculator` - Framing defaults for degenerate geometry
///
/// # Returns
/// * `Ok(ResolvedDocument)` - A frozen view with its viewport decided
/// * `Err(PipelineError)` - Any reference or invariant failure; nothing
///   is exported for this document
pub fn compose(
    document: &MapDocument,
    calculator: &BoundsCalculator,
) -> Result<ResolvedDocument, PipelineError> {
    let mut resolved = ReferenceResolver::new()
        .resolve(document)
        .map_err(|e| PipelineError::Resolution(document.id().to_string(), e))?;
    calculator.frame(&mut resolved);
    Ok(resolved)
}

/// Stages 1-3 for a single document
pub fn build_artifact(
    document: &MapDocument,
    calculator: &BoundsCalculator,
    exporter: &DocumentExporter,
) -> Result<Artifact, PipelineError> {
    let resolved = compose(document, calculator)?;
    exporter
        .export(&resolved)
        .map_err(|e| PipelineError::Export(document.id().to_string(), e))
}

/// Stages 1-3 for a batch of documents (optionally in parallel)
///
/// Documents are independent, so the batch fails on the first error but
/// never produces a partial artifact for the failing document. Output
/// order matches input order regardless of the `parallel` feature.
pub fn build_artifacts(
    documents: &[MapDocument],
    calculator: &BoundsCalculator,
    exporter: &DocumentExporter,
) -> Result<Vec<Artifact>, PipelineError> {
    #[cfg(feature = "parallel")]
    let artifacts: Result<Vec<_>, _> = documents
        .par_iter()
        .map(|doc| build_artifact(doc, calculator, exporter))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let artifacts: Result<Vec<_>, _> = documents
        .iter()
        .map(|doc| build_artifact(doc, calculator, exporter))
        .collect();

    artifacts
}

/// Stage 4: publish a batch of artifacts to a sink
///
/// Publishing is sequential; the sink write is the only I/O in the
/// whole pipeline. A failure leaves earlier artifacts in place.
pub fn publish_artifacts<S: ArtifactSink>(
    artifacts: &[Artifact],
    sink: &S,
) -> Result<(), PipelineError> {
    for artifact in artifacts {
        sink.publish(artifact)?;
    }
    Ok(())
}

/// Collect the artifact identifiers already published in a directory
///
/// Walks `dir` for `*.html` files and returns their stems, excluding the
/// navigation page itself. Used by the `index` command to regenerate the
/// navigation page without rebuilding any document.
pub fn scan_artifact_ids(dir: &Path) -> Result<Vec<String>, PipelineError> {
    let mut ids = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1).follow_links(false) {
        let entry = entry
            .map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error"));
                PipelineError::Scan(dir.to_path_buf(), source)
            })?;
        if !entry.path().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|s| s.to_str()) != Some("html") {
            continue;
        }
        let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem == "index" || stem.starts_with('.') {
            continue;
        }
        ids.push(stem.to_string());
    }
    Ok(ids)
}
