//! Export artifacts and the sinks that publish them
//!
//! The engine computes everything in memory; the sink write is the only
//! I/O. `DirectorySink` publishes atomically by writing to a temp file in
//! the target directory and renaming it into place, so readers never see
//! a partial artifact and a failed publish leaves earlier artifacts
//! untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

/// A finished, self-contained export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Identifier; doubles as the output file stem.
    pub id: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            bytes,
        }
    }

    /// File name the artifact is published under.
    pub fn file_name(&self) -> String {
        format!("{}.html", self.id)
    }
}

/// Publishing an artifact failed; the destination is left unchanged.
#[derive(Debug, Error)]
#[error("failed to publish artifact '{artifact}' to {}", path.display())]
pub struct SinkError {
    pub artifact: String,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Destination for finished artifacts.
pub trait ArtifactSink {
    fn publish(&self, artifact: &Artifact) -> Result<(), SinkError>;
}

/// Publishes artifacts as files in a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn try_publish(&self, artifact: &Artifact) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let dest = self.dir.join(artifact.file_name());
        // Temp file lives in the destination directory so the final
        // rename stays on one filesystem and is atomic.
        let tmp = self.dir.join(format!(".{}.tmp", artifact.file_name()));
        fs::write(&tmp, &artifact.bytes)?;
        if let Err(e) = fs::rename(&tmp, &dest) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(dest)
    }
}

impl ArtifactSink for DirectorySink {
    fn publish(&self, artifact: &Artifact) -> Result<(), SinkError> {
        let dest = self.try_publish(artifact).map_err(|source| SinkError {
            artifact: artifact.id.clone(),
            path: self.dir.join(artifact.file_name()),
            source,
        })?;
        info!(
            "published artifact '{}' ({} bytes) to {}",
            artifact.id,
            artifact.bytes.len(),
            dest.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mapdoc-sink-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn test_publish_writes_exact_bytes() {
        let dir = scratch_dir("bytes");
        let sink = DirectorySink::new(&dir);
        let artifact = Artifact::new("demo", b"<html>ok</html>".to_vec());
        sink.publish(&artifact).unwrap();

        let written = fs::read(dir.join("demo.html")).unwrap();
        assert_eq!(written, artifact.bytes);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_publish_leaves_no_temp_file() {
        let dir = scratch_dir("tmp");
        let sink = DirectorySink::new(&dir);
        sink.publish(&Artifact::new("demo", vec![1, 2, 3])).unwrap();

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_republish_replaces_previous_artifact() {
        let dir = scratch_dir("replace");
        let sink = DirectorySink::new(&dir);
        sink.publish(&Artifact::new("demo", b"first".to_vec()))
            .unwrap();
        sink.publish(&Artifact::new("demo", b"second".to_vec()))
            .unwrap();
        assert_eq!(fs::read(dir.join("demo.html")).unwrap(), b"second");
        fs::remove_dir_all(&dir).unwrap();
    }
}
