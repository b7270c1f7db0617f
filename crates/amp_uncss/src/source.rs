use crate::error::DocumentError;
use std::fs;
use std::path::{Path, PathBuf};

/// One input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name used in reports and for the output path.
    pub name: String,
    /// Location on disk; the browser navigates here directly when set.
    pub path: Option<PathBuf>,
    pub contents: Vec<u8>,
}

impl SourceDocument {
    /// Read a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Resource`] if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let contents = fs::read(path)
            .map_err(|err| DocumentError::Resource(format!("cannot read {}: {err}", path.display())))?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            contents,
        })
    }

    /// A document held in memory, e.g. read from a stream.
    pub fn from_memory(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            path: None,
            contents: contents.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn documents_read_from_disk_keep_their_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("page.html");
        fs::write(&path, "<p>hi</p>")?;
        let doc = SourceDocument::from_path(&path)?;
        assert_eq!(doc.name, "page.html");
        assert_eq!(doc.path.as_deref(), Some(path.as_path()));
        assert_eq!(doc.contents, b"<p>hi</p>");
        Ok(())
    }

    #[test]
    fn missing_files_are_resource_errors() {
        assert!(matches!(
            SourceDocument::from_path(Path::new("/nonexistent/page.html")),
            Err(DocumentError::Resource(_))
        ));
    }
}
