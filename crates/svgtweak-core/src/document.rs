use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A whole SVG document held in memory, plus the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: Option<PathBuf>,
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded document");
        Ok(Self {
            path: Some(path.to_path_buf()),
            text,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
    }

    /// Writes the document back to the file it was loaded from.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => write_atomic(path, &self.text),
            None => Err(Error::usage("document has no file path")),
        }
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_atomic(path, &self.text)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

/// Writes `text` to a sibling temporary file and renames it over `path`, creating missing parent
/// directories first. A failed write leaves `path` untouched.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(io_err)?;
            dir
        }
        None => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".svgtweak-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    tmp.write_all(text.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "saved document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let err = Document::load("/definitely/not/here.svg").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.svg"));
    }

    #[test]
    fn in_memory_document_cannot_save() {
        let doc = Document::new("<svg/>");
        assert!(doc.path().is_none());
        assert!(matches!(doc.save(), Err(Error::Usage { .. })));
    }

    #[test]
    fn save_as_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.svg");
        let mut doc = Document::new("<svg/>");
        doc.save_as(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<svg/>");
        assert_eq!(doc.path(), Some(path.as_path()));

        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);

        let reloaded = Document::load(&path).unwrap();
        assert_eq!(reloaded.text(), "<svg/>");
    }
}
