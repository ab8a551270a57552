//! Writing rendered classes to disk

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::class::JavaClass;
use crate::error::Result;

/// Result of a single file write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(PathBuf),
    /// The file existed and overwriting was not requested
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(path) | WriteOutcome::Skipped(path) => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}

/// Write `class` below `root`, creating package directories
///
/// With `overwrite` off an existing file is left untouched.
pub fn write_java_file(class: &JavaClass, root: &Path, overwrite: bool) -> Result<WriteOutcome> {
    let path = class.file_path(root);
    write_source(&path, &class.render(), overwrite)
}

/// Write already rendered source text to `path`
pub fn write_source(path: &Path, contents: &str, overwrite: bool) -> Result<WriteOutcome> {
    if !overwrite && path.exists() {
        debug!("Skipping existing file {}", path.display());
        return Ok(WriteOutcome::Skipped(path.to_path_buf()));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    debug!("Wrote {}", path.display());

    Ok(WriteOutcome::Written(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_class() -> JavaClass {
        JavaClass::new("org.example.person", "Person")
    }

    #[test]
    fn test_write_creates_package_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = write_java_file(&make_class(), dir.path(), true).unwrap();

        let expected = dir.path().join("org/example/person/Person.java");
        assert_eq!(outcome, WriteOutcome::Written(expected.clone()));
        assert!(fs::read_to_string(expected).unwrap().contains("public class Person {"));
    }

    #[test]
    fn test_existing_file_is_skipped_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = make_class().file_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "// hand edited").unwrap();

        let outcome = write_java_file(&make_class(), dir.path(), false).unwrap();
        assert!(!outcome.is_written());
        assert_eq!(fs::read_to_string(&path).unwrap(), "// hand edited");

        let outcome = write_java_file(&make_class(), dir.path(), true).unwrap();
        assert!(outcome.is_written());
        assert_ne!(fs::read_to_string(&path).unwrap(), "// hand edited");
    }
}
