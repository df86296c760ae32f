//! Source discovery by glob pattern under an explicit base directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SpoolbookError};

/// Files directly under `base` whose names match `pattern`, sorted by path.
///
/// The pattern is resolved against `base`; the process working directory is
/// never consulted or changed.
pub fn discover(base: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = base.as_ref();
    if !base.is_dir() {
        return Err(SpoolbookError::SourceNotFound {
            path: base.to_path_buf(),
        });
    }

    let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
    let full_pattern = Path::new(&escaped_base).join(pattern);

    let mut paths = Vec::new();
    for entry in glob::glob(&full_pattern.to_string_lossy())? {
        let path = entry?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    debug!(base = %base.display(), pattern, found = paths.len(), "discovered sources");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.hpspool"), "x").unwrap();
        fs::write(dir.path().join("a.hpspool"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("c.hpspool")).unwrap();

        let found = discover(dir.path(), "*.hpspool").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.hpspool", "b.hpspool"]);
    }

    #[test]
    fn test_discover_missing_base() {
        let err = discover("/nonexistent/spoolbook", "*.csv").unwrap_err();
        assert!(matches!(err, SpoolbookError::SourceNotFound { .. }));
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path(), "[").unwrap_err();
        assert!(matches!(err, SpoolbookError::Pattern(_)));
    }
}
