use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{HarnessError, Result};

/// Lists the files directly inside `dir` that carry `extension`.
///
/// The returned list is sorted so every sweep visits programs, and every
/// comparison visits records, in the same order.
pub fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| HarnessError::Discovery {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Program identity: the file name without its extension.
pub fn program_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_sorted_files_with_extension_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mila", "a.mila", "notes.txt", "c.mila.bak"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.mila")).unwrap();
        fs::write(dir.path().join("nested.mila").join("d.mila"), "").unwrap();

        let found = files_with_extension(dir.path(), "mila").unwrap();
        let names: Vec<_> = found.iter().map(|p| program_name(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = files_with_extension(&dir.path().join("absent"), "mila").unwrap_err();
        assert!(matches!(err, HarnessError::Discovery { .. }));
    }

    #[test]
    fn name_is_file_stem() {
        assert_eq!(program_name(Path::new("program/fact.rec.mila")), "fact.rec");
    }
}
