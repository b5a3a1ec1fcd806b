use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DATA_EXTENSION: &str = "json";

/// Every file under `root` whose extension is exactly `extension`, in
/// lexicographic order of the walk. A root that does not exist yields no
/// files.
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    if !root.exists() {
        tracing::warn!("Data path does not exist: {}", root.display());
        return Ok(Vec::new());
    }
    if !root.is_dir() {
        tracing::error!("Invalid data path: {}", root.display());
        return Err(AppError::InvalidPath(format!(
            "Data path is not a directory: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == extension)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/b/TRAAAAW128F429D538.json"), "json"));
        assert!(!has_extension(Path::new("events.JSON"), "json"));
        assert!(!has_extension(Path::new("events.json.bak"), "json"));
        assert!(!has_extension(Path::new("json"), "json"));
    }

    #[test]
    fn test_discovers_recursively_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("B/A")).unwrap();
        fs::create_dir_all(root.join("A/B")).unwrap();
        fs::write(root.join("B/A/two.json"), "{}").unwrap();
        fs::write(root.join("A/B/one.json"), "{}").unwrap();
        fs::write(root.join("A/zero.json"), "{}").unwrap();
        fs::write(root.join("A/notes.txt"), "").unwrap();

        let files = discover_files(root, DATA_EXTENSION).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![
                PathBuf::from("A/B/one.json"),
                PathBuf::from("A/zero.json"),
                PathBuf::from("B/A/two.json"),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README.md"), "").unwrap();
        assert!(discover_files(dir.path(), DATA_EXTENSION).unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_yields_no_files() {
        let dir = TempDir::new().unwrap();
        let files = discover_files(&dir.path().join("nope"), DATA_EXTENSION).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "").unwrap();
        let err = discover_files(&path, DATA_EXTENSION).unwrap_err();
        assert!(matches!(err, AppError::InvalidPath(_)));
    }

    #[test]
    fn test_uppercase_extension_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("b.JSON"), "{}").unwrap();

        let files = discover_files(dir.path(), DATA_EXTENSION).unwrap();
        assert_eq!(files, vec![dir.path().join("a.json")]);
    }
}
