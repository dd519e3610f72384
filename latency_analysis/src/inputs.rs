use crate::AnalysisError;
use std::path::{Path, PathBuf};

fn is_result_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.extension().is_some_and(|e| e == "json") && path.is_file()
}

/// Expands directories to the `*.json` files they contain (sorted by name,
/// not recursive); plain files are kept as given.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, AnalysisError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .map_err(|e| AnalysisError::io(format!("failed to list {}", path.display()), e))?;
            let mut found = Vec::new();
            for entry in entries {
                let entry = entry
                    .map_err(|e| AnalysisError::io(format!("failed to list {}", path.display()), e))?;
                let candidate = entry.path();
                if is_result_file(&candidate) {
                    found.push(candidate);
                }
            }
            found.sort();
            files.append(&mut found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(AnalysisError::InvalidPath(path.clone()));
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn directories_expand_to_json() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt", ".hidden.json"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();
        let single = dir.path().join("notes.txt");
        let files = expand_paths(&[dir.path().to_path_buf(), single.clone()]).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), dir.path().join("b.json"), single]
        );
    }

    #[test]
    fn missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            expand_paths(&[missing]),
            Err(AnalysisError::InvalidPath(_))
        ));
    }
}
