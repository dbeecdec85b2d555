use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::error::InputError;

/// Content of the positional argument: the file it names if there is one,
/// otherwise the argument itself
pub async fn read_argument(argument: &str) -> Result<String, InputError> {
    match tokio::fs::metadata(argument).await {
        Ok(metadata) if metadata.is_file() => read_file(Path::new(argument)).await,
        _ => {
            tracing::debug!("argument is not a file, checking it as text");
            Ok(argument.to_string())
        }
    }
}

pub async fn read_file(path: &Path) -> Result<String, InputError> {
    tracing::debug!(path = %path.display(), "reading");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn read_stdin() -> Result<String, InputError> {
    if std::io::stdin().is_terminal() {
        eprintln!("Enter input to validate (Ctrl-D to end):");
    }

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|source| InputError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    Ok(text)
}

/// Expand glob patterns into the files they match, pattern by pattern, in
/// the order `glob` yields them. Directories are left out.
pub fn expand(patterns: &[String]) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|e| InputError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let before = files.len();
        for entry in entries {
            let path = entry.map_err(|e| InputError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                files.push(path);
            }
        }

        if files.len() == before {
            tracing::warn!(%pattern, "pattern matched no files");
        }
    }
    Ok(files)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.esql"), "FROM a").unwrap();
        fs::write(dir.path().join("b.esql"), "FROM b").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a query").unwrap();
        fs::create_dir(dir.path().join("sub.esql")).unwrap();
        fs::write(dir.path().join("sub.esql").join("c.esql"), "FROM c").unwrap();
        dir
    }

    fn pattern(dir: &TempDir, tail: &str) -> String {
        format!("{}/{tail}", dir.path().display())
    }

    #[tokio::test]
    async fn test_argument_naming_a_file_is_read() {
        let dir = fixture();
        let path = dir.path().join("a.esql");
        let text = read_argument(path.to_str().unwrap()).await.unwrap();
        assert_eq!(text, "FROM a");
    }

    #[tokio::test]
    async fn test_argument_is_text_otherwise() {
        let text = read_argument("FROM idx | LIMIT 1").await.unwrap();
        assert_eq!(text, "FROM idx | LIMIT 1");
    }

    #[tokio::test]
    async fn test_argument_naming_a_directory_is_text() {
        let dir = fixture();
        let path = dir.path().join("sub.esql");
        let argument = path.to_str().unwrap();
        assert_eq!(read_argument(argument).await.unwrap(), argument);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let dir = fixture();
        let error = read_file(&dir.path().join("missing.esql")).await.unwrap_err();
        assert!(matches!(error, InputError::Io { .. }));
    }

    #[test]
    fn test_expand_skips_directories_and_keeps_pattern_order() {
        let dir = fixture();
        let files = expand(&[pattern(&dir, "b.esql"), pattern(&dir, "*.esql")]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["b.esql", "a.esql", "b.esql"]);
    }

    #[test]
    fn test_expand_recursive_pattern() {
        let dir = fixture();
        let files = expand(&[pattern(&dir, "**/c.esql")]).unwrap();
        assert_eq!(files, vec![dir.path().join("sub.esql").join("c.esql")]);
    }

    #[test]
    fn test_expand_without_matches() {
        let dir = fixture();
        assert!(expand(&[pattern(&dir, "*.json")]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let error = expand(&["[".to_string()]).unwrap_err();
        assert!(matches!(error, InputError::Pattern { .. }));
    }
}
