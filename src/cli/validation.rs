//! Value parsers for CLI arguments that clap cannot check on its own.

use std::fs;
use std::path::PathBuf;

/// Accept only an existing, readable regular file.
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{path_str}'"));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{path_str}'"));
    }

    fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{path_str}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_file_is_accepted() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("lombarter.toml");
        fs::write(&file, "[database]\nname = \"memory\"\n").unwrap();

        let parsed = validate_config_file_path(file.to_str().unwrap()).unwrap();
        assert_eq!(parsed, file);
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = validate_config_file_path("/definitely/not/here.toml").unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = validate_config_file_path(dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a file"));
    }
}
