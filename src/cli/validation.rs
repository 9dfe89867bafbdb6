use std::path::Path;

use crate::cli::errors::{CliError, CliResult};

/// Split a comma-separated keyword list, trimming entries and dropping blanks.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Weights may be any finite number; the scorer does not normalize them.
pub fn validate_weight(field: &str, value: Option<f32>) -> CliResult<()> {
    match value {
        Some(v) if !v.is_finite() => Err(CliError::validation(field, "weight must be a finite number")),
        _ => Ok(()),
    }
}

pub fn validate_file(path: &Path) -> CliResult<()> {
    if !path.is_file() {
        return Err(CliError::validation(
            "path",
            format!("{} is not a readable file", path.display()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(
            parse_keywords(" python, machine learning ,,SQL "),
            vec!["python", "machine learning", "SQL"]
        );
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ").is_empty());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight("w_must", None).is_ok());
        assert!(validate_weight("w_must", Some(-0.5)).is_ok());
        assert!(validate_weight("w_must", Some(1.5)).is_ok());
        assert!(matches!(
            validate_weight("w_must", Some(f32::NAN)),
            Err(CliError::Validation { .. })
        ));
        assert!(validate_weight("w_emb", Some(f32::INFINITY)).is_err());
    }

    #[test]
    fn test_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let resume = dir.path().join("cv.txt");
        std::fs::write(&resume, "python").unwrap();

        assert!(validate_file(&resume).is_ok());
        assert!(validate_file(&dir.path().join("missing.txt")).is_err());
        assert!(validate_file(dir.path()).is_err());
    }
}
