//! # Configuration loading.
//!
//! Reads the YAML file, deserializes it into [`ConfigFile`], and runs
//! semantic validation. All failures surface as typed [`ConfigError`]s before
//! anything starts; the supervision engine never re-validates what it is
//! handed.

use std::path::Path;

use crate::config::model::ConfigFile;
use crate::error::ConfigError;

/// Loads a configuration file without semantic validation.
///
/// This only performs YAML deserialization; use [`load_and_validate`] as the
/// entry point for the rest of the application.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a configuration file and runs validation.
///
/// - Reads YAML, applying defaults (handled by `serde` defaults).
/// - Checks commands are non-empty, cron expressions parse, and schedule
///   task references resolve.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile, ConfigError> {
    let config = load_from_path(&path)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_and_validate_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
processes:
  web:
    cmd: ./server
    logs: {{ stdout: /tmp/web.out, stderr: /tmp/web.err }}
"#
        )
        .unwrap();

        let cfg = load_and_validate(file.path()).unwrap();
        assert_eq!(cfg.processes.len(), 1);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let err = load_and_validate("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "processes: [not, a, map]").unwrap();
        let err = load_and_validate(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
