use std::num::NonZeroUsize;
use std::path::Path;

use esql::Limits;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WrapErr};
use crate::report::OutputFormat;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default = "default_config", deny_unknown_fields)]
pub struct Config {
    /// Larger inputs are refused with an engine fault
    pub max_input_bytes: usize,
    /// Deepest allowed nesting of brackets and parentheses
    pub max_nesting_depth: usize,
    /// Files checked at the same time in files mode
    pub jobs: NonZeroUsize,
    pub output: OutputFormat,
}

fn default_config() -> Config {
    let limits = Limits::default();

    Config {
        max_input_bytes: limits.max_input_bytes,
        max_nesting_depth: limits.max_nesting_depth,
        jobs: std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        output: OutputFormat::default(),
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    fn load_str(user_config_str: &str) -> Result<Config> {
        let user_config: Config = toml::from_str(user_config_str)?;
        Ok(user_config)
    }

    /// Load `path` if given. Otherwise load the user configuration file when
    /// there is one, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        if let Some(path) = path {
            let user_config_str = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("Read configuration file {}", path.display()))?;
            return Self::load_str(&user_config_str);
        }

        let config_path = config::config_file()?;
        match std::fs::read_to_string(&config_path) {
            Ok(user_config_str) => {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                Self::load_str(&user_config_str)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_input_bytes: self.max_input_bytes,
            max_nesting_depth: self.max_nesting_depth,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::load_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_kebab_case_keys() {
        let config = Config::load_str(
            r#"
max-input-bytes = 1024
max-nesting-depth = 8
jobs = 3
output = "json"
"#,
        )
        .unwrap();
        assert_eq!(
            config.limits(),
            Limits {
                max_input_bytes: 1024,
                max_nesting_depth: 8
            }
        );
        assert_eq!(config.jobs.get(), 3);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::load_str("jobs = 2").unwrap();
        assert_eq!(config.jobs.get(), 2);
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::load_str("max_input_bytes = 1").is_err());
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(Config::load_str("jobs = 0").is_err());
    }

    #[test]
    fn test_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "output = \"json\"").unwrap();
        assert_eq!(
            Config::load(Some(path.as_path())).unwrap().output,
            OutputFormat::Json
        );
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("missing.toml").as_path())).is_err());
    }
}
