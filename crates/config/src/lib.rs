pub mod constants;

pub use etcetera::AppStrategy;
use etcetera::{AppStrategyArgs, HomeDirError, choose_app_strategy};

use std::env;
use std::path::PathBuf;

pub fn create_strategy() -> std::result::Result<impl AppStrategy, HomeDirError> {
    choose_app_strategy(AppStrategyArgs {
        top_level_domain: constants::TOP_LEVEL_DOMAIN.to_string(),
        author: constants::AUTHOR.to_string(),
        app_name: constants::APP_NAME.to_string(),
    })
}

pub fn resolve_dir<S, F>(env_key: &str, strategy: &S, strategy_fn: F) -> PathBuf
where
    S: AppStrategy,
    F: FnOnce(&S) -> Option<PathBuf>,
{
    env::var_os(env_key)
        .map(PathBuf::from)
        .or_else(|| strategy_fn(strategy))
        .unwrap_or_else(|| env::temp_dir().join(constants::APP_NAME))
}

/// Path of the user configuration file, honouring [`constants::CONFIG_DIR_ENV`]
pub fn config_file() -> std::result::Result<PathBuf, HomeDirError> {
    let strategy = create_strategy()?;
    let dir = resolve_dir(constants::CONFIG_DIR_ENV, &strategy, |s| Some(s.config_dir()));
    Ok(dir.join(constants::CONFIG_FILE_NAME))
}

#[cfg(test)]
mod test {
    use super::*;

    const UNSET: &str = "ESQL_CHECK_TEST_VARIABLE_THAT_IS_NEVER_SET";

    #[test]
    fn test_env_override_wins() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir("CARGO_MANIFEST_DIR", &strategy, |s| Some(s.config_dir()));
        assert_eq!(dir, PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    }

    #[test]
    fn test_strategy_used_without_override() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir(UNSET, &strategy, |s| Some(s.config_dir()));
        assert_eq!(dir, strategy.config_dir());
        assert!(dir.to_string_lossy().contains(constants::APP_NAME));
    }

    #[test]
    fn test_temp_dir_fallback() {
        let strategy = create_strategy().unwrap();
        let dir = resolve_dir(UNSET, &strategy, |_| None);
        assert_eq!(dir, env::temp_dir().join(constants::APP_NAME));
    }

    #[test]
    fn test_config_file_name() {
        let path = config_file().unwrap();
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some(constants::CONFIG_FILE_NAME)
        );
    }
}
