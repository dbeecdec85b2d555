pub const TOP_LEVEL_DOMAIN: &str = "dev";
pub const AUTHOR: &str = "esql-check";
pub const APP_NAME: &str = "esql-check";

pub const CONFIG_FILE_NAME: &str = "esql-check.toml";

/// Overrides the directory `esql-check.toml` is looked up in
pub const CONFIG_DIR_ENV: &str = "ESQL_CHECK_CONFIG_DIR";
