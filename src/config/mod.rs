use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub listen_addr: String,
    /// Directory of `{vendor}/{firmware}/{section}.tera` files. Empty means
    /// the bundled templates.
    pub templates_dir: String,
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            templates_dir: String::new(),
            output_dir: "./output".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: get_env("LISTEN_ADDR", &defaults.listen_addr),
            templates_dir: get_env("TEMPLATES_DIR", &defaults.templates_dir),
            output_dir: get_env("OUTPUT_DIR", &defaults.output_dir),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
