//! Runtime configuration, read once at startup from `EDUSTREAM_*` variables.

use log::warn;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file; every request opens its own connection to it.
    pub database_path: PathBuf,
    /// Directory receiving uploaded materials and assignment files.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// bcrypt cost for teacher and share-link passwords.
    pub password_cost: u32,
    pub token_ttl_minutes: i64,
    /// Frontend origin used to build share URLs.
    pub public_base_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub quiz_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("edustream.sqlite"),
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            password_cost: bcrypt::DEFAULT_COST,
            token_ttl_minutes: 24 * 60,
            public_base_url: "http://localhost:3000".to_string(),
            openai_api_key: String::new(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            quiz_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            host: env_or("EDUSTREAM_HOST", defaults.host),
            port: parse_env("EDUSTREAM_PORT", defaults.port),
            database_path: env_or("EDUSTREAM_DATABASE", path_string(&defaults.database_path))
                .into(),
            upload_dir: env_or("EDUSTREAM_UPLOAD_DIR", path_string(&defaults.upload_dir)).into(),
            max_upload_bytes: parse_env("EDUSTREAM_MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            password_cost: parse_env("EDUSTREAM_PASSWORD_COST", defaults.password_cost),
            token_ttl_minutes: parse_env("EDUSTREAM_TOKEN_TTL_MINUTES", defaults.token_ttl_minutes),
            public_base_url: env_or("EDUSTREAM_PUBLIC_BASE_URL", defaults.public_base_url),
            openai_api_key: env_or("OPENAI_API_KEY", defaults.openai_api_key),
            openai_model: env_or("OPENAI_MODEL", defaults.openai_model),
            openai_base_url: env_or("OPENAI_BASE_URL", defaults.openai_base_url),
            quiz_timeout_secs: parse_env("EDUSTREAM_QUIZ_TIMEOUT_SECS", defaults.quiz_timeout_secs),
        }
    }

    /// The assistant is only wired up when an API key is present.
    pub fn assistant_enabled(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_the_assistant() {
        let config = AppConfig::default();
        assert!(!config.assistant_enabled());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn unparsable_values_fall_back_to_default() {
        std::env::set_var("EDUSTREAM_TEST_PORT_GARBAGE", "not-a-port");
        assert_eq!(parse_env("EDUSTREAM_TEST_PORT_GARBAGE", 8080u16), 8080);
        std::env::set_var("EDUSTREAM_TEST_PORT_GARBAGE", " 9000 ");
        assert_eq!(parse_env("EDUSTREAM_TEST_PORT_GARBAGE", 8080u16), 9000);
    }
}
