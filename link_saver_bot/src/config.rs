use std::{fs, time::Duration};

const DEFAULT_DATABASE_URL: &str = "sqlite:link_saver.sqlite";
const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no bot token: set TELEGRAM_TOKEN or put it into the \"{0}\" file")]
    MissingToken(&'static str),
    #[error("LINK_SAVER_DB_TIMEOUT_SECS is not a number of seconds: {0:?}")]
    InvalidTimeout(String),
}

/// Everything the bot needs from the outside world to start.
#[derive(Clone)]
pub struct Config {
    pub bot_token: String,
    /// sqlx connection string of the link database.
    pub database_url: String,
    /// How long a storage operation may wait for a connection before failing.
    pub storage_timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<hidden>")
            .field("database_url", &self.database_url)
            .field("storage_timeout", &self.storage_timeout)
            .finish()
    }
}

impl Config {
    /// Load config from the environment, falling back to the key file
    /// for the token and to defaults for the rest.
    ///
    /// # Errors
    /// Errors if there's no token anywhere, or the timeout is not a number.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), |path| fs::read_to_string(path).ok())
    }

    fn from_lookup(
        env: impl Fn(&str) -> Option<String>,
        read_file: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let key_file = match cfg!(debug_assertions) {
            true => "key_debug",
            false => "key",
        };

        let bot_token = env("TELEGRAM_TOKEN")
            .or_else(|| read_file(key_file))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken(key_file))?;

        let database_url = env("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let storage_timeout = match env("LINK_SAVER_DB_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidTimeout(secs))?,
            None => DEFAULT_STORAGE_TIMEOUT,
        };

        Ok(Config {
            bot_token,
            database_url,
            storage_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use super::{Config, ConfigError};

    fn load(vars: &[(&str, &str)], key_file: Option<&str>) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(
            |name| vars.get(name).cloned(),
            |_| key_file.map(str::to_string),
        )
    }

    #[test]
    fn defaults() {
        let config = load(&[("TELEGRAM_TOKEN", "123:abc")], None).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.database_url, "sqlite:link_saver.sqlite");
        assert_eq!(config.storage_timeout, Duration::from_secs(30));
    }

    #[test]
    fn token_from_key_file() {
        let config = load(&[], Some("  123:abc\n")).unwrap();
        assert_eq!(config.bot_token, "123:abc");
    }

    #[test]
    fn no_token() {
        assert!(matches!(load(&[], None), Err(ConfigError::MissingToken(_))));
        assert!(matches!(
            load(&[], Some("\n")),
            Err(ConfigError::MissingToken(_))
        ));
    }

    #[test]
    fn overrides() {
        let config = load(
            &[
                ("TELEGRAM_TOKEN", "t"),
                ("DATABASE_URL", "sqlite:/var/lib/links.sqlite"),
                ("LINK_SAVER_DB_TIMEOUT_SECS", "5"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(config.database_url, "sqlite:/var/lib/links.sqlite");
        assert_eq!(config.storage_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout() {
        let result = load(
            &[("TELEGRAM_TOKEN", "t"), ("LINK_SAVER_DB_TIMEOUT_SECS", "soon")],
            None,
        );
        assert!(matches!(result, Err(ConfigError::InvalidTimeout(x)) if x == "soon"));
    }
}
