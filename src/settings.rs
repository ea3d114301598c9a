use crate::errors::*;
use log::debug;
use snafu::ResultExt;
use std::env;
use std::path::Path;
use url::Url;

/// Environment variable holding the broker URL.
pub const URL_VAR: &str = "CLOUDAMQP_URL";

/// File read by [`Settings::from_env`], relative to the working directory.
pub const DOTENV_FILE: &str = ".env";

/// Broker URL used when [`URL_VAR`] is unset or empty.
pub const DEFAULT_URL: &str = "amqp://localhost";

/// Broker settings, read once at startup and passed down explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl Settings {
    /// Loads `.env` from the working directory if there is one, then reads the broker
    /// URL from the environment. Variables already set in the environment win over
    /// the file. Parent directories are not searched.
    pub fn from_env() -> Result<Settings> {
        Settings::load_dotenv(Path::new(DOTENV_FILE))?;
        Ok(Settings::from_url(env::var(URL_VAR).ok()))
    }

    fn load_dotenv(path: &Path) -> Result<()> {
        match dotenvy::from_path(path) {
            Ok(()) => debug!("loaded environment from {}", path.display()),
            Err(err) if err.not_found() => debug!("no .env file found"),
            Err(err) => return Err(err).context(DotEnvSnafu),
        }
        Ok(())
    }

    /// Builds settings from an optional URL, falling back to [`DEFAULT_URL`].
    pub fn from_url(url: Option<String>) -> Settings {
        match url {
            Some(url) if !url.trim().is_empty() => Settings { url },
            _ => Settings::default(),
        }
    }

    /// Checks that the URL parses and names an AMQP scheme.
    pub fn validate(&self) -> Result<Url> {
        let url = Url::parse(&self.url).context(InvalidUrlSnafu)?;
        match url.scheme() {
            "amqp" | "amqps" => Ok(url),
            scheme => UnsupportedSchemeSnafu { scheme }.fail(),
        }
    }

    /// The URL with its password masked, safe for logs and error messages.
    pub fn redacted_url(&self) -> String {
        match Url::parse(&self.url) {
            Ok(mut url) => {
                if url.password().is_some() {
                    // only fails for URLs that cannot carry credentials
                    let _ = url.set_password(Some("****"));
                }
                url.to_string()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }
}
