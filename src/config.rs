use secrecy::SecretString;
use thiserror::Error;

/// Runtime configuration, loaded from environment variables.
#[derive(Debug)]
pub struct Config {
    pub supabase_url: String,
    pub anon_key: SecretString,
    pub access_token: Option<SecretString>,
    pub asset_bucket: String,
    pub locale: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// BANDSITE_ASSET_BUCKET defaults to "images", BANDSITE_LOCALE to "pt".
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase_url = lookup("SUPABASE_URL")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        if !(supabase_url.starts_with("http://") || supabase_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "SUPABASE_URL",
                "must start with http:// or https://",
            ));
        }

        let anon_key = lookup("SUPABASE_ANON_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let access_token = lookup("BANDSITE_ACCESS_TOKEN")
            .filter(|s| !s.is_empty())
            .map(SecretString::from);

        let asset_bucket = lookup("BANDSITE_ASSET_BUCKET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "images".to_string());
        if asset_bucket.contains('/') {
            return Err(ConfigError::Invalid(
                "BANDSITE_ASSET_BUCKET",
                "must be a bucket name, not a path",
            ));
        }

        let locale = lookup("BANDSITE_LOCALE")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "pt".to_string());

        Ok(Config {
            supabase_url,
            anon_key: SecretString::from(anon_key),
            access_token,
            asset_bucket,
            locale,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
