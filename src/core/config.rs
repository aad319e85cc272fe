//! Environment-backed configuration.
//!
//! Every value has a baked-in default so the gateway runs without any
//! environment at all; a `.env` file (loaded by the binary via dotenvy) or
//! real environment variables override individual entries.

use anyhow::Result;

use crate::features::modes::Mode;

/// Default endpoint for the "Search" mode.
const DEFAULT_SEARCH_URL: &str =
    "https://cloud.flowiseai.com/api/v1/prediction/f495e9f3-cd33-428d-93ac-9c7914b5c052";
/// Default endpoint for the "Deep Search" mode.
const DEFAULT_DEEP_SEARCH_URL: &str =
    "https://cloud.flowiseai.com/api/v1/prediction/2fd060a7-3ea7-482c-8eea-4f1a1168cef1";
/// Default endpoint for the "AI Chat" mode.
const DEFAULT_CHAT_URL: &str =
    "https://cloud.flowiseai.com/api/v1/prediction/ef218325-4fa0-4bef-9f1d-11f7278341f3";
/// Default image-generation endpoint.
const DEFAULT_IMAGE_URL: &str = "https://api.together.xyz/v1/images/generations";
/// Default image-generation model.
const DEFAULT_IMAGE_MODEL: &str = "black-forest-labs/FLUX.1-schnell";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub search_url: String,
    pub deep_search_url: String,
    pub chat_url: String,
    pub image_url: String,
    pub image_model: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_steps: u32,
    pub image_count: u32,
    /// Together.ai API key; image generation is unavailable without it.
    pub together_api_key: Option<String>,
    /// Typewriter pace in milliseconds per character.
    pub ms_per_char: u64,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Ok(Config {
            log_level: env_or("LIORA_LOG_LEVEL", "info"),
            search_url: env_or("LIORA_SEARCH_URL", DEFAULT_SEARCH_URL),
            deep_search_url: env_or("LIORA_DEEP_SEARCH_URL", DEFAULT_DEEP_SEARCH_URL),
            chat_url: env_or("LIORA_CHAT_URL", DEFAULT_CHAT_URL),
            image_url: env_or("LIORA_IMAGE_URL", DEFAULT_IMAGE_URL),
            image_model: env_or("LIORA_IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            image_width: env_parsed("LIORA_IMAGE_WIDTH", 1024)?,
            image_height: env_parsed("LIORA_IMAGE_HEIGHT", 768)?,
            image_steps: env_parsed("LIORA_IMAGE_STEPS", 4)?,
            image_count: env_parsed("LIORA_IMAGE_COUNT", 4)?,
            together_api_key: std::env::var("TOGETHER_API_KEY").ok(),
            ms_per_char: env_parsed("LIORA_MS_PER_CHAR", 14)?,
        })
    }

    /// Build the startup mode catalog: search, deep search, chat.
    pub fn modes(&self) -> Vec<Mode> {
        vec![
            Mode::new("search", "Search", &self.search_url),
            Mode::new("deep", "Deep Search", &self.deep_search_url),
            Mode::new("chat", "AI Chat", &self.chat_url),
        ]
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_three_text_modes() {
        let config = Config::from_env().unwrap();
        let modes = config.modes();

        assert_eq!(modes.len(), 3);
        assert_eq!(modes[0].id, "search");
        assert_eq!(modes[1].id, "deep");
        assert_eq!(modes[2].id, "chat");
        assert!(modes.iter().all(|m| m.endpoint_url.starts_with("https://")));
    }

    #[test]
    fn image_defaults_match_deployment() {
        let config = Config::from_env().unwrap();

        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.image_width, 1024);
        assert_eq!(config.image_height, 768);
        assert_eq!(config.image_steps, 4);
        assert_eq!(config.image_count, 4);
    }
}
