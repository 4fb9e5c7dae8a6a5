use clap::Parser;

use crate::oracle::{GeminiGenerator, OracleClient};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "symbion-lab",
    version,
    about = "Fractal spiral lab with a generative oracle"
)]
pub struct LabConfig {
    /// API key for the oracle. Falls back to $API_KEY when unset.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    /// Model used for oracle readings.
    #[arg(long, env = "SYMBION_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    /// Base URL of the generative-language REST API.
    #[arg(long, env = "SYMBION_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// Don't open the live spiral window.
    #[arg(long)]
    pub no_window: bool,
    /// Module selected at startup.
    #[arg(long)]
    pub module: Option<String>,
}

impl LabConfig {
    /// Parse the command line and environment. Read once at startup.
    pub fn load() -> Self {
        Self::parse().with_fallback_key(std::env::var("API_KEY").ok())
    }

    fn with_fallback_key(mut self, fallback: Option<String>) -> Self {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if !present(&self.api_key) {
            self.api_key = fallback.filter(|k| !k.trim().is_empty());
        }
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn oracle_client(&self) -> OracleClient<GeminiGenerator> {
        match self.api_key() {
            Some(key) => OracleClient::new(GeminiGenerator::new(&self.endpoint, &self.model, key)),
            None => OracleClient::disconnected(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LabConfig {
        let mut argv = vec!["symbion-lab"];
        argv.extend_from_slice(args);
        LabConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_are_parsed() {
        let config = parse(&["--api-key", "abc", "--model", "m-2", "--no-window", "--module", "CALMΩ"]);
        assert_eq!(config.api_key(), Some("abc"));
        assert_eq!(config.model, "m-2");
        assert!(config.no_window);
        assert_eq!(config.module.as_deref(), Some("CALMΩ"));
        assert!(config.oracle_client().is_connected());
    }

    #[test]
    fn fallback_key_only_fills_a_missing_key() {
        let config = parse(&["--api-key", "primary"]).with_fallback_key(Some("secondary".into()));
        assert_eq!(config.api_key(), Some("primary"));

        let mut config = parse(&[]);
        config.api_key = None;
        let config = config.with_fallback_key(Some("secondary".into()));
        assert_eq!(config.api_key(), Some("secondary"));
    }

    #[test]
    fn blank_key_means_disconnected() {
        let mut config = parse(&[]);
        config.api_key = Some("   ".into());
        let config = config.with_fallback_key(None);
        assert_eq!(config.api_key(), None);
        assert!(!config.oracle_client().is_connected());
    }
}
