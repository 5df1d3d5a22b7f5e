use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

/// How a search session treats a response that settles after a newer search was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Whatever resolves last overwrites the results, even if it was issued first.
    #[default]
    LastResolvedWins,
    /// Responses are tagged with their issue number and dropped unless they are the latest.
    LatestIssuedOnly,
}

/// Static configuration used throughout the application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_root: String,
    lookup_root: String,
    media: String,
    result_limit: u32,
    user_agent: String,
    client_id: String,
    log_dir: PathBuf,
    initial_url: String,
    start_signed_in: bool,
    stale_policy: StalePolicy,
    connect_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client_id = format!("itunes-search-tui-{}", Uuid::new_v4());
        let user_agent = format!("itunes-search-tui/0.1.0 ( unique-id={client_id} )");

        Self {
            api_root: "https://itunes.apple.com/search".to_string(),
            lookup_root: "https://itunes.apple.com/lookup".to_string(),
            media: "music".to_string(),
            result_limit: 20,
            user_agent,
            client_id,
            log_dir: PathBuf::from(".logs"),
            initial_url: "/".to_string(),
            start_signed_in: true,
            stale_policy: StalePolicy::default(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn lookup_root(&self) -> &str {
        &self.lookup_root
    }

    pub fn media(&self) -> &str {
        &self.media
    }

    pub fn result_limit(&self) -> u32 {
        self.result_limit
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    pub fn start_signed_in(&self) -> bool {
        self.start_signed_in
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_policy
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Ensures that the log directory exists before the subscriber opens files in it.
    pub fn ensure_filesystem(&self) -> Result<()> {
        fs::create_dir_all(self.log_dir()).with_context(|| {
            format!("Failed to create log directory: {}", self.log_dir().display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_itunes_endpoints() {
        let config = AppConfig::default();
        assert_eq!(config.api_root(), "https://itunes.apple.com/search");
        assert_eq!(config.lookup_root(), "https://itunes.apple.com/lookup");
        assert_eq!(config.media(), "music");
        assert_eq!(config.result_limit(), 20);
        assert_eq!(config.initial_url(), "/");
        assert_eq!(config.stale_policy(), StalePolicy::LastResolvedWins);
        assert!(config.user_agent().contains(config.client_id()));
    }
}
