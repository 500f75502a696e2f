use crate::bot::Bot;
use crate::cookies::store::CookieStore;
use crate::http::interceptor::Interceptor;
use crate::urlrequest::redirect::DEFAULT_MAX_REDIRECTS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Session settings, fixed once the [`Bot`] is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix joined verbatim in front of every GET/POST path.
    pub base_url: String,
    /// `None` sends `Mozilla/5.0 (compatible)`.
    pub user_agent: Option<String>,
    /// Dump every request and response head at `info` on `statebot::dump`.
    pub debug: bool,
    pub max_redirects: usize,
    /// Deadline for each network exchange, redirect hops included.
    pub timeout: Option<Duration>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: None,
            debug: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            timeout: None,
        }
    }
}

/// Builder for [`Bot`].
///
/// ```rust,no_run
/// use statebot::Bot;
///
/// let bot = Bot::builder()
///     .base_url("https://intranet.example.com")
///     .user_agent("report-fetcher/1.0")
///     .debug(true)
///     .build();
/// ```
#[derive(Default)]
pub struct BotBuilder {
    config: BotConfig,
    cookie_store: Option<CookieStore>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl BotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: BotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Share a cookie store with another session.
    pub fn cookie_store(mut self, store: CookieStore) -> Self {
        self.cookie_store = Some(store);
        self
    }

    /// Append a middleware step. Custom steps run after the user agent
    /// is set and before the debug dump.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn build(self) -> Bot {
        Bot::from_parts(
            self.config,
            self.cookie_store.unwrap_or_default(),
            self.interceptors,
        )
    }
}

impl std::fmt::Debug for BotBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotBuilder")
            .field("config", &self.config)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.max_redirects, 10);
        assert!(!config.debug);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BotConfig =
            serde_json::from_str(r#"{ "base_url": "http://localhost:8080", "debug": true }"#)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.debug);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_builder_sets_config() {
        let bot = BotBuilder::new()
            .base_url("http://example.com")
            .user_agent("ua")
            .max_redirects(3)
            .timeout(Duration::from_secs(5))
            .build();
        let config = bot.config();
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.user_agent.as_deref(), Some("ua"));
        assert_eq!(config.max_redirects, 3);
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
