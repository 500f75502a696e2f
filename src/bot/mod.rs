//! The stateful session.
//!
//! A [`Bot`] owns a cookie store and a navigation [`History`]. Every GET or
//! POST is recorded, follows redirects (each hop recorded too), and
//! returns a [`Page`]:
//!
//! ```rust,no_run
//! use statebot::{Bot, FormValues};
//!
//! # async fn run() -> Result<(), statebot::BotError> {
//! let mut bot = Bot::builder().base_url("https://example.com").build();
//!
//! let mut login = bot.get("/login").await?;
//! let mut form = login.forms().await?.remove(0);
//! form.fields.set("user", "alice");
//! form.fields.set("password", "secret");
//! bot.post("/login", &form.fields).await?;
//!
//! let mut report = bot.get("/report").await?;
//! for table in report.tables().await? {
//!     println!("{:?}", table.data);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

pub use config::{BotBuilder, BotConfig};
pub use error::BotError;

use crate::base::neterror::NetError;
use crate::cookies::persistence;
use crate::cookies::store::CookieStore;
use crate::html::values::FormValues;
use crate::http::interceptor::{
    DebugDump, Interceptor, InterceptorChain, OutgoingRequest, UserAgent,
};
use crate::http::requestbody::{RequestBody, FORM_URLENCODED};
use crate::http::streamfactory::HttpStreamFactory;
use crate::page::Page;
use crate::urlrequest::history::History;
use crate::urlrequest::job::URLRequestHttpJob;
use crate::urlrequest::redirect::RecordingRedirectPolicy;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::Method;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Headless, stateful HTTP client.
///
/// Calls take `&mut self`: one session serves one caller at a time.
/// Wrap it in a `tokio::sync::Mutex` to share it between tasks.
pub struct Bot {
    config: BotConfig,
    factory: Arc<HttpStreamFactory>,
    cookies: CookieStore,
    interceptors: Arc<InterceptorChain>,
    history: History,
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("config", &self.config)
            .field("history", &self.history.len())
            .field("cookies", &self.cookies.jar().total_cookie_count())
            .finish()
    }
}

impl Bot {
    /// Session with the default configuration and an empty cookie store.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::new()
    }

    pub fn with_config(config: BotConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub(crate) fn from_parts(
        config: BotConfig,
        cookies: CookieStore,
        custom: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        let mut chain = InterceptorChain::new();
        chain.push(UserAgent::new(config.user_agent.as_deref()));
        for step in custom {
            chain.push_arc(step);
        }
        if config.debug {
            chain.push(DebugDump);
        }

        Self {
            config,
            factory: Arc::new(HttpStreamFactory::default()),
            cookies,
            interceptors: Arc::new(chain),
            history: History::new(),
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn cookie_store(&self) -> &CookieStore {
        &self.cookies
    }

    /// GET `base_url + path`.
    ///
    /// A network failure returns [`BotError::Net`]; a non-2xx answer
    /// returns [`BotError::Status`] carrying the page.
    pub async fn get(&mut self, path: &str) -> Result<Page, BotError> {
        let url = self.begin(path)?;
        self.execute(OutgoingRequest::new(Method::GET, url)).await
    }

    /// POST `values` URL-encoded to `base_url + path`. Same outcomes as
    /// [`Bot::get`].
    pub async fn post(&mut self, path: &str, values: &FormValues) -> Result<Page, BotError> {
        let url = self.begin(path)?;
        let mut request = OutgoingRequest::new(Method::POST, url);
        request
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
        request.body = RequestBody::form(values);
        self.execute(request).await
    }

    /// Record the target, then resolve it. The entry is kept even when it
    /// does not parse, mirroring what was asked for.
    fn begin(&mut self, path: &str) -> Result<Url, NetError> {
        let target = format!("{}{}", self.config.base_url, path);
        self.history.add(target.as_str());
        Url::parse(&target).map_err(|e| {
            tracing::debug!(url = %target, error = %e, "invalid request URL");
            NetError::InvalidUrl
        })
    }

    /// Send a prepared request and follow its redirects. `get` and `post`
    /// record the target in the history before calling this; requests
    /// sent directly are not recorded, only their redirect hops are.
    pub async fn execute(&mut self, request: OutgoingRequest) -> Result<Page, BotError> {
        let mut job = URLRequestHttpJob::new(
            self.factory.clone(),
            self.cookies.jar().clone(),
            self.interceptors.clone(),
            request,
        );
        job.set_timeout(self.config.timeout);

        let mut policy = RecordingRedirectPolicy::new(&mut self.history, self.config.max_redirects);
        job.start(&mut policy).await?;

        let response = job.take_response().ok_or(NetError::EmptyResponse)?;
        let status = response.status();
        let page = Page::new(response);
        if !status.is_success() {
            return Err(BotError::Status {
                status,
                page: Box::new(page),
            });
        }
        Ok(page)
    }

    /// Seed a cookie without a request. Its origin is derived from the
    /// cookie's domain and added to the history.
    pub fn set_cookie(&mut self, cookie: &cookie::Cookie<'_>) -> Result<Url, NetError> {
        self.cookies.set_cookie(cookie, &mut self.history)
    }

    /// JSON snapshot of the cookies of every origin in the history.
    pub fn encode_cookies(&self) -> Result<Vec<u8>, NetError> {
        persistence::encode_cookies(&self.cookies, &self.history)
    }

    /// Install a snapshot from [`Bot::encode_cookies`]; its origins are
    /// appended to the history. Returns how many cookies were installed.
    pub fn decode_cookies(&mut self, data: &[u8]) -> Result<usize, NetError> {
        persistence::decode_cookies(&self.cookies, &mut self.history, data)
    }

    pub fn save_cookies(&self, path: impl AsRef<Path>) -> Result<(), NetError> {
        persistence::save_cookies(&self.cookies, &self.history, path.as_ref())
    }

    pub fn load_cookies(&mut self, path: impl AsRef<Path>) -> Result<usize, NetError> {
        persistence::load_cookies(&self.cookies, &mut self.history, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_records_invalid_target() {
        let mut bot = Bot::new();
        assert_eq!(bot.begin("not a url").unwrap_err(), NetError::InvalidUrl);
        assert_eq!(bot.history().entries(), &["not a url".to_string()]);
    }

    #[test]
    fn test_begin_joins_base_verbatim() {
        let mut bot = Bot::builder().base_url("http://example.com/app").build();
        let url = bot.begin("/login?next=%2F").unwrap();
        assert_eq!(url.as_str(), "http://example.com/app/login?next=%2F");
        assert_eq!(bot.history().current(), "http://example.com/app/login?next=%2F");
    }

    #[test]
    fn test_chain_order() {
        let bot = Bot::builder().debug(true).build();
        // user agent + debug dump
        assert_eq!(bot.interceptors.len(), 2);
        assert_eq!(Bot::new().interceptors.len(), 1);
    }

    #[test]
    fn test_set_cookie_then_export() {
        let mut bot = Bot::new();
        let c = cookie::Cookie::build(("token", "t0k"))
            .domain("example.com")
            .path("/")
            .build();
        bot.set_cookie(&c).unwrap();

        let json = String::from_utf8(bot.encode_cookies().unwrap()).unwrap();
        assert!(json.contains("\"http://example.com\""));
        assert!(json.contains("\"t0k\""));
    }
}
