//! # statebot
//!
//! A headless, stateful HTTP client for scripting websites that have no
//! programmatic API.
//!
//! A [`Bot`] keeps cookies and navigation history across requests, follows
//! redirects the way a browser does, and hands back a [`Page`] whose body
//! can be turned into typed [`Form`] and [`Table`] records.
//!
//! ## Features
//!
//! - **Session state**: cookie jar with public-suffix checks, per-origin
//!   JSON snapshots, ordered navigation history
//! - **Redirects**: browser method rules, 10-hop ceiling, every hop recorded
//! - **Request decoration**: default or custom user agent, optional
//!   request/response dumps through `tracing`
//! - **Extraction**: forms (inputs, radios, selects) and tables (headers,
//!   text, raw cell markup)
//! - **Transport**: HTTP/1.1 over hyper with BoringSSL and connection reuse
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statebot::Bot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), statebot::BotError> {
//!     let mut bot = Bot::builder().base_url("https://example.com").build();
//!     let mut page = bot.get("/").await?;
//!     for form in page.forms().await? {
//!         print!("{}", form.print());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error codes
//! - [`socket`] - TCP and TLS connection setup
//! - [`http`] - Single exchanges, connection reuse, interceptors
//! - [`cookies`] - Cookie jar, origin store and persistence
//! - [`urlrequest`] - History, redirect policy, redirect-following job
//! - [`html`] - Form and table extraction
//! - [`page`] - Lazily materialized response
//! - [`bot`] - The session

pub mod base;
pub mod bot;
pub mod cookies;
pub mod html;
pub mod http;
pub mod page;
pub mod socket;
pub mod urlrequest;

pub use base::neterror::NetError;
pub use bot::{Bot, BotBuilder, BotConfig, BotError};
pub use html::{Form, FormValues, Table};
pub use page::Page;
pub use urlrequest::history::History;
