//! Session cookie storage.
//!
//! | Chromium (C++) | statebot (Rust) | Responsibility |
//! |----------------|-----------------|----------------|
//! | `net::CookieMonster` | [`CookieMonster`](monster::CookieMonster) | Cookie jar with LRU eviction |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | Single cookie representation |
//! | - | [`CookieStore`](store::CookieStore) | Origin-keyed access, manual injection |
//! | - | [`persistence`] | JSON snapshot per visited origin |
//!
//! ```rust,no_run
//! use statebot::cookies::store::CookieStore;
//! use statebot::urlrequest::history::History;
//!
//! let store = CookieStore::new();
//! let mut history = History::new();
//! let c = cookie::Cookie::build(("session", "abc")).domain(".example.com").build();
//! store.set_cookie(&c, &mut history)?;
//! let json = statebot::cookies::persistence::encode_cookies(&store, &history)?;
//! # Ok::<(), statebot::base::neterror::NetError>(())
//! ```

pub mod canonical_cookie;
pub mod monster;
pub mod persistence;
pub mod psl;
pub mod store;
