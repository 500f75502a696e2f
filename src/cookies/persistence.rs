//! Cookie persistence - snapshot the session's cookies per origin.
//!
//! The snapshot is a JSON object mapping each origin in the navigation
//! history (`scheme://host[:port]`) to the cookies valid for it:
//!
//! ```json
//! {
//!   "http://example.com": [
//!     { "name": "sid", "value": "abc", "domain": "example.com", "path": "/" }
//!   ]
//! }
//! ```

use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::{CanonicalCookie, SameSite};
use crate::cookies::store::CookieStore;
use crate::urlrequest::history::History;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use time::OffsetDateTime;
use url::Url;

/// Serializable representation of a cookie for persistence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PersistentCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub host_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_unix_secs: Option<i64>,
}

fn default_path() -> String {
    "/".to_string()
}

impl From<&CanonicalCookie> for PersistentCookie {
    fn from(c: &CanonicalCookie) -> Self {
        Self {
            name: c.name.clone(),
            value: c.value.clone(),
            domain: c.domain.clone(),
            path: c.path.clone(),
            secure: c.secure,
            http_only: c.http_only,
            host_only: c.host_only,
            expires_unix_secs: c.expiration_time.map(|t| t.unix_timestamp()),
        }
    }
}

impl PersistentCookie {
    fn into_canonical(self, now: OffsetDateTime) -> CanonicalCookie {
        CanonicalCookie {
            name: self.name,
            value: self.value,
            domain: self.domain.trim_start_matches('.').to_lowercase(),
            path: self.path,
            creation_time: now,
            expiration_time: self
                .expires_unix_secs
                .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok()),
            last_access_time: now,
            secure: self.secure,
            http_only: self.http_only,
            host_only: self.host_only,
            same_site: SameSite::Lax,
        }
    }
}

/// Origin -> cookies, ordered by origin so snapshots diff cleanly.
pub type CookieSnapshot = BTreeMap<String, Vec<PersistentCookie>>;

/// Build the snapshot for every origin in `history`. History entries that
/// do not parse as URLs are skipped with a warning.
pub fn snapshot(store: &CookieStore, history: &History) -> CookieSnapshot {
    let mut data = CookieSnapshot::new();
    for entry in history.iter() {
        let url = match Url::parse(entry) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(entry = %entry, error = %e, "invalid URL in history, skipping its cookies");
                continue;
            }
        };
        let origin = url.origin().ascii_serialization();
        if data.contains_key(&origin) {
            continue;
        }
        let cookies = store.cookies(&url).iter().map(PersistentCookie::from).collect();
        data.insert(origin, cookies);
    }
    data
}

/// Serialize the snapshot as pretty-printed JSON.
pub fn encode_cookies(store: &CookieStore, history: &History) -> Result<Vec<u8>, NetError> {
    serde_json::to_vec_pretty(&snapshot(store, history)).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize cookies");
        NetError::CookieSerializeFailed
    })
}

/// Install a snapshot produced by [`encode_cookies`]. Each origin is added
/// to `history`. Bad origins are skipped and expired cookies dropped.
/// Returns the number of cookies installed.
pub fn decode_cookies(
    store: &CookieStore,
    history: &mut History,
    data: &[u8],
) -> Result<usize, NetError> {
    let snapshot: CookieSnapshot = serde_json::from_slice(data).map_err(|e| {
        tracing::error!(error = %e, "cookie snapshot is not valid JSON");
        NetError::CookieInvalidData
    })?;

    let now = OffsetDateTime::now_utc();
    let mut installed = 0;
    for (origin, cookies) in snapshot {
        let url = match Url::parse(&origin) {
            Ok(url) if url.has_host() => url,
            _ => {
                tracing::warn!(origin = %origin, "invalid URL in cookie snapshot, skipping");
                continue;
            }
        };

        let live: Vec<CanonicalCookie> = cookies
            .into_iter()
            .map(|pc| pc.into_canonical(now))
            .filter(|c| !c.is_expired(now))
            .collect();
        installed += live.len();
        store.set_canonical_cookies(&url, live);
        history.add(url.as_str());
    }

    tracing::debug!(installed, "cookies loaded");
    Ok(installed)
}

/// Write the snapshot to `path`.
pub fn save_cookies(store: &CookieStore, history: &History, path: &Path) -> Result<(), NetError> {
    let json = encode_cookies(store, history)?;
    fs::write(path, json).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to write cookie file");
        NetError::CookieFileError
    })
}

/// Read a snapshot from `path` and install it.
pub fn load_cookies(
    store: &CookieStore,
    history: &mut History,
    path: &Path,
) -> Result<usize, NetError> {
    let json = fs::read(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read cookie file");
        NetError::CookieFileError
    })?;
    decode_cookies(store, history, &json)
}
