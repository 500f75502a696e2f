use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::CanonicalCookie;
use crate::cookies::monster::CookieMonster;
use crate::urlrequest::history::History;
use cookie::Cookie;
use std::sync::Arc;
use url::Url;

/// Origin-keyed view over the session's [`CookieMonster`].
///
/// The jar itself stays shared with the network transaction so cookies a
/// response sets are visible to the next request.
#[derive(Debug, Clone, Default)]
pub struct CookieStore {
    jar: Arc<CookieMonster>,
}

impl CookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jar(jar: Arc<CookieMonster>) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> &Arc<CookieMonster> {
        &self.jar
    }

    /// Unexpired cookies scoped to the host of `url`, under any path and
    /// whatever their Secure flag.
    pub fn cookies(&self, url: &Url) -> Vec<CanonicalCookie> {
        self.jar.get_cookies_for_origin(url)
    }

    /// Store cookies as if `origin` had set them. Cookies the jar refuses
    /// (public-suffix domain, foreign domain, bad prefix) are skipped.
    pub fn set_cookies(&self, origin: &Url, cookies: &[Cookie<'_>]) {
        for c in cookies {
            if let Err(e) = self.jar.save_cookie(origin, c) {
                tracing::warn!(origin = %origin, cookie = %c.name(), error = %e, "cookie not stored");
            }
        }
    }

    /// Install already-canonical cookies for `origin`. An empty domain is
    /// taken from the origin's host.
    pub fn set_canonical_cookies(&self, origin: &Url, cookies: Vec<CanonicalCookie>) {
        let host = origin.host_str().unwrap_or_default().to_lowercase();
        for mut c in cookies {
            if c.domain.is_empty() {
                c.domain = host.clone();
                c.host_only = true;
            }
            self.jar.set_canonical_cookie(c);
        }
    }

    /// Inject a cookie without a live request. The origin is
    /// `http://<domain>` with any leading dot removed, and it is recorded
    /// in `history` so the cookie is exported with the session.
    pub fn set_cookie(&self, cookie: &Cookie<'_>, history: &mut History) -> Result<Url, NetError> {
        let host = cookie.domain().unwrap_or_default();
        let host = host.strip_prefix('.').unwrap_or(host);
        if host.is_empty() {
            return Err(NetError::CookieInvalidDomain);
        }
        let origin =
            Url::parse(&format!("http://{}", host)).map_err(|_| NetError::CookieInvalidDomain)?;

        tracing::debug!(origin = %origin, cookie = %cookie.name(), "setting cookie");
        self.jar.save_cookie(&origin, cookie)?;
        history.add(origin.as_str());
        Ok(origin)
    }
}
