use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::{CanonicalCookie, SameSite};
use cookie::Cookie;
use dashmap::DashMap;
use std::sync::Arc;
use time::{Date, OffsetDateTime, Time};
use url::Url;

/// Maximum cookies per domain (Chromium default).
const MAX_COOKIES_PER_DOMAIN: usize = 50;

/// Maximum total cookies.
/// Chromium uses 3300, but we use a slightly lower limit to keep memory usage predictable.
const MAX_COOKIES_TOTAL: usize = 3000;

/// The cookie jar.
/// Modeled after Chromium's `net::CookieMonster`.
#[derive(Clone)]
pub struct CookieMonster {
    // Store: Map<Domain, List<Cookie>>
    store: Arc<DashMap<String, Vec<CanonicalCookie>>>,
}

impl Default for CookieMonster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CookieMonster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieMonster")
            .field("domains", &self.store.len())
            .field("cookies", &self.total_cookie_count())
            .finish()
    }
}

impl CookieMonster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(DashMap::new()),
        }
    }

    pub fn set_canonical_cookie(&self, cookie: CanonicalCookie) {
        let mut entry = self.store.entry(cookie.domain.clone()).or_default();

        // Remove existing if name/domain/path match
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);

        // Enforce per-domain limit with LRU eviction
        while entry.len() >= MAX_COOKIES_PER_DOMAIN {
            if let Some(oldest_idx) = entry
                .iter()
                .enumerate()
                .min_by_key(|(_, c)| c.creation_time)
                .map(|(i, _)| i)
            {
                entry.remove(oldest_idx);
            } else {
                break;
            }
        }

        entry.push(cookie);
        drop(entry); // Release lock before checking global count

        self.enforce_global_limit();
    }

    /// Remove the cookie with this domain, name and path, if stored.
    pub fn delete_cookie(&self, domain: &str, name: &str, path: &str) -> bool {
        let Some(mut entry) = self.store.get_mut(domain) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|c| c.name != name || c.path != path);
        before != entry.len()
    }

    /// Enforce the global cookie limit by evicting oldest cookies.
    fn enforce_global_limit(&self) {
        while self.total_cookie_count() > MAX_COOKIES_TOTAL {
            let mut oldest: Option<(String, usize, OffsetDateTime)> = None;

            for entry in self.store.iter() {
                for (idx, cookie) in entry.value().iter().enumerate() {
                    let older = oldest
                        .as_ref()
                        .map_or(true, |(_, _, t)| cookie.creation_time < *t);
                    if older {
                        oldest = Some((entry.key().clone(), idx, cookie.creation_time));
                    }
                }
            }

            let Some((domain, idx, _)) = oldest else {
                break;
            };
            if let Some(mut entry) = self.store.get_mut(&domain) {
                if idx < entry.len() {
                    entry.remove(idx);
                }
            }
        }
    }

    /// Cookies a request to `url` carries: domain, path, secure and expiry
    /// all checked. Longest path first, then oldest first.
    pub fn get_cookies_for_url(&self, url: &Url) -> Vec<CanonicalCookie> {
        let mut result = self.collect_matching(url, Some(url.path()), true);

        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.creation_time.cmp(&b.creation_time))
        });

        result
    }

    /// Cookies scoped to the URL's host under any path, Secure ones
    /// included whatever the scheme. Used when snapshotting the jar per
    /// origin, never for sending.
    pub fn get_cookies_for_origin(&self, url: &Url) -> Vec<CanonicalCookie> {
        let mut result = self.collect_matching(url, None, false);
        result.sort_by(|a, b| {
            a.creation_time
                .cmp(&b.creation_time)
                .then_with(|| a.name.cmp(&b.name))
        });
        result
    }

    fn collect_matching(
        &self,
        url: &Url,
        path: Option<&str>,
        secure_scheme_only: bool,
    ) -> Vec<CanonicalCookie> {
        let mut result = Vec::new();
        let Some(host) = url.host_str() else {
            return result;
        };
        let host = host.to_lowercase();
        let now = OffsetDateTime::now_utc();

        for domain in Self::get_matching_domains(&host) {
            let Some(entry) = self.store.get(&domain) else {
                continue;
            };
            for cookie in entry.iter() {
                if !Self::domain_matches(&cookie.domain, &host, cookie.host_only) {
                    continue;
                }
                if let Some(path) = path {
                    if !Self::path_matches(&cookie.path, path) {
                        continue;
                    }
                }
                if secure_scheme_only && cookie.secure && url.scheme() != "https" {
                    continue;
                }
                if cookie.is_expired(now) {
                    continue;
                }
                result.push(cookie.clone());
            }
        }
        result
    }

    /// Check if cookie domain matches request host.
    /// Implements RFC 6265 domain matching.
    fn domain_matches(cookie_domain: &str, request_host: &str, host_only: bool) -> bool {
        if host_only {
            return cookie_domain.eq_ignore_ascii_case(request_host);
        }

        let cookie_domain = cookie_domain.trim_start_matches('.');
        if request_host.eq_ignore_ascii_case(cookie_domain) {
            return true;
        }

        request_host.len() > cookie_domain.len()
            && request_host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", cookie_domain.to_ascii_lowercase()))
    }

    /// Check if request path matches cookie path.
    /// Implements RFC 6265 path matching.
    fn path_matches(cookie_path: &str, request_path: &str) -> bool {
        if request_path == cookie_path {
            return true;
        }

        if let Some(rest) = request_path.strip_prefix(cookie_path) {
            return cookie_path.ends_with('/') || rest.starts_with('/');
        }

        false
    }

    /// The host itself and all parent domains.
    /// For "foo.bar.example.com": "bar.example.com", "example.com", "com".
    fn get_matching_domains(host: &str) -> Vec<String> {
        if host.parse::<std::net::IpAddr>().is_ok() || host.starts_with('[') {
            return vec![host.to_string()];
        }

        let mut domains = vec![host.to_string()];
        let mut rest = host;
        while let Some((_, parent)) = rest.split_once('.') {
            domains.push(parent.to_string());
            rest = parent;
        }
        domains
    }

    /// RFC 6265 default-path: the request path up to, not including, its
    /// last '/'; "/" when that leaves nothing.
    fn default_path(url: &Url) -> String {
        let path = url.path();
        match path.rfind('/') {
            Some(idx) if idx > 0 && path.starts_with('/') => path[..idx].to_string(),
            _ => "/".to_string(),
        }
    }

    /// Store a cookie received from (or attributed to) `url`.
    ///
    /// A `Domain` attribute widens the cookie to subdomains (a leading dot
    /// is ignored) and must cover the URL's host without being a public
    /// suffix. An already-expired cookie deletes its stored counterpart.
    pub fn save_cookie(&self, url: &Url, parsed: &Cookie<'_>) -> Result<(), NetError> {
        let host = url
            .host_str()
            .ok_or(NetError::CookieInvalidDomain)?
            .to_lowercase();
        let now = OffsetDateTime::now_utc();

        // Domain logic
        let (domain, host_only) = match parsed.domain().filter(|d| !d.is_empty()) {
            Some(d) => {
                let d = d.trim_start_matches('.').to_lowercase();
                if !crate::cookies::psl::is_valid_cookie_domain(&d, &host) {
                    return Err(if crate::cookies::psl::is_public_suffix(&d) {
                        NetError::CookiePublicSuffix
                    } else {
                        NetError::CookieInvalidDomain
                    });
                }
                (d, false)
            }
            None => (host, true),
        };

        // Path logic
        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => Self::default_path(url),
        };

        // Expiry logic: Max-Age wins over Expires
        let expiration_time = match parsed.max_age() {
            Some(max_age) => Some(now.checked_add(max_age).unwrap_or_else(|| {
                if max_age.is_negative() {
                    OffsetDateTime::UNIX_EPOCH
                } else {
                    Date::MAX.with_time(Time::MIDNIGHT).assume_utc()
                }
            })),
            None => parsed.expires().and_then(|e| e.datetime()),
        };

        let same_site = match parsed.same_site() {
            Some(cookie::SameSite::Lax) => SameSite::Lax,
            Some(cookie::SameSite::Strict) => SameSite::Strict,
            Some(cookie::SameSite::None) => SameSite::NoRestriction,
            None => SameSite::Unspecified,
        };

        let c = CanonicalCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            creation_time: now,
            expiration_time,
            last_access_time: now,
            secure: parsed.secure().unwrap_or(false),
            http_only: parsed.http_only().unwrap_or(false),
            host_only,
            same_site,
        };
        c.validate_prefix(url.scheme() == "https")?;

        if c.is_expired(now) {
            self.delete_cookie(&c.domain, &c.name, &c.path);
            return Ok(());
        }

        self.set_canonical_cookie(c);
        Ok(())
    }

    /// Parse one `Set-Cookie` header value and store it. Rejected cookies
    /// are dropped silently, like browsers do.
    pub fn parse_and_save_cookie(&self, url: &Url, cookie_line: &str) {
        match Cookie::parse(cookie_line) {
            Ok(parsed) => {
                if let Err(e) = self.save_cookie(url, &parsed) {
                    tracing::debug!(url = %url, cookie = %parsed.name(), error = %e, "cookie rejected");
                }
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "failed to parse cookie");
            }
        }
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }

    /// Clear all cookies.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Iterate over all cookies.
    pub fn iter_all_cookies(&self) -> impl Iterator<Item = CanonicalCookie> + '_ {
        self.store.iter().flat_map(|entry| entry.value().clone())
    }
}
