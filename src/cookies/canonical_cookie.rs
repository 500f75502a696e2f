use crate::base::neterror::NetError;
use time::OffsetDateTime;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    /// Lowercase, without a leading dot.
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub last_access_time: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

impl CanonicalCookie {
    /// Host-only session cookie with path "/".
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into().trim_start_matches('.').to_lowercase(),
            path: "/".to_string(),
            creation_time: now,
            expiration_time: None,
            last_access_time: now,
            secure: false,
            http_only: false,
            host_only: true,
            same_site: SameSite::Unspecified,
        }
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        match self.expiration_time {
            Some(expiry) => expiry <= current_time,
            None => false,
        }
    }

    /// Session cookies have no expiration and die with the process.
    pub fn is_persistent(&self) -> bool {
        self.expiration_time.is_some()
    }

    /// Validate __Secure- and __Host- cookie prefixes per RFC 6265bis.
    /// - __Secure- cookies MUST have the Secure attribute
    /// - __Host- cookies MUST have Secure, Path="/", and no Domain attribute
    pub fn validate_prefix(&self, secure_origin: bool) -> Result<(), NetError> {
        if self.name.starts_with("__Secure-") && (!self.secure || !secure_origin) {
            return Err(NetError::CookieInvalidPrefix);
        }

        if self.name.starts_with("__Host-")
            && (!self.secure || self.path != "/" || !self.host_only || !secure_origin)
        {
            return Err(NetError::CookieInvalidPrefix);
        }

        Ok(())
    }
}
