//! Public Suffix List (PSL) checks for the `Domain` cookie attribute.
//!
//! A cookie may not widen its scope to a public suffix such as `.com` or
//! `.co.uk`. Uses Mozilla's Public Suffix List via the `psl` crate.

use psl::{List, Psl};

/// Check if a domain is a public suffix (e.g., "com", "co.uk").
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.to_lowercase();
    let domain_bytes = domain_lower.as_bytes();

    match List.suffix(domain_bytes) {
        Some(suffix) => suffix.as_bytes() == domain_bytes,
        None => false,
    }
}

/// Check if a `Domain` attribute may be honored for a response from
/// `url_host`: the host must be the domain or one of its subdomains, and
/// the domain must not be a public suffix. IP hosts only accept themselves.
pub fn is_valid_cookie_domain(cookie_domain: &str, url_host: &str) -> bool {
    let cookie_domain = cookie_domain
        .strip_prefix('.')
        .unwrap_or(cookie_domain)
        .to_lowercase();
    let url_host = url_host.to_lowercase();

    if url_host.parse::<std::net::IpAddr>().is_ok()
        || url_host.starts_with('[')
    {
        return cookie_domain == url_host;
    }

    if is_public_suffix(&cookie_domain) {
        return false;
    }

    url_host == cookie_domain || url_host.ends_with(&format!(".{}", cookie_domain))
}
