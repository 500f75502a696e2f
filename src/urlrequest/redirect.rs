use crate::base::neterror::NetError;
use crate::urlrequest::history::History;
use url::Url;

/// Maximum redirect hops a single call follows.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Decides whether a redirect hop is followed.
///
/// `via` holds every URL already requested in this chain, oldest first,
/// so it is never empty when called.
pub trait RedirectPolicy {
    fn check_redirect(&mut self, next: &Url, via: &[Url]) -> Result<(), NetError>;
}

impl<F> RedirectPolicy for F
where
    F: FnMut(&Url, &[Url]) -> Result<(), NetError>,
{
    fn check_redirect(&mut self, next: &Url, via: &[Url]) -> Result<(), NetError> {
        self(next, via)
    }
}

/// Session policy: caps the chain and records each followed hop.
#[derive(Debug)]
pub struct RecordingRedirectPolicy<'a> {
    history: &'a mut History,
    max_redirects: usize,
}

impl<'a> RecordingRedirectPolicy<'a> {
    pub fn new(history: &'a mut History, max_redirects: usize) -> Self {
        Self {
            history,
            max_redirects,
        }
    }
}

impl RedirectPolicy for RecordingRedirectPolicy<'_> {
    fn check_redirect(&mut self, next: &Url, via: &[Url]) -> Result<(), NetError> {
        if via.len() > self.max_redirects {
            tracing::warn!(to = %next, hops = via.len(), "too many redirects");
            return Err(NetError::TooManyRedirects);
        }
        tracing::info!(to = %next, via = ?via.iter().map(Url::as_str).collect::<Vec<_>>(), "redirecting");
        self.history.add(next.as_str());
        Ok(())
    }
}
