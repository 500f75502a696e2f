use crate::base::neterror::NetError;
use crate::cookies::monster::CookieMonster;
use crate::http::interceptor::{InterceptorChain, OutgoingRequest};
use crate::http::requestbody::RequestBody;
use crate::http::response::HttpResponse;
use crate::http::streamfactory::HttpStreamFactory;
use crate::http::transaction::HttpNetworkTransaction;
use crate::urlrequest::redirect::RedirectPolicy;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Runs one logical request to completion, following redirects.
///
/// Every hop is a fresh [`HttpNetworkTransaction`], so cookies, the
/// interceptor chain and the `Host` header are recomputed per hop.
pub struct URLRequestHttpJob {
    factory: Arc<HttpStreamFactory>,
    cookie_store: Arc<CookieMonster>,
    interceptors: Arc<InterceptorChain>,
    timeout: Option<Duration>,
    request: OutgoingRequest,
    via: Vec<Url>,
    transaction: Option<HttpNetworkTransaction>,
}

impl URLRequestHttpJob {
    pub fn new(
        factory: Arc<HttpStreamFactory>,
        cookie_store: Arc<CookieMonster>,
        interceptors: Arc<InterceptorChain>,
        request: OutgoingRequest,
    ) -> Self {
        Self {
            factory,
            cookie_store,
            interceptors,
            timeout: None,
            request,
            via: Vec::new(),
            transaction: None,
        }
    }

    /// Per-hop deadline.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// URL of the current (after completion: final) hop.
    pub fn url(&self) -> &Url {
        &self.request.url
    }

    /// URLs already requested before the current hop.
    pub fn redirect_chain(&self) -> &[Url] {
        &self.via
    }

    pub async fn start<P>(&mut self, policy: &mut P) -> Result<(), NetError>
    where
        P: RedirectPolicy + ?Sized,
    {
        loop {
            let mut transaction = HttpNetworkTransaction::new(
                self.factory.clone(),
                self.cookie_store.clone(),
                self.interceptors.clone(),
            );
            transaction.set_timeout(self.timeout);
            transaction.start(&mut self.request).await?;

            let redirect = transaction.get_response().and_then(|resp| {
                Self::redirect_target(&self.request.url, resp.status(), resp.headers())
                    .map(|next| (resp.status(), next))
            });
            self.transaction = Some(transaction);

            let Some((status, next)) = redirect else {
                return Ok(());
            };

            self.via.push(self.request.url.clone());
            policy.check_redirect(&next, &self.via)?;
            self.follow_redirect(status, next);
        }
    }

    /// Where a 3xx response points. A missing or unparsable `Location`
    /// makes the response final.
    fn redirect_target(current: &Url, status: StatusCode, headers: &HeaderMap) -> Option<Url> {
        if !matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308) {
            return None;
        }
        let location = headers.get(LOCATION)?.to_str().ok()?;
        match current.join(location) {
            Ok(next) if matches!(next.scheme(), "http" | "https") => Some(next),
            _ => {
                tracing::debug!(url = %current, location, "ignoring unusable Location");
                None
            }
        }
    }

    /// Rewrite the request for the next hop. 303, and 301/302 after a
    /// POST, become a bodyless GET; 307/308 replay method and body.
    fn follow_redirect(&mut self, status: StatusCode, next: Url) {
        let becomes_get = match status.as_u16() {
            303 => self.request.method != Method::HEAD,
            301 | 302 => self.request.method == Method::POST,
            _ => false,
        };
        if becomes_get {
            self.request.method = Method::GET;
            self.request.body = RequestBody::Empty;
            self.request.headers.remove(CONTENT_TYPE);
            self.request.headers.remove(CONTENT_LENGTH);
        }

        if next.origin() != self.request.url.origin() {
            self.request.headers.remove(AUTHORIZATION);
        }
        self.request.url = next;
    }

    /// Final response, once. `None` before `start` succeeded.
    pub fn take_response(&mut self) -> Option<HttpResponse> {
        let url = self.request.url.clone();
        self.transaction.as_mut()?.take_response(url)
    }
}
