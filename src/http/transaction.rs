use crate::base::neterror::NetError;
use crate::cookies::monster::CookieMonster;
use crate::http::interceptor::{InterceptorChain, OutgoingRequest, ResponseHead};
use crate::http::response::HttpResponse;
use crate::http::streamfactory::{HttpStream, HttpStreamFactory};
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_LENGTH, COOKIE, HOST, SET_COOKIE};
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use std::sync::Arc;
use std::time::Duration;

/// Internal state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    CreateStream,
    SendRequest,
    Done,
}

/// One request/response exchange: cookies attached, interceptors run,
/// `Set-Cookie` stored, no redirect handling.
pub struct HttpNetworkTransaction {
    factory: Arc<HttpStreamFactory>,
    cookie_store: Arc<CookieMonster>,
    interceptors: Arc<InterceptorChain>,
    timeout: Option<Duration>,
    state: State,
    stream: Option<HttpStream>,
    response: Option<Response<Incoming>>,
}

impl HttpNetworkTransaction {
    pub fn new(
        factory: Arc<HttpStreamFactory>,
        cookie_store: Arc<CookieMonster>,
        interceptors: Arc<InterceptorChain>,
    ) -> Self {
        Self {
            factory,
            cookie_store,
            interceptors,
            timeout: None,
            state: State::Idle,
            stream: None,
            response: None,
        }
    }

    /// Bound the whole exchange (connect, send, response head).
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// Run the exchange. The request is decorated in place, so the caller
    /// sees the headers that actually went out.
    pub async fn start(&mut self, request: &mut OutgoingRequest) -> Result<(), NetError> {
        self.attach_cookies(request);
        self.interceptors.apply_request(request);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.do_loop(request))
                .await
                .unwrap_or(Err(NetError::ConnectionTimedOut)),
            None => self.do_loop(request).await,
        };

        match (&result, &self.response) {
            (Ok(()), Some(resp)) => {
                for val in resp.headers().get_all(SET_COOKIE) {
                    if let Ok(s) = val.to_str() {
                        self.cookie_store.parse_and_save_cookie(&request.url, s);
                    }
                }
                let head = ResponseHead {
                    status: resp.status(),
                    version: resp.version(),
                    headers: resp.headers(),
                };
                self.interceptors.observe_response(request, Ok(head));
            }
            (Err(e), _) => self.interceptors.observe_response(request, Err(e)),
            (Ok(()), None) => {
                let err = NetError::EmptyResponse;
                self.interceptors.observe_response(request, Err(&err));
                return Err(err);
            }
        }

        result
    }

    /// Cookie header: query the cookie store for this URL.
    /// A header left over from an earlier hop is always replaced.
    fn attach_cookies(&self, request: &mut OutgoingRequest) {
        request.headers.remove(COOKIE);
        let cookies = self.cookie_store.get_cookies_for_url(&request.url);
        if cookies.is_empty() {
            return;
        }
        // get_cookies_for_url already returns them sorted: longest path first.
        let cookie_value = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        if let Ok(value) = HeaderValue::from_str(&cookie_value) {
            request.headers.insert(COOKIE, value);
        }
    }

    async fn do_loop(&mut self, request: &OutgoingRequest) -> Result<(), NetError> {
        self.state = State::CreateStream;
        loop {
            match self.state {
                State::Idle | State::Done => {
                    return Ok(());
                }
                State::CreateStream => {
                    self.stream = Some(self.factory.create_stream(&request.url).await?);
                    self.state = State::SendRequest;
                }
                State::SendRequest => {
                    let req = Self::build_request(request)?;
                    let Some(mut stream) = self.stream.take() else {
                        return Err(NetError::ConnectionClosed);
                    };
                    match stream.send_request(req).await {
                        Ok(resp) => {
                            self.factory.release_stream(stream);
                            self.response = Some(resp);
                            self.state = State::Done;
                        }
                        Err(e) => {
                            // Retry on reused socket failure
                            if stream.is_reused() {
                                tracing::debug!(
                                    url = %request.url,
                                    "socket reuse failed, retrying with fresh connection"
                                );
                                self.factory.report_failure(&request.url);
                                self.state = State::CreateStream;
                            } else {
                                return Err(e);
                            }
                        }
                    }
                }
            }
        }
    }

    fn build_request(request: &OutgoingRequest) -> Result<Request<Full<Bytes>>, NetError> {
        let url = &request.url;
        let target = &url[url::Position::BeforePath..url::Position::AfterQuery];
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let host_value = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let body = request.body.to_bytes();
        let mut headers = request.headers.clone();
        headers.insert(
            HOST,
            HeaderValue::from_str(&host_value).map_err(|_| NetError::InvalidUrl)?,
        );
        if !body.is_empty() {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        let mut req = Request::builder()
            .method(request.method.clone())
            .uri(target)
            .body(Full::new(body))
            .map_err(|_| NetError::InvalidUrl)?;
        *req.headers_mut() = headers;
        Ok(req)
    }

    pub fn get_response(&self) -> Option<&Response<Incoming>> {
        self.response.as_ref()
    }

    /// Take ownership of the response, converting to HttpResponse.
    /// Can only be called once - subsequent calls return None.
    pub fn take_response(&mut self, url: url::Url) -> Option<HttpResponse> {
        self.response
            .take()
            .map(|resp| HttpResponse::from_hyper(url, resp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::interceptor::UserAgent;
    use http::Method;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;

    async fn echo_server(response: &'static str) -> (String, tokio::sync::mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::mpsc::channel(8);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string()).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });
        (format!("http://{}", addr), rx)
    }

    fn transaction(jar: Arc<CookieMonster>) -> HttpNetworkTransaction {
        let mut chain = InterceptorChain::new();
        chain.push(UserAgent::new(Some("statebot-test")));
        HttpNetworkTransaction::new(
            Arc::new(HttpStreamFactory::default()),
            jar,
            Arc::new(chain),
        )
    }

    #[tokio::test]
    async fn test_sets_headers_and_stores_cookies() {
        let (base, mut seen) = echo_server(
            "HTTP/1.1 200 OK\r\nSet-Cookie: sid=abc; Path=/\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        )
        .await;
        let jar = Arc::new(CookieMonster::new());
        let mut txn = transaction(jar.clone());
        let url = Url::parse(&format!("{}/login?x=1", base)).unwrap();
        let mut req = OutgoingRequest::new(Method::GET, url.clone());

        txn.start(&mut req).await.unwrap();
        let resp = txn.take_response(url.clone()).unwrap();
        assert_eq!(resp.status(), 200);

        let raw = seen.recv().await.unwrap();
        assert!(raw.starts_with("GET /login?x=1 HTTP/1.1\r\n"));
        assert!(raw.to_lowercase().contains("user-agent: statebot-test"));

        let cookies = jar.get_cookies_for_url(&url);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "sid");
    }

    #[tokio::test]
    async fn test_sends_stored_cookies() {
        let (base, mut seen) =
            echo_server("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await;
        let jar = Arc::new(CookieMonster::new());
        let url = Url::parse(&format!("{}/", base)).unwrap();
        jar.parse_and_save_cookie(&url, "token=xyz; Path=/");

        let mut txn = transaction(jar);
        let mut req = OutgoingRequest::new(Method::GET, url);
        req.headers
            .insert(COOKIE, HeaderValue::from_static("stale=1"));
        txn.start(&mut req).await.unwrap();

        let raw = seen.recv().await.unwrap().to_lowercase();
        assert!(raw.contains("cookie: token=xyz"));
        assert!(!raw.contains("stale=1"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer.
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut txn = transaction(Arc::new(CookieMonster::new()));
        txn.set_timeout(Some(Duration::from_millis(100)));
        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let mut req = OutgoingRequest::new(Method::GET, url);
        assert_eq!(
            txn.start(&mut req).await.unwrap_err(),
            NetError::ConnectionTimedOut
        );
    }
}
