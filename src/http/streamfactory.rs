use crate::base::neterror::NetError;
use crate::socket::connectjob::ConnectJob;
use bytes::Bytes;
use dashmap::DashMap;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use url::Url;

/// Idle connections kept per group (Chromium's per-host socket limit).
const MAX_IDLE_PER_GROUP: usize = 6;

type Sender = http1::SendRequest<Full<Bytes>>;

/// Identifies a connection group (scheme, host, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupId {
    scheme: String,
    host: String,
    port: u16,
}

impl GroupId {
    fn from_url(url: &Url) -> Option<Self> {
        Some(GroupId {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_string(),
            port: url.port_or_known_default()?,
        })
    }
}

/// Wraps one HTTP/1.1 connection.
/// Equivalent to net::HttpStream.
pub struct HttpStream {
    sender: Sender,
    group: GroupId,
    reused: bool,
}

impl HttpStream {
    pub async fn send_request(
        &mut self,
        req: Request<Full<Bytes>>,
    ) -> Result<Response<Incoming>, NetError> {
        self.sender
            .ready()
            .await
            .map_err(|_| NetError::ConnectionClosed)?;
        self.sender.send_request(req).await.map_err(|e| {
            tracing::debug!(error = %e, reused = self.reused, "request failed");
            if e.is_incomplete_message() || e.is_closed() {
                NetError::ConnectionClosed
            } else if e.is_parse() {
                NetError::InvalidResponse
            } else if e.is_timeout() {
                NetError::ConnectionTimedOut
            } else {
                NetError::ConnectionReset
            }
        })
    }

    /// Whether the connection came from the idle pool.
    pub fn is_reused(&self) -> bool {
        self.reused
    }
}

/// Hands out HTTP/1.1 connections, reusing idle ones per group.
pub struct HttpStreamFactory {
    connector: ConnectJob,
    idle: DashMap<GroupId, Vec<Sender>>,
}

impl Default for HttpStreamFactory {
    fn default() -> Self {
        Self::new(ConnectJob::new())
    }
}

impl HttpStreamFactory {
    pub fn new(connector: ConnectJob) -> Self {
        Self {
            connector,
            idle: DashMap::new(),
        }
    }

    pub async fn create_stream(&self, url: &Url) -> Result<HttpStream, NetError> {
        let group = GroupId::from_url(url).ok_or(NetError::InvalidUrl)?;

        if let Some(sender) = self.take_idle(&group) {
            tracing::debug!(host = %group.host, port = group.port, "reusing idle connection");
            return Ok(HttpStream {
                sender,
                group,
                reused: true,
            });
        }

        // 1. Get raw socket
        let socket = self.connector.connect(url).await?;

        // 2. Handshake
        let io = TokioIo::new(socket);
        let (sender, conn) = http1::handshake(io)
            .await
            .map_err(|_| NetError::ConnectionFailed)?;

        // 3. Spawn the connection driver
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection driver exited");
            }
        });

        Ok(HttpStream {
            sender,
            group,
            reused: false,
        })
    }

    /// Return a stream to the pool. Closed connections are dropped; a
    /// connection whose response body is still being read stays pooled
    /// and is skipped until it becomes ready.
    ///
    /// A full group makes room by evicting a busy connection. Its body
    /// still drains; the connection just is not reused afterwards.
    pub fn release_stream(&self, stream: HttpStream) {
        if stream.sender.is_closed() {
            return;
        }
        let mut entry = self.idle.entry(stream.group).or_default();
        entry.retain(|s| !s.is_closed());
        if entry.len() >= MAX_IDLE_PER_GROUP {
            match entry.iter().position(|s| !s.is_ready()) {
                Some(idx) => {
                    entry.swap_remove(idx);
                }
                None => return,
            }
        }
        entry.push(stream.sender);
    }

    /// Forget every idle connection for the URL's group.
    pub fn report_failure(&self, url: &Url) {
        if let Some(group) = GroupId::from_url(url) {
            self.idle.remove(&group);
        }
    }

    /// Number of pooled connections across all groups.
    pub fn idle_count(&self) -> usize {
        self.idle.iter().map(|e| e.value().len()).sum()
    }

    fn take_idle(&self, group: &GroupId) -> Option<Sender> {
        let mut entry = self.idle.get_mut(group)?;
        entry.retain(|s| !s.is_closed());
        let idx = entry.iter().position(|s| s.is_ready())?;
        Some(entry.swap_remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn request(addr: SocketAddr, path: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .uri(path)
            .header("Host", addr.to_string())
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_group_id_default_port() {
        let url = Url::parse("https://example.com/path").unwrap();
        let group = GroupId::from_url(&url).unwrap();
        assert_eq!(group.port, 443);
        assert_eq!(group.host, "example.com");
    }

    #[tokio::test]
    async fn test_release_and_reuse() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                // Serve two keep-alive requests on the same socket.
                for _ in 0..2 {
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK")
                        .await;
                }
            }
        });

        let factory = HttpStreamFactory::default();
        let url = Url::parse(&format!("http://{}/", addr)).unwrap();

        let mut stream = factory.create_stream(&url).await.unwrap();
        assert!(!stream.is_reused());
        let resp = stream.send_request(request(addr, "/")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let _ = resp.into_body().collect().await.unwrap();

        factory.release_stream(stream);
        assert_eq!(factory.idle_count(), 1);

        // Let the connection driver mark the connection idle.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stream = factory.create_stream(&url).await.unwrap();
        assert!(stream.is_reused());
    }

    /// `/slow` sends its head and holds the body back; anything else is
    /// answered in full on a keep-alive connection.
    async fn slow_body_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    loop {
                        let n = match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        if buf[..n].starts_with(b"GET /slow") {
                            let _ = socket
                                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n")
                                .await;
                            tokio::time::sleep(Duration::from_secs(5)).await;
                            return;
                        }
                        let _ = socket
                            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK")
                            .await;
                    }
                });
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_full_group_evicts_busy_connection() {
        let addr = slow_body_server().await;
        let factory = HttpStreamFactory::default();
        let url = Url::parse(&format!("http://{}/", addr)).unwrap();

        // Unread bodies keep these connections busy.
        let mut pending = Vec::new();
        for _ in 0..MAX_IDLE_PER_GROUP {
            let mut stream = factory.create_stream(&url).await.unwrap();
            pending.push(stream.send_request(request(addr, "/slow")).await.unwrap());
            factory.release_stream(stream);
        }
        assert_eq!(factory.idle_count(), MAX_IDLE_PER_GROUP);

        let mut stream = factory.create_stream(&url).await.unwrap();
        assert!(!stream.is_reused());
        let resp = stream.send_request(request(addr, "/")).await.unwrap();
        let _ = resp.into_body().collect().await.unwrap();
        factory.release_stream(stream);
        assert_eq!(factory.idle_count(), MAX_IDLE_PER_GROUP);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stream = factory.create_stream(&url).await.unwrap();
        assert!(stream.is_reused());
        drop(pending);
    }
}
