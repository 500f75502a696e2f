use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use boring::ssl::{SslConnector, SslMethod, SslVerifyMode};
use tokio::net::TcpStream;
use url::Url;

/// ALPN wire format for HTTP/1.1 only; the stream layer speaks HTTP/1.1.
const ALPN_HTTP11: &[u8] = b"\x08http/1.1";

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
/// A TLS setup failure is kept and reported on the first https connect,
/// plain http keeps working.
#[derive(Clone)]
pub struct ConnectJob {
    tls: Result<SslConnector, NetError>,
}

impl Default for ConnectJob {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectJob {
    pub fn new() -> Self {
        Self {
            tls: Self::build_tls(),
        }
    }

    fn build_tls() -> Result<SslConnector, NetError> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        builder
            .set_alpn_protos(ALPN_HTTP11)
            .map_err(|_| NetError::SslProtocolError)?;
        builder.set_verify(SslVerifyMode::PEER);
        Ok(builder.build())
    }

    pub async fn connect(&self, url: &Url) -> Result<SocketType, NetError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(NetError::UnknownUrlScheme);
        }
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // 1. DNS Resolution
        // IPv6 literals keep their brackets in host_str(), which lookup_host accepts.
        let addr_str = format!("{}:{}", host, port);
        let addrs = tokio::net::lookup_host(&addr_str).await.map_err(|e| {
            tracing::debug!(host = %host, error = %e, "DNS resolution failed");
            NetError::NameNotResolved
        })?;

        // 2. TCP Connect, first address that answers wins
        let mut last_error = NetError::NameNotResolved;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!(addr = %addr, error = %e, "TCP connect failed");
                    last_error = NetError::from(e);
                }
            }
        }
        let stream = stream.ok_or(last_error)?;
        let _ = stream.set_nodelay(true);

        // 3. SSL Handshake (if https)
        match url.scheme() {
            "https" => {
                let connector = self.tls.as_ref().map_err(|e| *e)?;
                let config = connector
                    .configure()
                    .map_err(|_| NetError::SslProtocolError)?;
                let tls_host = host.trim_start_matches('[').trim_end_matches(']');
                let tls_stream = tokio_boring::connect(config, tls_host, stream)
                    .await
                    .map_err(|e| {
                        tracing::debug!(host = %host, error = ?e, "SSL handshake failed");
                        NetError::SslProtocolError
                    })?;
                Ok(SocketType::Ssl(tls_stream))
            }
            "http" => Ok(SocketType::Tcp(stream)),
            _ => Err(NetError::UnknownUrlScheme),
        }
    }
}
