use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("bot: too many redirects")]
    TooManyRedirects,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Error reading response body")]
    HttpBodyError,

    // Page state errors
    #[error("bot: nil response")]
    NilResponse,
    #[error("bot: nil response body")]
    NilBody,

    // Cookie and persistence errors
    #[error("Cookie domain is a public suffix")]
    CookiePublicSuffix,
    #[error("Cookie has no usable domain")]
    CookieInvalidDomain,
    #[error("Cookie prefix validation failed")]
    CookieInvalidPrefix,
    #[error("Cookie snapshot is not valid JSON")]
    CookieInvalidData,
    #[error("Cookie snapshot could not be written")]
    CookieSerializeFailed,
    #[error("Cookie file I/O failed")]
    CookieFileError,

    #[error("Unknown network error ({0})")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::SslProtocolError => -107,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,
            NetError::TooManyRedirects => -310,
            NetError::InvalidResponse => -320,
            NetError::EmptyResponse => -324,
            NetError::HttpBodyError => -395,

            // Session-level errors (custom codes starting at -1000)
            NetError::NilResponse => -1000,
            NetError::NilBody => -1001,
            NetError::CookiePublicSuffix => -1010,
            NetError::CookieInvalidDomain => -1011,
            NetError::CookieInvalidPrefix => -1015,
            NetError::CookieInvalidData => -1012,
            NetError::CookieSerializeFailed => -1013,
            NetError::CookieFileError => -1014,
            NetError::Unknown(code) => *code,
        }
    }

    /// Whether the error happened before any response was received.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            NetError::ConnectionClosed
                | NetError::ConnectionReset
                | NetError::ConnectionRefused
                | NetError::ConnectionAborted
                | NetError::ConnectionFailed
                | NetError::NameNotResolved
                | NetError::SslProtocolError
                | NetError::ConnectionTimedOut
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -118 => NetError::ConnectionTimedOut,
            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,
            -310 => NetError::TooManyRedirects,
            -320 => NetError::InvalidResponse,
            -324 => NetError::EmptyResponse,
            -395 => NetError::HttpBodyError,
            -1000 => NetError::NilResponse,
            -1001 => NetError::NilBody,
            -1010 => NetError::CookiePublicSuffix,
            -1011 => NetError::CookieInvalidDomain,
            -1015 => NetError::CookieInvalidPrefix,
            -1012 => NetError::CookieInvalidData,
            -1013 => NetError::CookieSerializeFailed,
            -1014 => NetError::CookieFileError,
            other => NetError::Unknown(other),
        }
    }
}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
            ErrorKind::ConnectionReset => NetError::ConnectionReset,
            ErrorKind::ConnectionAborted => NetError::ConnectionAborted,
            ErrorKind::TimedOut => NetError::ConnectionTimedOut,
            ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe => NetError::ConnectionClosed,
            _ => NetError::ConnectionFailed,
        }
    }
}
