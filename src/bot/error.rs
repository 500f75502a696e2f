use crate::base::neterror::NetError;
use crate::page::Page;
use http::StatusCode;
use thiserror::Error;

/// Failure of a GET or POST.
#[derive(Debug, Error)]
pub enum BotError {
    /// Nothing usable came back: connection, DNS, timeout, redirect loop.
    #[error(transparent)]
    Net(#[from] NetError),

    /// The server answered with a non-2xx status. The page is intact so
    /// the error body can still be read.
    #[error("bot: non 2xx response code: {}: {}", .status.as_u16(), .status)]
    Status { status: StatusCode, page: Box<Page> },
}

impl BotError {
    pub fn page(&self) -> Option<&Page> {
        match self {
            BotError::Status { page, .. } => Some(&**page),
            BotError::Net(_) => None,
        }
    }

    pub fn page_mut(&mut self) -> Option<&mut Page> {
        match self {
            BotError::Status { page, .. } => Some(&mut **page),
            BotError::Net(_) => None,
        }
    }

    pub fn into_page(self) -> Option<Page> {
        match self {
            BotError::Status { page, .. } => Some(*page),
            BotError::Net(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BotError::Status { status, .. } => Some(*status),
            BotError::Net(_) => None,
        }
    }

    pub fn net_error(&self) -> Option<NetError> {
        match self {
            BotError::Net(e) => Some(*e),
            BotError::Status { .. } => None,
        }
    }

    pub fn is_too_many_redirects(&self) -> bool {
        matches!(self, BotError::Net(NetError::TooManyRedirects))
    }
}
