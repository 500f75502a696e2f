//! Request lifecycle above a single exchange: redirects and navigation history.

pub mod history;
pub mod job;
pub mod redirect;
