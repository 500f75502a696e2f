//! Socket and connection management.
//!
//! Provides connection setup mirroring Chromium's `net/socket/`:
//! - [`connectjob`]: DNS → TCP → TLS connection flow
//! - [`client`]: the connected socket, plain or TLS

pub mod client;
pub mod connectjob;
