//! Inference service access.
//!
//! [`DetectorClient`] performs the HTTP calls; [`interpret_response`] is the pure
//! mapping from an HTTP status and body to a result or error kind.

mod client;
mod response;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::DetectorClient;
pub use response::interpret_response;

/// Multipart field carrying the image bytes.
pub const FILE_FIELD: &str = "file";
