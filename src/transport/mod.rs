//! Delivery of rendered payloads to the simulation backend.
//!
//! Transports do one round-trip per call and never retry; the session keeps
//! its queue intact when a call fails so the caller can decide.

pub mod api;
pub mod rcon;

use thiserror::Error;

pub use api::ApiClient;
pub use rcon::RconClient;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RCON authentication rejected")]
    AuthRejected,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Console-command channel: one command in, one text reply out.
pub trait CommandTransport {
    fn send(&mut self, command: &str) -> Result<String, TransportError>;
}

/// JSON-over-HTTP channel.
pub trait HttpTransport {
    fn post(
        &mut self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError>;

    fn get(&mut self, path: &str) -> Result<serde_json::Value, TransportError>;
}

impl<T: CommandTransport + ?Sized> CommandTransport for Box<T> {
    fn send(&mut self, command: &str) -> Result<String, TransportError> {
        (**self).send(command)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn post(
        &mut self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        (**self).post(path, body)
    }

    fn get(&mut self, path: &str) -> Result<serde_json::Value, TransportError> {
        (**self).get(path)
    }
}
