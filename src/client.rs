//! Calls to the archive server: document export and image deletion.
//!
//! The HTTP layer sits behind [`Transport`] so the status handling can be
//! tested without a server. [`ArchiveClient`] always branches on the status
//! code before deciding how to read the body:
//!
//! | Endpoint | 2xx | non-2xx |
//! |----------|-----|---------|
//! | export | binary spreadsheet | JSON `{error}` |
//! | delete | JSON `{success, error?}` | JSON `{success: false, error}` or anything |
//!
//! Requests are issued once. There is no retry and no timeout beyond what
//! the transport itself enforces.

use crate::config::ServerConfig;
use crate::types::{DeleteRequest, DeleteResponse, ErrorBody, ExportPayload};
use serde::Serialize;
use std::io::Read;
use thiserror::Error;

/// The request never produced an HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Unexpected server response: {0}")]
    Decode(String),
    #[error("Could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A raw HTTP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends a JSON body with `POST` and returns whatever came back.
pub trait Transport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport over `ureq`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, TransportError> {
        let response = match self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_bytes(body)
        {
            Ok(response) => response,
            // Non-2xx still carries a body we want to read.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(TransportError(err.to_string())),
        };
        let status = response.status();
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse {
            status,
            body: bytes,
        })
    }
}

/// Export and delete calls against one server.
#[derive(Debug, Clone)]
pub struct ArchiveClient<T> {
    transport: T,
    export_url: String,
    delete_url: String,
}

impl<T: Transport> ArchiveClient<T> {
    pub fn new(transport: T, server: &ServerConfig) -> Self {
        Self {
            transport,
            export_url: server.export_url(),
            delete_url: server.delete_url(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST the payload and return the generated document bytes.
    pub fn export(&self, payload: &ExportPayload) -> Result<Vec<u8>, ClientError> {
        let response = self.post(&self.export_url, payload)?;
        if response.is_success() {
            return Ok(response.body);
        }
        Err(server_error(&response, "Server error"))
    }

    /// Ask the server to delete the image at `image_url`.
    pub fn delete(&self, image_url: &str) -> Result<(), ClientError> {
        let request = DeleteRequest {
            image_url: image_url.to_string(),
        };
        let response = self.post(&self.delete_url, &request)?;
        if !response.is_success() {
            return Err(server_error(&response, "Deletion failed"));
        }
        let reply: DeleteResponse = serde_json::from_slice(&response.body)
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        if reply.success {
            Ok(())
        } else {
            Err(ClientError::Server {
                status: response.status,
                message: reply.error.unwrap_or_else(|| "Deletion failed".to_string()),
            })
        }
    }

    fn post(&self, url: &str, body: &impl Serialize) -> Result<HttpResponse, ClientError> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self.transport.post_json(url, &bytes)?)
    }
}

/// Error from a failed reply, preferring the server's own `error` message.
fn server_error(response: &HttpResponse, fallback: &str) -> ClientError {
    let message = serde_json::from_slice::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("{fallback} (status {})", response.status));
    ClientError::Server {
        status: response.status,
        message,
    }
}
