//! Remote document gateway
//!
//! The compiled operation list is handed to a [`DocumentService`], which owns
//! authentication, transport and the service's wire format. [`google`] is the
//! Google Docs/Drive implementation; tests substitute in-memory services.

mod credentials;
mod google;
mod wire;

pub use credentials::{
    ConfigurationError, ServiceAccountCredentials, CLIENT_EMAIL_VARS, PRIVATE_KEY_VARS,
};
pub use google::GoogleDocsGateway;

use crate::operations::EditOperation;
use thiserror::Error;

/// Errors reported by a document service call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("HTTP {status} from {endpoint}: {body}")]
    Http {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },
}

/// Operations the publish pipeline needs from a document service
pub trait DocumentService {
    /// Create an empty document and return its id
    fn create_document(&self, title: &str) -> Result<String, GatewayError>;

    /// Apply the whole operation list as one atomic batch
    fn apply_operations(
        &self,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), GatewayError>;

    /// Let anyone holding the link edit the document
    fn grant_public_edit_access(&self, document_id: &str) -> Result<(), GatewayError>;

    /// Delete a document (best-effort cleanup after a failed build)
    fn delete_document(&self, document_id: &str) -> Result<(), GatewayError>;

    /// Canonical edit URL for a document
    fn document_url(&self, document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{document_id}/edit")
    }
}
