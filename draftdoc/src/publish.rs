//! Publish pipeline: create → apply → share
//!
//! Each remote step runs only after the previous one succeeded. A failure
//! reports the last stage reached and, once a document exists, its id and URL,
//! so the caller can finish or clean up that document instead of creating a
//! duplicate. Document creation is not idempotent, so nothing here retries.

use crate::gateway::{DocumentService, GatewayError};
use crate::operations::CompiledDraft;
use std::fmt;
use thiserror::Error;

/// Furthest point a publish run reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublishStage {
    /// Empty document exists
    Created,
    /// Content batch applied
    ContentApplied,
    /// Link sharing granted
    Shared,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::ContentApplied => write!(f, "content applied"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// Options for one publish run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    /// Grant edit access to anyone with the link
    pub share_with_anyone: bool,
    /// Best-effort delete of the document when applying content fails
    pub delete_on_failure: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            share_with_anyone: true,
            delete_on_failure: false,
        }
    }
}

/// A document that reached its final stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    pub document_id: String,
    pub url: String,
    /// `Shared`, or `ContentApplied` when sharing is disabled
    pub stage: PublishStage,
}

/// Publish failures, by step
#[derive(Error, Debug)]
pub enum PublishError {
    /// No document was created
    #[error("Failed to create document: {0}")]
    Create(#[source] GatewayError),

    /// The document exists but its content was not applied
    #[error("Failed to apply content to document {document_id}: {source}")]
    RemoteApply {
        document_id: String,
        url: String,
        /// The empty document was removed afterwards
        deleted: bool,
        #[source]
        source: GatewayError,
    },

    /// The document is complete but was not shared
    #[error("Document {url} is complete but could not be shared: {source}")]
    Permission {
        document_id: String,
        url: String,
        #[source]
        source: GatewayError,
    },
}

impl PublishError {
    /// Last stage reached before the failure, if any
    pub fn last_stage(&self) -> Option<PublishStage> {
        match self {
            Self::Create(_) => None,
            Self::RemoteApply { deleted: true, .. } => None,
            Self::RemoteApply { .. } => Some(PublishStage::Created),
            Self::Permission { .. } => Some(PublishStage::ContentApplied),
        }
    }

    /// Id of a document left behind by the failed run
    pub fn document_id(&self) -> Option<&str> {
        match self {
            Self::RemoteApply {
                deleted: false,
                document_id,
                ..
            }
            | Self::Permission { document_id, .. } => Some(document_id.as_str()),
            _ => None,
        }
    }
}

/// Create, fill and share a document
///
/// # Parameters
/// * `service` - Document service to call
/// * `draft` - Compiled title and operations
/// * `options` - Sharing and cleanup policy
///
/// # Returns
/// * `Ok(PublishedDocument)` - Document id, URL and final stage
/// * `Err(PublishError)` - The failing step, with any document left behind
pub fn publish(
    service: &dyn DocumentService,
    draft: &CompiledDraft,
    options: &PublishOptions,
) -> Result<PublishedDocument, PublishError> {
    let document_id = service
        .create_document(&draft.title)
        .map_err(PublishError::Create)?;
    let url = service.document_url(&document_id);
    log::info!("Stage {}: {}", PublishStage::Created, url);

    if let Err(source) = service.apply_operations(&document_id, &draft.operations) {
        let deleted = options.delete_on_failure && cleanup(service, &document_id);
        return Err(PublishError::RemoteApply {
            document_id,
            url,
            deleted,
            source,
        });
    }
    log::info!(
        "Stage {}: {} operations",
        PublishStage::ContentApplied,
        draft.operations.len()
    );

    if !options.share_with_anyone {
        log::info!("Link sharing disabled, leaving {} private", document_id);
        return Ok(PublishedDocument {
            document_id,
            url,
            stage: PublishStage::ContentApplied,
        });
    }

    if let Err(source) = service.grant_public_edit_access(&document_id) {
        return Err(PublishError::Permission {
            document_id,
            url,
            source,
        });
    }
    log::info!("Stage {}", PublishStage::Shared);

    Ok(PublishedDocument {
        document_id,
        url,
        stage: PublishStage::Shared,
    })
}

fn cleanup(service: &dyn DocumentService, document_id: &str) -> bool {
    match service.delete_document(document_id) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to delete orphaned document {}: {}", document_id, e);
            false
        }
    }
}
