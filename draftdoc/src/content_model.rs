//! Content model: the extracted sections a document is generated from

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One labeled unit of extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Page the text was found on (e.g., "Página 1")
    #[serde(default)]
    pub page: String,

    /// Descriptive section name (e.g., "Hero Principal")
    #[serde(default)]
    pub section: String,

    /// Where on the page the section sits (e.g., "Topo central")
    #[serde(default)]
    pub location: String,

    /// Extracted body text
    #[serde(default)]
    pub text: String,
}

impl Section {
    /// Create a section from its four labels
    pub fn new(
        page: impl Into<String>,
        section: impl Into<String>,
        location: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            page: page.into(),
            section: section.into(),
            location: location.into(),
            text: text.into(),
        }
    }
}

/// Extraction result: the input file for compile and publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Client project name, used in the document title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// When the content was extracted, as reported by the extractor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<String>,

    /// Sections in document order
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// Errors loading or validating a generation request
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Failed to read {path}: {source}", path = .path.display())]
    IoError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid request JSON in {path}: {source}", path = .path.display())]
    ParseError {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing projectName")]
    MissingProjectName,

    #[error("Request contains no sections")]
    NoSections,
}

impl GenerationRequest {
    /// Load a request from a JSON file
    ///
    /// # Parameters
    /// * `path` - Path to the extraction result JSON
    ///
    /// # Returns
    /// * `Ok(GenerationRequest)` - Parsed request
    /// * `Err(RequestError)` - The file could not be read or is not valid JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RequestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| RequestError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| RequestError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Project name, if present and not blank
    pub fn project_name(&self) -> Option<&str> {
        self.project_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Check the request is complete enough to publish
    ///
    /// Compiling tolerates a missing name or an empty section list; publishing
    /// a document for either is refused before any remote call is made.
    pub fn validate_for_publish(&self) -> Result<(), RequestError> {
        if self.project_name().is_none() {
            return Err(RequestError::MissingProjectName);
        }
        if self.sections.is_empty() {
            return Err(RequestError::NoSections);
        }
        Ok(())
    }
}
