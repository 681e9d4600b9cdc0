//! Google Docs and Drive implementation of [`DocumentService`]
//!
//! Authenticates as a service account: an RS256-signed JWT assertion is
//! exchanged at the OAuth token endpoint for a bearer token, which is then
//! used for the document and permission calls. Requests are synchronous
//! (`ureq`) and each call completes before the next one starts.

use super::credentials::{ConfigurationError, ServiceAccountCredentials};
use super::wire::to_batch_requests;
use super::{DocumentService, GatewayError};
use crate::app_config::GatewayConfig;
use crate::operations::EditOperation;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scopes requested for the access token
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive",
];

/// Lifetime requested for the signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Maximum number of response body characters kept in error messages
const ERROR_BODY_PREVIEW: usize = 500;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

#[derive(Debug, Serialize)]
struct NewDocument<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize)]
struct Permission<'a> {
    role: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Authenticated client for the Google document service
pub struct GoogleDocsGateway {
    agent: ureq::Agent,
    config: GatewayConfig,
    access_token: String,
}

impl GoogleDocsGateway {
    /// Authenticate and build a gateway
    ///
    /// # Parameters
    /// * `config` - Endpoints, timeout and sharing policy
    /// * `credentials` - Service-account identity
    ///
    /// # Returns
    /// * `Ok(GoogleDocsGateway)` - Gateway holding a fresh access token
    /// * `Err(GatewayError)` - The key could not be loaded or the token exchange failed
    pub fn connect(
        config: GatewayConfig,
        credentials: &ServiceAccountCredentials,
    ) -> Result<Self, GatewayError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        let key = EncodingKey::from_rsa_pem(credentials.private_key_pem.as_bytes())
            .map_err(|e| ConfigurationError::InvalidPrivateKey(e.to_string()))?;

        let assertion = sign_assertion(&credentials.client_email, &config.token_url, &key)?;

        log::info!("Requesting access token for {}", credentials.client_email);
        let response = agent
            .post(&config.token_url)
            .send_form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .map_err(|e| map_ureq_error(&config.token_url, e))?;

        let token: TokenResponse = response
            .into_json()
            .map_err(|e| GatewayError::Auth(format!("unreadable token response: {e}")))?;

        Ok(Self {
            agent,
            config,
            access_token: token.access_token,
        })
    }

    fn documents_url(&self) -> String {
        format!("{}/v1/documents", self.config.docs_api_url)
    }

    fn batch_update_url(&self, document_id: &str) -> String {
        format!(
            "{}/v1/documents/{}:batchUpdate",
            self.config.docs_api_url, document_id
        )
    }

    fn file_url(&self, document_id: &str) -> String {
        format!("{}/drive/v3/files/{}", self.config.drive_api_url, document_id)
    }

    fn permissions_url(&self, document_id: &str) -> String {
        format!("{}/permissions", self.file_url(document_id))
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    fn post_json<T: Serialize>(&self, url: &str, body: &T) -> Result<ureq::Response, GatewayError> {
        self.agent
            .post(url)
            .set("Authorization", &self.bearer())
            .send_json(body)
            .map_err(|e| map_ureq_error(url, e))
    }
}

impl DocumentService for GoogleDocsGateway {
    fn create_document(&self, title: &str) -> Result<String, GatewayError> {
        let url = self.documents_url();
        let response = self.post_json(&url, &NewDocument { title })?;

        let created: CreatedDocument =
            response
                .into_json()
                .map_err(|e| GatewayError::InvalidResponse {
                    endpoint: url.clone(),
                    message: e.to_string(),
                })?;

        log::info!("Created document {}", created.document_id);
        Ok(created.document_id)
    }

    fn apply_operations(
        &self,
        document_id: &str,
        operations: &[EditOperation],
    ) -> Result<(), GatewayError> {
        let batch = to_batch_requests(operations);
        if batch.requests.is_empty() {
            log::warn!("No requests to apply to document {}", document_id);
            return Ok(());
        }

        let url = self.batch_update_url(document_id);
        log::info!(
            "Applying {} requests to document {}",
            batch.requests.len(),
            document_id
        );
        self.post_json(&url, &batch)?;
        Ok(())
    }

    fn grant_public_edit_access(&self, document_id: &str) -> Result<(), GatewayError> {
        let url = self.permissions_url(document_id);
        let permission = Permission {
            role: self.config.sharing.role.as_str(),
            kind: "anyone",
        };
        self.post_json(&url, &permission)?;
        log::info!(
            "Granted {} access to anyone with the link on {}",
            permission.role,
            document_id
        );
        Ok(())
    }

    fn delete_document(&self, document_id: &str) -> Result<(), GatewayError> {
        let url = self.file_url(document_id);
        self.agent
            .delete(&url)
            .set("Authorization", &self.bearer())
            .call()
            .map_err(|e| map_ureq_error(&url, e))?;
        log::info!("Deleted document {}", document_id);
        Ok(())
    }

    fn document_url(&self, document_id: &str) -> String {
        format!("{}/{}/edit", self.config.document_url_base, document_id)
    }
}

/// Build the signed JWT bearer assertion for the token endpoint
fn sign_assertion(
    client_email: &str,
    token_url: &str,
    key: &EncodingKey,
) -> Result<String, GatewayError> {
    let issued_at = chrono::Utc::now().timestamp();
    let claims = Claims {
        iss: client_email,
        scope: SCOPES.join(" "),
        aud: token_url,
        iat: issued_at,
        exp: issued_at + ASSERTION_LIFETIME_SECS,
    };

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, key)
        .map_err(|e| GatewayError::Auth(format!("failed to sign assertion: {e}")))
}

fn map_ureq_error(endpoint: &str, error: ureq::Error) -> GatewayError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            GatewayError::Http {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            }
        }
        ureq::Error::Transport(transport) => GatewayError::Transport {
            endpoint: endpoint.to_string(),
            message: transport.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_body() {
        let permission = Permission {
            role: "writer",
            kind: "anyone",
        };
        assert_eq!(
            serde_json::to_value(&permission).unwrap(),
            serde_json::json!({"role": "writer", "type": "anyone"})
        );
    }

    #[test]
    fn test_claims_shape() {
        let claims = Claims {
            iss: "bot@example.com",
            scope: SCOPES.join(" "),
            aud: "https://oauth2.googleapis.com/token",
            iat: 100,
            exp: 100 + ASSERTION_LIFETIME_SECS,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value["scope"],
            "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive"
        );
        assert_eq!(value["exp"], 3700);
    }

    #[test]
    fn test_invalid_key_is_reported() {
        let credentials = ServiceAccountCredentials {
            client_email: "bot@example.com".to_string(),
            private_key_pem: super::super::credentials::normalize_private_key("bm90IGEga2V5"),
        };
        let result = GoogleDocsGateway::connect(GatewayConfig::default(), &credentials);
        assert!(matches!(
            result,
            Err(GatewayError::Configuration(ConfigurationError::InvalidPrivateKey(_)))
        ));
    }

    fn gateway(config: GatewayConfig) -> GoogleDocsGateway {
        GoogleDocsGateway {
            agent: ureq::agent(),
            config,
            access_token: "token".to_string(),
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let gateway = gateway(GatewayConfig::default());

        assert_eq!(
            gateway.documents_url(),
            "https://docs.googleapis.com/v1/documents"
        );
        assert_eq!(
            gateway.batch_update_url("1AbC"),
            "https://docs.googleapis.com/v1/documents/1AbC:batchUpdate"
        );
        assert_eq!(
            gateway.permissions_url("1AbC"),
            "https://www.googleapis.com/drive/v3/files/1AbC/permissions"
        );
        assert_eq!(
            gateway.file_url("1AbC"),
            "https://www.googleapis.com/drive/v3/files/1AbC"
        );
        assert_eq!(
            gateway.document_url("1AbC"),
            "https://docs.google.com/document/d/1AbC/edit"
        );
        assert_eq!(gateway.bearer(), "Bearer token");
    }

    #[test]
    fn test_endpoint_urls_follow_config() {
        let config = GatewayConfig {
            docs_api_url: "http://localhost:8080".to_string(),
            drive_api_url: "http://localhost:8081".to_string(),
            ..GatewayConfig::default()
        };
        let gateway = gateway(config);

        assert_eq!(
            gateway.batch_update_url("d"),
            "http://localhost:8080/v1/documents/d:batchUpdate"
        );
        assert_eq!(
            gateway.permissions_url("d"),
            "http://localhost:8081/drive/v3/files/d/permissions"
        );
    }

    #[test]
    fn test_status_error_keeps_body_preview() {
        let body = "x".repeat(ERROR_BODY_PREVIEW + 100);
        let response = ureq::Response::new(403, "Forbidden", &body).unwrap();

        let endpoint = "https://docs.googleapis.com/v1/documents";
        match map_ureq_error(endpoint, ureq::Error::Status(403, response)) {
            GatewayError::Http {
                endpoint: reported,
                status,
                body,
            } => {
                assert_eq!(reported, endpoint);
                assert_eq!(status, 403);
                assert_eq!(body.len(), ERROR_BODY_PREVIEW);
            }
            other => panic!("expected an HTTP error, got {:?}", other),
        }
    }

    #[test]
    fn test_transport_error_is_not_a_status() {
        let error = ureq::get("not a url").call().unwrap_err();

        assert!(matches!(
            map_ureq_error("not a url", error),
            GatewayError::Transport { ref endpoint, .. } if endpoint == "not a url"
        ));
    }

    #[test]
    fn test_created_document_parsing() {
        let created: CreatedDocument =
            serde_json::from_str(r#"{"documentId": "1AbC", "title": "x"}"#).unwrap();
        assert_eq!(created.document_id, "1AbC");
    }
}
