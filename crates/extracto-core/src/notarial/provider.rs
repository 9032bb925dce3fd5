//! External extraction provider contract and its HTTP client.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::EntityInput;

/// A document forwarded verbatim to a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ProviderDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let lower = self.file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            "application/pdf"
        } else if lower.ends_with(".txt") {
            "text/plain"
        } else {
            "application/octet-stream"
        }
    }
}

/// One act as reported by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderAct {
    pub tipo_acto: String,
    pub otorgantes: Vec<EntityInput>,
    pub beneficiarios: Vec<EntityInput>,
}

/// Provider answer: `{success, actos: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderResponse {
    pub success: bool,
    pub actos: Vec<ProviderAct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An independent extraction pipeline queried alongside the local one.
pub trait ExtractionProvider: Send + Sync {
    /// Extract acts from a document. A `success: false` answer is an error.
    fn extract(
        &self,
        document: &ProviderDocument,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}

/// Turn a decoded answer into a result, rejecting `success: false`.
pub fn accept_response(response: ProviderResponse) -> Result<ProviderResponse, ProviderError> {
    if response.success {
        Ok(response)
    } else {
        Err(ProviderError::Rejected(
            response
                .error
                .unwrap_or_else(|| "provider reported success=false".to_string()),
        ))
    }
}

#[cfg(feature = "http")]
pub use http::HttpExtractionProvider;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::multipart::{Form, Part};
    use tracing::{debug, info};

    use super::{ExtractionProvider, ProviderDocument, ProviderResponse, accept_response};
    use crate::error::{ExtractoError, ProviderError, Result};
    use crate::models::HybridConfig;

    /// Posts documents to `{base_url}/extract` as multipart `file`.
    #[derive(Debug, Clone)]
    pub struct HttpExtractionProvider {
        client: reqwest::Client,
        base_url: String,
        api_token: Option<String>,
        timeout: Duration,
    }

    impl HttpExtractionProvider {
        /// `base_url` should be like `http://localhost:5000` (no trailing slash).
        pub fn new(base_url: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                base_url: base_url.into().trim_end_matches('/').to_string(),
                api_token: None,
                timeout: Duration::from_secs(30),
            }
        }

        /// Build a client from the hybrid configuration section.
        pub fn from_config(config: &HybridConfig) -> Result<Self> {
            let url = config
                .provider_url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| ExtractoError::Config("hybrid.provider_url is not set".to_string()))?;

            let mut provider = Self::new(url).with_timeout(Duration::from_secs(config.timeout_secs));
            if let Some(token) = &config.api_token {
                provider = provider.with_token(token.clone());
            }
            Ok(provider)
        }

        pub fn with_token(mut self, token: impl Into<String>) -> Self {
            self.api_token = Some(token.into());
            self
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        pub fn endpoint(&self) -> String {
            format!("{}/extract", self.base_url)
        }

        async fn post(&self, document: &ProviderDocument) -> std::result::Result<ProviderResponse, ProviderError> {
            let url = self.endpoint();
            let part = Part::bytes(document.bytes.clone())
                .file_name(document.file_name.clone())
                .mime_str(document.mime_type())?;
            let form = Form::new().part("file", part);

            info!(url = %url, file = %document.file_name, "sending document to extraction provider");
            let mut request = self.client.post(&url).multipart(form).timeout(self.timeout);
            if let Some(token) = &self.api_token {
                request = request.bearer_auth(token);
            }

            let resp = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Http(e)
                }
            })?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ProviderError::Server {
                    status: status.as_u16(),
                    body,
                });
            }

            let response: ProviderResponse = resp.json().await?;
            debug!(acts = response.actos.len(), success = response.success, "provider answered");
            accept_response(response)
        }
    }

    impl ExtractionProvider for HttpExtractionProvider {
        async fn extract(&self, document: &ProviderDocument) -> std::result::Result<ProviderResponse, ProviderError> {
            self.post(document).await
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_from_config() {
            let mut config = HybridConfig::default();
            assert!(HttpExtractionProvider::from_config(&config).is_err());

            config.provider_url = Some("http://localhost:5000/".to_string());
            config.api_token = Some("secret".to_string());
            let provider = HttpExtractionProvider::from_config(&config).unwrap();
            assert_eq!(provider.endpoint(), "http://localhost:5000/extract");
            assert_eq!(provider.api_token.as_deref(), Some("secret"));
            assert_eq!(provider.timeout, Duration::from_secs(30));
        }
    }
}
