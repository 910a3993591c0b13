//! GraphQL client for the case-management API
//!
//! One POST per lookup:
//! `query getDossier($number: Int!) { dossier(number: $number) { number state } }`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::errors::{ParcoursError, Result};
use crate::schemas::{CaseStatus, CaseStatusConfig};

use super::{CaseStatusError, CaseStatusReader};

const DOSSIER_STATE_QUERY: &str =
    "query getDossier($number: Int!) { dossier(number: $number) { number state } }";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<DossierData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct DossierData {
    dossier: Option<DossierNode>,
}

#[derive(Debug, Deserialize)]
struct DossierNode {
    state: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default)]
    extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct ErrorExtensions {
    #[serde(default)]
    code: Option<String>,
}

/// Decode a `getDossier` response body.
///
/// A `not_found` error or a null dossier means the service does not know
/// the case.
pub fn parse_case_status_response(
    body: &str,
) -> std::result::Result<Option<CaseStatus>, CaseStatusError> {
    let response: GraphqlResponse =
        serde_json::from_str(body).map_err(|e| CaseStatusError::Malformed(e.to_string()))?;

    let not_found = response.errors.iter().any(|e| {
        e.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            == Some("not_found")
    });
    if not_found {
        return Ok(None);
    }
    if let Some(error) = response.errors.first() {
        return Err(CaseStatusError::Api(error.message.clone()));
    }

    let data = response
        .data
        .ok_or_else(|| CaseStatusError::Malformed("missing data".to_string()))?;
    match data.dossier {
        None => Ok(None),
        Some(node) => node
            .state
            .parse::<CaseStatus>()
            .map(Some)
            .map_err(CaseStatusError::Malformed),
    }
}

/// Reads dossier states over HTTP; every request is bounded by the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct GraphqlCaseStatusReader {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GraphqlCaseStatusReader {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParcoursError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(GraphqlCaseStatusReader {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }

    /// Build a reader from config, taking the token from `token_env`.
    pub fn from_config(config: &CaseStatusConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        if token.is_none() {
            tracing::warn!(
                "{} is not set, case-status requests will be anonymous",
                config.token_env
            );
        }
        Self::new(
            config.endpoint.clone(),
            token,
            Duration::from_secs(u64::from(config.timeout_seconds)),
        )
    }
}

fn transport_error(error: reqwest::Error) -> CaseStatusError {
    if error.is_timeout() {
        CaseStatusError::Timeout
    } else {
        CaseStatusError::Transport(error.to_string())
    }
}

#[async_trait]
impl CaseStatusReader for GraphqlCaseStatusReader {
    async fn case_status(
        &self,
        case_number: &str,
    ) -> std::result::Result<Option<CaseStatus>, CaseStatusError> {
        let number: i64 = case_number
            .trim()
            .parse()
            .map_err(|_| CaseStatusError::InvalidCaseNumber(case_number.to_string()))?;

        let body = json!({
            "operationName": "getDossier",
            "query": DOSSIER_STATE_QUERY,
            "variables": { "number": number },
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(case_number = number, "querying case status");
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaseStatusError::Http {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(transport_error)?;
        parse_case_status_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_state() {
        let body = r#"{"data":{"dossier":{"number":123,"state":"en_instruction"}}}"#;
        assert_eq!(
            parse_case_status_response(body),
            Ok(Some(CaseStatus::UnderReview))
        );
    }

    #[test]
    fn test_parse_null_dossier_is_not_found() {
        let body = r#"{"data":{"dossier":null}}"#;
        assert_eq!(parse_case_status_response(body), Ok(None));
    }

    #[test]
    fn test_parse_not_found_error() {
        let body = r#"{
            "data": {"dossier": null},
            "errors": [{"message": "Dossier not found", "extensions": {"code": "not_found"}}]
        }"#;
        assert_eq!(parse_case_status_response(body), Ok(None));
    }

    #[test]
    fn test_parse_other_api_error() {
        let body = r#"{"errors": [{"message": "Unauthorized", "extensions": {"code": "unauthorized"}}]}"#;
        assert_eq!(
            parse_case_status_response(body),
            Err(CaseStatusError::Api("Unauthorized".to_string()))
        );
    }

    #[test]
    fn test_parse_unknown_state_is_malformed() {
        let body = r#"{"data":{"dossier":{"number":1,"state":"archive"}}}"#;
        assert!(matches!(
            parse_case_status_response(body),
            Err(CaseStatusError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert!(matches!(
            parse_case_status_response("<html>502</html>"),
            Err(CaseStatusError::Malformed(_))
        ));
        assert!(matches!(
            parse_case_status_response("{}"),
            Err(CaseStatusError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_non_numeric_case_number_is_rejected_before_request() {
        let reader = GraphqlCaseStatusReader::new(
            "http://127.0.0.1:9/graphql",
            None,
            Duration::from_millis(50),
        )
        .unwrap();

        let err = reader.case_status("DS-42").await.unwrap_err();
        assert_eq!(err, CaseStatusError::InvalidCaseNumber("DS-42".to_string()));
    }
}
