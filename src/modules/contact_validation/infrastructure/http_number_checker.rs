/// Number checker backed by the messaging gateway's HTTP API
use crate::modules::contact_validation::application::ports::NumberChecker;
use crate::modules::contact_validation::domain::errors::NumberCheckError;
use crate::shared::errors::{AppError, AppResult};
use crate::log_debug;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CheckNumberResponse {
    number: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    code: String,
    #[serde(default)]
    message: String,
}

pub struct HttpNumberChecker {
    client: Client,
    base_url: String,
}

impl HttpNumberChecker {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("contact-pipeline/1.0")
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn check_url(&self, number: &str, company_id: i64) -> String {
        format!(
            "{}/companies/{}/numbers/{}/check",
            self.base_url,
            company_id,
            urlencoding::encode(number)
        )
    }
}

/// Map a non-success gateway reply onto the structured error contract
fn classify_error_body(status: reqwest::StatusCode, body: &str) -> NumberCheckError {
    match serde_json::from_str::<GatewayErrorResponse>(body) {
        Ok(err) => NumberCheckError::from_code(err.code, err.message),
        Err(_) => NumberCheckError::Transient {
            code: format!("HTTP_{}", status.as_u16()),
            message: body.chars().take(200).collect(),
        },
    }
}

#[async_trait]
impl NumberChecker for HttpNumberChecker {
    async fn check_number(&self, number: &str, company_id: i64) -> Result<String, NumberCheckError> {
        let url = self.check_url(number, company_id);
        log_debug!("Checking number via {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NumberCheckError::transient(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NumberCheckError::transient(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_error_body(status, &body));
        }

        serde_json::from_str::<CheckNumberResponse>(&body)
            .map(|ok| ok.number)
            .map_err(|e| NumberCheckError::transient(format!("Unexpected response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_url_encodes_number() {
        let checker = HttpNumberChecker::with_client(Client::new(), "http://gateway/api/");
        assert_eq!(
            checker.check_url("+55 11 99999-9999", 3),
            "http://gateway/api/companies/3/numbers/%2B55%2011%2099999-9999/check"
        );
    }

    #[test]
    fn test_error_body_uses_code_contract() {
        let err = classify_error_body(
            StatusCode::BAD_REQUEST,
            r#"{"code":"ERR_WAPP_INVALID_CONTACT","message":"Contato inválido"}"#,
        );
        assert!(err.is_terminal_invalid());

        let err = classify_error_body(StatusCode::BAD_GATEWAY, r#"{"code":"ETIMEDOUT"}"#);
        assert!(!err.is_terminal_invalid());
    }

    #[test]
    fn test_unparseable_error_body_is_transient() {
        let err = classify_error_body(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>");
        assert_eq!(err.code(), "HTTP_503");
        assert!(!err.is_terminal_invalid());
    }
}
