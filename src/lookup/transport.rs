use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{LookupResponse, LookupTransport};
use crate::config::LookupConfig;
use crate::config::defaults::DEFAULT_USER_AGENT;
use crate::errors::{AppError, AppResult, LookupError, LookupResult};

/// Invokes lookup functions over HTTP at `{base_url}/functions/v1/{name}`
#[derive(Debug, Clone)]
pub struct HttpLookupTransport {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpLookupTransport {
    pub fn from_config(config: &LookupConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid lookup base_url '{}': {}", config.base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn function_url(&self, function_name: &str) -> String {
        format!(
            "{}/functions/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            function_name
        )
    }
}

#[async_trait]
impl LookupTransport for HttpLookupTransport {
    async fn invoke(&self, function_name: &str, payload: Value) -> LookupResult<LookupResponse> {
        let url = self.function_url(function_name);
        debug!("Invoking lookup function {} at {}", function_name, url);

        let mut request = self.client.post(&url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                "Lookup function {} returned HTTP {}",
                function_name,
                status.as_u16()
            );
            return Err(LookupError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        if body.trim().is_empty() {
            return Ok(LookupResponse::default());
        }

        let value: Value = serde_json::from_str(&body)?;
        Ok(envelope_from_body(value))
    }
}

/// Functions may answer with a bare payload or with an explicit envelope
fn envelope_from_body(value: Value) -> LookupResponse {
    match value {
        Value::Object(mut map)
            if map.contains_key("error") && !map.contains_key("data") =>
        {
            let message = match map.remove("error") {
                Some(Value::String(message)) => message,
                Some(Value::Null) | None => return LookupResponse::default(),
                Some(other) => other.to_string(),
            };
            LookupResponse::error(message)
        }
        Value::Object(mut map) if map.contains_key("data") => LookupResponse {
            data: map.remove("data").filter(|data| !data.is_null()),
            error: match map.remove("error") {
                Some(Value::String(message)) => Some(message),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            },
        },
        other => LookupResponse::data(other),
    }
}
