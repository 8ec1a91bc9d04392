//! HTTP client wrapper for talking to a Colectica registry.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;

use crate::config::{HTTP_TIMEOUT_SECS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("ddi-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Send a request with retry logic.
///
/// Uses exponential backoff for transient failures (connection errors,
/// timeouts, 5xx responses). `build` is called once per attempt because a
/// request is consumed by sending it.
///
/// Any non-5xx response is returned as-is; use [`check_status`] to classify it.
pub fn send_with_retry<F>(build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match build().send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                return Ok(response);
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(HarvesterError::Http(e));
            }
        }
    }

    Err(HarvesterError::TransientNetwork {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Map a response status onto the harvester's error classes.
///
/// 404 becomes `ItemNotFound` for `agency`/`identifier`, 401 and 403 become
/// `Auth`, any other non-success status is an `Http` error.
pub fn check_status(response: Response, agency: &str, identifier: &str) -> Result<Response> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(HarvesterError::ItemNotFound {
            agency: agency.to_string(),
            identifier: identifier.to_string(),
        }),
        status @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => Err(HarvesterError::Auth(
            format!("registry answered {status} for {agency}/{identifier}"),
        )),
        _ => Ok(response.error_for_status()?),
    }
}

/// Send with retries, classify the status and decode a JSON body.
pub fn get_json<T, F>(build: F, agency: &str, identifier: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let response = check_status(send_with_retry(build)?, agency, identifier)?;
    Ok(response.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("ddi-harvester/"));
    }
}
