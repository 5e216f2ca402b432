//! Shared plumbing for talking to upstream JSON APIs.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, WeatherError};

const USER_AGENT: &str = concat!("skybuddy/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every provider. The timeout bounds each upstream call.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|source| WeatherError::Http { service: "http client", source })
}

/// Send `request`, require a 2xx status and decode the body as `T`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Http { service, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Http { service, source })?;

    if !status.is_success() {
        debug!(service, %status, "upstream returned non-success status");
        return Err(WeatherError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| WeatherError::Parse { service, source })
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
