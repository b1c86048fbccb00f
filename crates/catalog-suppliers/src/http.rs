//! Response handling shared by the supplier clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::SupplierError;

/// Build the `reqwest::Client` every supplier client wraps.
///
/// # Errors
///
/// Returns [`SupplierError::Http`] if the client cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SupplierError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Map non-success statuses to typed errors and return the body text.
pub(crate) async fn read_body(
    response: Response,
    supplier: &str,
    url: &str,
) -> Result<String, SupplierError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(5);
        return Err(SupplierError::RateLimited {
            supplier: supplier.to_owned(),
            retry_after_secs,
        });
    }

    if status == StatusCode::NOT_FOUND {
        return Err(SupplierError::NotFound {
            url: url.to_owned(),
        });
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(SupplierError::Unauthorized {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(SupplierError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response.text().await?)
}

pub(crate) fn parse_json<T: DeserializeOwned>(
    body: &str,
    context: impl FnOnce() -> String,
) -> Result<T, SupplierError> {
    serde_json::from_str::<T>(body).map_err(|e| SupplierError::Deserialize {
        context: context(),
        source: e,
    })
}
