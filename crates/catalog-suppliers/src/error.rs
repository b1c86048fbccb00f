use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {supplier} (retry after {retry_after_secs}s)")]
    RateLimited {
        supplier: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unauthorized: {url}")]
    Unauthorized { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("authentication with {supplier} failed: {reason}")]
    Auth { supplier: String, reason: String },

    #[error("no credentials configured for {supplier}")]
    MissingCredentials { supplier: String },

    #[error("pagination limit reached for {supplier}: exceeded {max_pages} pages")]
    PaginationLimit { supplier: String, max_pages: usize },

    #[error("could not parse HTML for {context}: {reason}")]
    Html { context: String, reason: String },

    #[error("image re-host failed for {url}: {reason}")]
    ImageHost { url: String, reason: String },
}
