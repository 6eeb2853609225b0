//! HTTP fetching for listing pages and documents.
//!
//! Uses async reqwest on a shared runtime behind a sync facade. Every
//! request carries the same user agent and a caller-supplied total timeout.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::header;

/// Connect timeout, separate from the per-request total timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every page fetch and download
pub const USER_AGENT: &str = "muniline/0.1";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7";

/// Error types for fetch operations
#[derive(Debug)]
pub enum FetchError {
    /// HTTP error with optional status code
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Response body is not an HTML/XML page
    NotHtml { content_type: String },
    /// I/O error while writing a download
    Io(std::io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::NotHtml { content_type } => {
                write!(f, "response is not HTML/XML (content-type: {content_type})")
            }
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create HTTP error from reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            // Client errors will not go away on retry; timeouts and 5xx might
            Self::Http { status, .. } => {
                !matches!(status, Some(400) | Some(401) | Some(403) | Some(404) | Some(410))
            }
            Self::NotHtml { .. } => false,
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Fetch a listing page as text.
///
/// Rejects bodies that are neither declared as HTML/XML by the server nor
/// recognizably HTML (some portal endpoints redirect document links to
/// binary payloads).
pub fn fetch_html(url: &str, timeout: Duration) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, ACCEPT_HTML)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        if !content_type.contains("html") && !content_type.contains("xml") {
            let head = body[..body.len().min(4096)].to_ascii_lowercase();
            if !head.contains("<html") && !head.contains("<!doctype html") {
                return Err(FetchError::NotHtml { content_type });
            }
        }

        Ok(body)
    })
}

/// Download a document into `raw_dir` under `file_name`.
///
/// An existing file is reused unless `overwrite` is set. The body is
/// streamed into an anonymous temp file and renamed into place, so a
/// half-written download never shadows a complete one.
pub fn download_document(
    url: &str,
    file_name: &str,
    raw_dir: &Path,
    timeout: Duration,
    overwrite: bool,
) -> Result<PathBuf, FetchError> {
    let target = raw_dir.join(file_name);
    if target.exists() && !overwrite {
        log::debug!("{file_name}: already staged, reusing");
        return Ok(target);
    }

    SHARED_RUNTIME.handle().block_on(async {
        let mut response = SHARED_CLIENT
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "*/*")
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(raw_dir)?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?
        {
            tmp.write_all(&chunk)?;
        }
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| FetchError::Io(e.error))?;
        Ok(target)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn http_err(status: u16) -> FetchError {
        FetchError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    #[test]
    fn http_404_not_retryable() {
        assert!(!http_err(404).is_retryable());
    }

    #[test]
    fn http_403_not_retryable() {
        assert!(!http_err(403).is_retryable());
    }

    #[test]
    fn http_500_retryable() {
        assert!(http_err(500).is_retryable());
    }

    #[test]
    fn http_429_retryable() {
        assert!(http_err(429).is_retryable());
    }

    #[test]
    fn http_none_status_retryable() {
        // Network error without a status code should be retryable
        let err = FetchError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn not_html_not_retryable() {
        let err = FetchError::NotHtml {
            content_type: "application/zip".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_timeout_retryable() {
        let err = FetchError::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
        assert!(err.is_retryable());
    }

    #[test]
    fn io_storage_full_not_retryable() {
        let err = FetchError::Io(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(404)), "HTTP 404: test");
    }

    #[test]
    fn display_not_html() {
        let err = FetchError::NotHtml {
            content_type: "application/pdf".to_string(),
        };
        assert!(format!("{err}").contains("application/pdf"));
    }
}
