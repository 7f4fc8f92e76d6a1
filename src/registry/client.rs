//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent; the total timeout bounds JSON
//!   requests only, downloads are bounded per read so large archives finish
//! - Exponential backoff retry logic (max 3 retries)
//! - Rate limit error handling
//! - Streaming downloads written through a `.part` file

use crate::error::RegistryError;
use reqwest::{Client, Response, StatusCode};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("vsmodup/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with the given timeout and the default User-Agent
    pub fn with_timeout(timeout: Duration) -> Result<Self, RegistryError> {
        Self::with_config(timeout, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error("", format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            timeout,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Send a GET request, retrying transport failures and HTTP 429.
    ///
    /// `total` caps the whole request including its body; without it only
    /// connecting and each individual read are bounded. Any other status is
    /// returned to the caller untouched.
    async fn send_with_retry(
        &self,
        url: &str,
        mod_id: &str,
        total: Option<Duration>,
    ) -> Result<Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            if let Some(total) = total {
                request = request.timeout(total);
            }
            match request.send().await {
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    warn!(url, attempt, "rate limited by registry");
                    last_error = Some(RegistryError::RateLimitExceeded {
                        mod_id: mod_id.to_string(),
                    });
                }
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(url, attempt, error = %e, "request failed");
                    last_error = Some(if e.is_timeout() {
                        RegistryError::timeout(mod_id)
                    } else {
                        RegistryError::network_error(mod_id, e.to_string())
                    });
                }
            }

            if attempt < self.max_retries {
                // Wait before retrying with exponential backoff
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| RegistryError::network_error(mod_id, "unknown error")))
    }

    /// Perform a GET request with retry logic and error context
    pub async fn get_with_context(
        &self,
        url: &str,
        mod_id: &str,
    ) -> Result<Response, RegistryError> {
        let response = self
            .send_with_retry(url, mod_id, Some(self.timeout))
            .await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::mod_not_found(mod_id));
        }
        if !status.is_success() {
            return Err(RegistryError::network_error(mod_id, format!("HTTP {}", status)));
        }

        Ok(response)
    }

    /// Perform a GET request and parse JSON response with retry on parse errors
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        mod_id: &str,
    ) -> Result<T, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            // Network errors are already retried in get_with_context
            let response = self.get_with_context(url, mod_id).await?;

            match response.json::<T>().await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    last_error = Some(RegistryError::invalid_response(
                        mod_id,
                        format!("failed to parse JSON: {}", e),
                    ));

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::invalid_response(mod_id, "unknown JSON parse error")))
    }

    /// Download `url` to `target`.
    ///
    /// The body is streamed into `<target>.part` and renamed only once it is
    /// complete. A failed download removes the partial file.
    pub async fn download_to(&self, url: &str, target: &Path) -> Result<u64, RegistryError> {
        let fail = |message: String| RegistryError::download_failed(url, message);

        let mut response = self
            .send_with_retry(url, url, None)
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !response.status().is_success() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let part = part_path(target);
        let written = match stream_to_file(&mut response, &part).await {
            Ok(written) => written,
            Err(message) => {
                if let Err(e) = tokio::fs::remove_file(&part).await {
                    debug!(path = %part.display(), error = %e, "could not remove partial download");
                }
                return Err(fail(message));
            }
        };

        tokio::fs::rename(&part, target)
            .await
            .map_err(|e| fail(format!("failed to move {} into place: {}", part.display(), e)))?;

        debug!(url, target = %target.display(), bytes = written, "download complete");
        Ok(written)
    }
}

/// `<target>.part`
pub fn part_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

async fn stream_to_file(response: &mut Response, path: &Path) -> Result<u64, String> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| format!("failed to create {}: {}", path.display(), e))?;

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
        file.write_all(&chunk)
            .await
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_config() {
        let client = HttpClient::with_config(Duration::from_secs(60), "test-agent/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_max_retries() {
        let client = HttpClient::new().unwrap().with_max_retries(5);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_http_client_with_timeout_keeps_default_retries() {
        let client = HttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.max_retries, MAX_RETRIES);
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("vsmodup/"));
        assert_eq!(MAX_RETRIES, 3);
        assert_eq!(BASE_DELAY_MS, 100);
    }

    /// Serve `body` one byte per `gap` over a raw socket
    async fn trickle_server(body: &'static [u8], gap: Duration) -> String {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            let head = format!(
                "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for byte in body {
                tokio::time::sleep(gap).await;
                socket.write_all(&[*byte]).await.unwrap();
                socket.flush().await.unwrap();
            }
        });
        format!("http://{}/mod.zip", addr)
    }

    #[tokio::test]
    async fn test_slow_download_outlasts_timeout() {
        let url = trickle_server(b"zipdata", Duration::from_millis(300)).await;
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mod.zip");

        let client = HttpClient::with_timeout(Duration::from_secs(1))
            .unwrap()
            .with_max_retries(0);
        let written = client.download_to(&url, &target).await.unwrap();

        assert_eq!(written, 7);
        assert_eq!(std::fs::read(&target).unwrap(), b"zipdata");
    }

    #[tokio::test]
    async fn test_slow_json_hits_timeout() {
        let url = trickle_server(b"{\"a\": 1}", Duration::from_millis(300)).await;
        let client = HttpClient::with_timeout(Duration::from_secs(1))
            .unwrap()
            .with_max_retries(0);

        let err = client
            .get_json::<serde_json::Value>(&url, "slow")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Timeout { .. } | RegistryError::InvalidResponse { .. }
        ));
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/mods/carryon_1.2.0.zip")),
            PathBuf::from("/mods/carryon_1.2.0.zip.part")
        );
    }
}
