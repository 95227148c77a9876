//! Page fetching
//!
//! One blocking GET per call, no retries and no caching.

use tracing::debug;

use crate::error::{BridgeError, Result};

/// Source of page bodies. The production implementation goes over HTTP;
/// tests substitute canned pages or failures.
pub trait PageFetcher {
    /// Fetch `url` and decode the body as text
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetch `url` as raw bytes (images)
    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher with a fixed user agent
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// With `status_as_error` off, 4xx/5xx responses still hand back their
    /// body. Error pages often carry the same `<title>` and metadata.
    fn get(
        &self,
        url: &str,
        status_as_error: bool,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        debug!(url, user_agent = %self.user_agent, "Fetching page");
        let response = ureq::get(url)
            .config()
            .http_status_as_error(status_as_error)
            .build()
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|e| http_error(url, e))?;
        if !response.status().is_success() {
            debug!(url, status = response.status().as_u16(), "Non-success status");
        }
        Ok(response)
    }
}

fn http_error(url: &str, err: impl std::fmt::Display) -> BridgeError {
    BridgeError::Http {
        url: url.to_string(),
        message: err.to_string(),
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self
            .get(url, false)?
            .into_body()
            .read_to_string()
            .map_err(|e| http_error(url, e))?;
        debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url, true)?
            .into_body()
            .read_to_vec()
            .map_err(|e| http_error(url, e))?;
        debug!(url, bytes = bytes.len(), "Fetched binary resource");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one canned HTTP response on a loopback port
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
        });
        format!("http://{}/page", addr)
    }

    #[test]
    fn test_fetch_text_reads_error_page_body() {
        let url = serve_once("404 Not Found", "<title>Gone Girl</title>");
        let body = HttpFetcher::new("Mozilla/5.0").fetch_text(&url).unwrap();
        assert_eq!(body, "<title>Gone Girl</title>");
    }

    #[test]
    fn test_fetch_bytes_rejects_error_status() {
        let url = serve_once("500 Internal Server Error", "oops");
        let err = HttpFetcher::new("Mozilla/5.0").fetch_bytes(&url).unwrap_err();
        assert!(matches!(err, BridgeError::Http { .. }), "{:?}", err);
    }

    #[test]
    fn test_fetch_text_ok_page() {
        let url = serve_once("200 OK", "<title>Dark</title>");
        let body = HttpFetcher::new("Mozilla/5.0").fetch_text(&url).unwrap();
        assert!(body.contains("Dark"));
    }
}
