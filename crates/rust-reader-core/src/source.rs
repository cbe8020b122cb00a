//! Where document text comes from.
//!
//! The reader only needs one capability from the outside world: turn a
//! location into bytes. Sources are shared with short-lived fetch threads,
//! so they must be `Send + Sync`.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::encoding::decode_document;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the raw bytes of a document.
pub trait TextSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the document cannot be retrieved.
    fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP(S) GET with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("rust-reader/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl TextSource for HttpSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(location)
            .send()
            .with_context(|| format!("request to {location} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{location} returned HTTP {status}");
        }
        let body = response
            .bytes()
            .with_context(|| format!("failed to read response body from {location}"))?;
        Ok(body.to_vec())
    }
}

/// Local files, addressed by path or `file://` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl TextSource for FileSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        std::fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))
    }
}

/// Dispatches `http://`/`https://` locations to HTTP and everything else to the filesystem.
#[derive(Debug, Clone)]
pub struct DefaultSource {
    http: HttpSource,
    file: FileSource,
}

impl DefaultSource {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpSource::new()?,
            file: FileSource,
        })
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

impl TextSource for DefaultSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if is_http(location) {
            self.http.fetch(location.trim())
        } else {
            self.file.fetch(location)
        }
    }
}

/// In-memory documents, with an optional artificial latency per entry.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: HashMap<String, (Vec<u8>, Duration)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        self.insert(location, text);
        self
    }

    /// Adds a document whose fetch blocks for `delay` first.
    pub fn with_delay(
        mut self,
        location: impl Into<String>,
        text: impl Into<Vec<u8>>,
        delay: Duration,
    ) -> Self {
        self.docs.insert(location.into(), (text.into(), delay));
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, text: impl Into<Vec<u8>>) {
        self.docs.insert(location.into(), (text.into(), Duration::ZERO));
    }
}

impl TextSource for MemorySource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let Some((bytes, delay)) = self.docs.get(location) else {
            bail!("no document at {location}");
        };
        if !delay.is_zero() {
            std::thread::sleep(*delay);
        }
        Ok(bytes.clone())
    }
}

/// Fetches `location` and decodes it into `\n`-separated text.
///
/// # Errors
///
/// Returns an error if the fetch or decoding fails.
pub fn load_text(source: &dyn TextSource, location: &str) -> Result<String> {
    let bytes = source
        .fetch(location)
        .with_context(|| format!("failed to fetch {location}"))?;
    let (text, encoding) = decode_document(&bytes)
        .with_context(|| format!("failed to decode {location}"))?;
    tracing::debug!("Fetched {location}: {} bytes, {encoding}", bytes.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_roundtrip() {
        let source = MemorySource::new().with("book", "line one\r\nline two");
        assert_eq!(load_text(&source, "book").unwrap(), "line one\nline two");
    }

    #[test]
    fn test_memory_source_missing() {
        let err = load_text(&MemorySource::new(), "nope").unwrap_err();
        assert!(format!("{err:#}").contains("no document at nope"));
    }

    #[test]
    fn test_file_source_reads_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.txt");
        std::fs::write(&path, "It is a truth").unwrap();

        let plain = path.to_string_lossy().to_string();
        assert_eq!(load_text(&FileSource, &plain).unwrap(), "It is a truth");
        let url = format!("file://{plain}");
        assert_eq!(load_text(&FileSource, &url).unwrap(), "It is a truth");
    }

    #[test]
    fn test_file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        assert!(FileSource.fetch(&path.to_string_lossy()).is_err());
    }

    #[test]
    fn test_scheme_detection() {
        assert!(is_http("https://www.gutenberg.org/files/1342/1342-0.txt"));
        assert!(is_http("HTTP://example.com"));
        assert!(!is_http("/tmp/book.txt"));
        assert!(!is_http("file:///tmp/book.txt"));
    }
}
