use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

/// Source of remote bytes for `add_file` directives.
pub trait Fetcher
{
    fn fetch(
        &self,
        uri: &str,
    ) -> Result<Vec<u8>>;
}

/// Blocking HTTP(S) fetcher
pub struct HttpFetcher
{
    client: reqwest::blocking::Client,
}

impl HttpFetcher
{
    pub fn new() -> Result<Self>
    {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher
{
    fn fetch(
        &self,
        uri: &str,
    ) -> Result<Vec<u8>>
    {
        debug!(%uri, "fetching remote file");
        let resp = self
            .client
            .get(uri)
            .send()
            .with_context(|| format!("Failed to fetch {uri}"))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {uri}"))?;
        let bytes = resp
            .bytes()
            .with_context(|| format!("Failed to read response body from {uri}"))?;
        Ok(bytes.to_vec())
    }
}

/// In-memory fetcher keyed by URI; unknown URIs fail.
#[derive(Debug, Default)]
pub struct StaticFetcher
{
    files: HashMap<String, Vec<u8>>,
}

impl StaticFetcher
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with(
        mut self,
        uri: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self
    {
        self.files
            .insert(uri.into(), data.into());
        self
    }
}

impl Fetcher for StaticFetcher
{
    fn fetch(
        &self,
        uri: &str,
    ) -> Result<Vec<u8>>
    {
        self.files
            .get(uri)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Failed to fetch {uri}: not found"))
    }
}

/// True for absolute URIs such as `https://host/file` (`scheme://...`).
pub fn is_remote_uri(source: &str) -> bool
{
    match source.find("://")
    {
        Some(pos) if pos > 0 => !source[..pos].contains([':', '/', '\\']),
        _ => false,
    }
}

/// Read a file fully, with the path in the error.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>>
{
    std::fs::read(path).with_context(|| format!("Failed to read file {}", path.display()))
}

pub fn read_text(path: &Path) -> Result<String>
{
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}

/// Write `data` to `path`, creating parent directories first.
pub fn write_output(
    path: &Path,
    data: &[u8],
) -> Result<()>
{
    if let Some(parent) = path.parent()
        && !parent
            .as_os_str()
            .is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}
