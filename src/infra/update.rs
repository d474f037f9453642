//! Best-effort check for a newer published release.
//!
//! The check runs on its own thread while the release is assembled. Every
//! failure (network, HTTP status, JSON shape, version parse) collapses into
//! "no notice"; nothing here can fail a run.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

const CRATES_IO_URL: &str = concat!("https://crates.io/api/v1/crates/", env!("CARGO_PKG_NAME"));
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct CrateResponse
{
    #[serde(rename = "crate")]
    krate: CrateInfo,
}

#[derive(Debug, Deserialize)]
struct CrateInfo
{
    max_stable_version: Option<String>,
    max_version: String,
}

/// A pending update check
pub struct UpdateCheck
{
    handle: Option<JoinHandle<Option<String>>>,
}

impl UpdateCheck
{
    /// Start checking in the background; `offline` makes this a no-op.
    pub fn spawn(offline: bool) -> Self
    {
        if offline
        {
            return Self { handle: None };
        }
        let handle = thread::Builder::new()
            .name("update-check".into())
            .spawn(|| latest_version().and_then(|latest| update_notice(env!("CARGO_PKG_VERSION"), &latest)))
            .ok();
        Self { handle }
    }

    /// Wait for the check and return the notice, if any.
    pub fn notice(self) -> Option<String>
    {
        self.handle?
            .join()
            .ok()
            .flatten()
    }
}

fn latest_version() -> Option<String>
{
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(CHECK_TIMEOUT)
        .build()
        .ok()?;

    let resp = client
        .get(CRATES_IO_URL)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| debug!(error = %e, "update check failed"))
        .ok()?;

    let body: CrateResponse = resp
        .json()
        .map_err(|e| debug!(error = %e, "unexpected update check response"))
        .ok()?;

    Some(
        body.krate
            .max_stable_version
            .unwrap_or(body.krate.max_version),
    )
}

/// Notice text when `latest` is a strictly newer version than `current`.
pub fn update_notice(
    current: &str,
    latest: &str,
) -> Option<String>
{
    let current = semver::Version::parse(current).ok()?;
    let latest = semver::Version::parse(latest).ok()?;
    (latest > current).then(|| {
        format!(
            "A new version of {} is available: {current} -> {latest}\nRun `cargo install {}` to update.",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_NAME")
        )
    })
}
