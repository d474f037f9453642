//! Filepath: src/core/version.rs
//! Version values as they appear in pack manifests.
//!
//! A manifest version is either a numeric tuple (`[1, 2, 3]`, up to three
//! components) or a semantic-version string (`"1.2.3-beta+build"`). The
//! release format decides which representation is canonical for a run:
//! - `tuple`   strings are stripped of pre-release/build suffixes and split
//! - `semver`  tuples are joined with `.` (missing components become 0)
//! - `current` nothing is converted

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A manifest version in one of its two authored shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Version
{
    /// `[major, minor, patch]`, any prefix of it
    Triple(Vec<u64>),
    /// `"major.minor.patch[-pre][+build]"`
    Semantic(String),
}

/// Canonical version representation for rewritten manifests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionFormat
{
    /// Numeric tuples (default)
    #[default]
    #[serde(alias = "numeric-triple")]
    Tuple,
    /// Semantic-version strings
    #[serde(alias = "semantic")]
    Semver,
    /// Leave versions exactly as authored
    #[serde(alias = "as-authored")]
    Current,
}

impl Version
{
    /// Render with `.` separators: `[1, 2, 3]` -> `1.2.3`, strings unchanged.
    /// This is the value substituted for `${version}` in replacements.
    pub fn dotted(&self) -> String
    {
        match self
        {
            Version::Triple(parts) => join_parts(parts, "."),
            Version::Semantic(s) => s.clone(),
        }
    }

    /// Render for file names: every `.` becomes `-`.
    pub fn dashed(&self) -> String
    {
        match self
        {
            Version::Triple(parts) => join_parts(parts, "-"),
            Version::Semantic(s) => s.replace('.', "-"),
        }
    }
}

impl std::fmt::Display for Version
{
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result
    {
        f.write_str(&self.dotted())
    }
}

fn join_parts(
    parts: &[u64],
    sep: &str,
) -> String
{
    parts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Remove a pre-release (`-...`) or build (`+...`) suffix.
pub fn strip_suffix(version: &str) -> &str
{
    match version.find(['-', '+'])
    {
        Some(pos) => &version[..pos],
        None => version,
    }
}

/// Convert a semantic string into a numeric tuple of at most three parts.
///
/// Tuples are returned unchanged. A string with a non-numeric component is
/// passed through untouched since it has no tuple form.
pub fn to_numeric_triple(version: &Version) -> Version
{
    let Version::Semantic(s) = version
    else
    {
        return version.clone();
    };

    let parsed: Result<Vec<u64>, _> = strip_suffix(s)
        .split('.')
        .take(3)
        .map(|part| {
            part.trim()
                .parse::<u64>()
        })
        .collect();

    match parsed
    {
        Ok(parts) => Version::Triple(parts),
        Err(err) =>
        {
            warn!(version = %s, %err, "version has no numeric tuple form; leaving as authored");
            version.clone()
        }
    }
}

/// Convert a numeric tuple into a `major.minor.patch` string.
///
/// Absent components default to 0 and anything past the third is dropped.
/// Strings are returned unchanged.
pub fn to_semantic(version: &Version) -> Version
{
    match version
    {
        Version::Triple(parts) =>
        {
            let at = |i: usize| {
                parts
                    .get(i)
                    .copied()
                    .unwrap_or(0)
            };
            Version::Semantic(format!("{}.{}.{}", at(0), at(1), at(2)))
        }
        Version::Semantic(_) => version.clone(),
    }
}

/// Apply the conversion selected by `format`.
pub fn normalize(
    version: &Version,
    format: VersionFormat,
) -> Version
{
    match format
    {
        VersionFormat::Tuple => to_numeric_triple(version),
        VersionFormat::Semver => to_semantic(version),
        VersionFormat::Current => version.clone(),
    }
}
