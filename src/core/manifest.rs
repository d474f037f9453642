//! Filepath: src/core/manifest.rs
//! Pack manifest (`manifest.json`) model and rewriter.
//!
//! Manifests are read leniently (comments and trailing commas are allowed).
//! The rewriter edits the parsed document in place so authored key order
//! survives; the typed `Manifest` is a read-only view over the same text.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::core::directive::PackDirectives;
use crate::core::error::ReleaseError;
use crate::core::version::{self, Version, VersionFormat};

/// File name of a pack manifest, relative to the pack root
pub const MANIFEST_FILE: &str = "manifest.json";

/// Key under `metadata.generated_with` recording this tool
pub const PROVENANCE_KEY: &str = "add_on_releaser";

/// Version stamped into manifests and provenance files
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest
{
    pub header: Header,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<Module>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header
{
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub uuid: String,

    pub version: Version,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module
{
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dependency refers to another pack by `uuid` or to a script module by
/// `module_name`; only the former carries a pack version to normalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency
{
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata
{
    /// Tool name -> versions of that tool that processed this manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_with: Option<IndexMap<String, Vec<String>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest
{
    pub fn parse(text: &str) -> Result<Self, json5::Error>
    {
        json5::from_str(text)
    }
}

/// Editable manifest tree. Every edit targets an existing slot or appends a
/// new key, so untouched keys keep their authored position.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument
{
    root: Value,
}

impl ManifestDocument
{
    pub fn parse(text: &str) -> Result<Self, json5::Error>
    {
        let root: Value = json5::from_str(text)?;
        Ok(Self { root })
    }

    /// Pretty-print with four-space indentation.
    pub fn to_json_text(&self) -> Result<String, serde_json::Error>
    {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.root
            .serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Normalize header, module and dependency versions to `format`.
    pub fn normalize_versions(
        &mut self,
        format: VersionFormat,
    )
    {
        if format == VersionFormat::Current
        {
            return;
        }

        if let Some(header) = self
            .root
            .get_mut("header")
            .and_then(Value::as_object_mut)
            && let Some((before, after)) = header
                .get_mut("version")
                .and_then(|slot| normalize_slot(slot, format))
            // Keep human-readable fields in step with a stripped version string
            && let Version::Semantic(raw) = &before
            && after != before
        {
            let stripped = version::strip_suffix(raw);
            for key in ["name", "description"]
            {
                if let Some(Value::String(text)) = header.get_mut(key)
                {
                    *text = text.replacen(raw.as_str(), stripped, 1);
                }
            }
        }

        for module in entries_mut(&mut self.root, "modules")
        {
            if let Some(slot) = module.get_mut("version")
            {
                normalize_slot(slot, format);
            }
        }

        for dep in entries_mut(&mut self.root, "dependencies").filter(|d| {
            d.get("uuid")
                .is_some_and(Value::is_string)
        })
        {
            if let Some(slot) = dep.get_mut("version")
            {
                normalize_slot(slot, format);
            }
        }
    }

    /// Record `FORMAT_VERSION` under `metadata.generated_with`, once.
    pub fn stamp_provenance(&mut self)
    {
        let Some(root) = self
            .root
            .as_object_mut()
        else
        {
            return;
        };

        let versions = root
            .entry("metadata")
            .or_insert_with(empty_object)
            .as_object_mut()
            .map(|meta| {
                meta.entry("generated_with")
                    .or_insert_with(empty_object)
            })
            .and_then(Value::as_object_mut)
            .map(|tools| {
                tools
                    .entry(PROVENANCE_KEY)
                    .or_insert_with(|| Value::Array(Vec::new()))
            })
            .and_then(Value::as_array_mut);

        if let Some(versions) = versions
            && !versions
                .iter()
                .any(|v| v == FORMAT_VERSION)
        {
            versions.push(Value::from(FORMAT_VERSION));
        }
    }
}

fn empty_object() -> Value
{
    Value::Object(Map::new())
}

/// Object entries of the array at `root[key]`.
fn entries_mut<'a>(
    root: &'a mut Value,
    key: &'static str,
) -> impl Iterator<Item = &'a mut Map<String, Value>>
{
    root.get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

/// Rewrite a version slot in place, returning the old and new versions.
fn normalize_slot(
    slot: &mut Value,
    format: VersionFormat,
) -> Option<(Version, Version)>
{
    let before = Version::deserialize(&*slot).ok()?;
    let after = version::normalize(&before, format);
    *slot = serde_json::to_value(&after).ok()?;
    Some((before, after))
}

/// The canonical manifest of a pack: the text written into every archive
/// copy and the structure parsed back from that text.
#[derive(Debug, Clone)]
pub struct RewrittenManifest
{
    pub text: String,
    pub manifest: Manifest,
}

/// Produce the release manifest for a pack from its authored text.
///
/// Versions are normalized, provenance is stamped, then the text runs
/// through every replacement targeting `manifest.json` and must still parse.
#[instrument(skip(raw, pack, directives), fields(pack = %pack.display()))]
pub fn rewrite_manifest(
    raw: &str,
    pack: &Path,
    format: VersionFormat,
    directives: &PackDirectives,
) -> Result<RewrittenManifest, ReleaseError>
{
    let parse_error = |source| ReleaseError::ManifestParse {
        pack: pack.to_path_buf(),
        source,
    };
    let generated_error = |source| ReleaseError::GeneratedManifest {
        pack: pack.to_path_buf(),
        source,
    };

    // Typed read validates the shape before the document is edited
    Manifest::parse(raw).map_err(parse_error)?;
    let mut document = ManifestDocument::parse(raw).map_err(parse_error)?;

    document.normalize_versions(format);
    document.stamp_provenance();

    let text = document
        .to_json_text()
        .map_err(|err| generated_error(<json5::Error as serde::de::Error>::custom(err)))?;

    let stamped = Manifest::parse(&text).map_err(generated_error)?;
    let rendered = stamped
        .header
        .version
        .dotted();
    let text = directives.apply_replacements(MANIFEST_FILE, text, &rendered);

    let manifest = Manifest::parse(&text).map_err(generated_error)?;

    debug!(uuid = %manifest.header.uuid, version = %manifest.header.version, "manifest rewritten");

    Ok(RewrittenManifest { text, manifest })
}
