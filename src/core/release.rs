//! Filepath: src/core/release.rs
//! Whole-run orchestration: manifests, ingestion and directives for every
//! pack, then archive naming and output.
//!
//! Modes:
//! - `mcaddon`: one shared tree, one top-level directory per pack
//! - `mcpack`:  one tree and one archive per pack
//!
//! Archives are fully built in memory before anything is written, so a
//! failing pack never leaves a partial release behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::cli::{AppContext, ReleaseArgs};
use crate::core::directive::PackDirectives;
use crate::core::engine::{ModificationEngine, PackScope};
use crate::core::error::ReleaseError;
use crate::core::ingest::{IngestContext, ingest_folder};
use crate::core::manifest::{MANIFEST_FILE, Manifest, rewrite_manifest};
use crate::core::version::Version;
use crate::infra::archive::{ArchiveTree, EntryId};
use crate::infra::config::{Config, FileNameVersion, FileNameVersionFormat, FileType, Pack, load_config};
use crate::infra::io::{Fetcher, HttpFetcher, read_text, write_output};
use crate::infra::update::UpdateCheck;

/// Placeholder substituted in file name templates
const VERSION_PLACEHOLDER: &str = "${version}";

const ARCHIVE_COMMENT: &str = concat!("Generated by ", env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

/// Renders the file-name version from the manifest version and its pack.
///
/// Callbacks return an arbitrary JSON value; anything but a string fails
/// the run.
pub type VersionCallback = Box<dyn Fn(&Version, &Pack) -> Value + Send + Sync>;

/// Named version callbacks selectable with `file_name_version.callback`
#[derive(Default)]
pub struct VersionCallbacks
{
    callbacks: HashMap<String, VersionCallback>,
}

impl VersionCallbacks
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Callbacks shipped with the binary
    pub fn builtin() -> Self
    {
        Self::new()
            .register("major-minor", |v, _| {
                let dotted = v.dotted();
                let mut parts = dotted.split('.');
                let major = parts
                    .next()
                    .unwrap_or("0");
                let minor = parts
                    .next()
                    .unwrap_or("0");
                Value::String(format!("{major}.{minor}"))
            })
            .register("pack-and-version", |v, pack| Value::String(format!("{}-{}", pack.folder_name(), v.dashed())))
    }

    pub fn register(
        mut self,
        name: impl Into<String>,
        callback: impl Fn(&Version, &Pack) -> Value + Send + Sync + 'static,
    ) -> Self
    {
        self.callbacks
            .insert(name.into(), Box::new(callback));
        self
    }

    fn get(
        &self,
        name: &str,
    ) -> Option<&VersionCallback>
    {
        self.callbacks
            .get(name)
    }
}

/// One archive ready to be written
#[derive(Debug, Clone)]
pub struct Artifact
{
    /// File name inside the destination directory
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render a manifest version for use in an output file name.
pub fn render_file_version(
    settings: &FileNameVersion,
    version: &Version,
    pack: &Pack,
    callbacks: &VersionCallbacks,
) -> Result<String, ReleaseError>
{
    match settings.format
    {
        FileNameVersionFormat::Dashed => Ok(version.dashed()),
        FileNameVersionFormat::Current => Ok(version.dotted()),
        FileNameVersionFormat::Custom =>
        {
            let name = settings
                .callback
                .clone()
                .unwrap_or_default();
            let callback = callbacks
                .get(&name)
                .ok_or(ReleaseError::UnknownVersionCallback { name })?;
            match callback(version, pack)
            {
                Value::String(s) => Ok(s),
                other => Err(ReleaseError::InvalidVersionType { found: json_type_name(&other).to_string() }),
            }
        }
    }
}

fn json_type_name(value: &Value) -> &'static str
{
    match value
    {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Where a pack's UUID was first seen
struct SeenPack
{
    index: usize,
    path: PathBuf,
}

/// A pack after its manifest was rewritten
struct BuiltPack
{
    index: usize,
    manifest: Manifest,
}

pub struct ReleaseAssembler<'a>
{
    config: &'a Config,
    working_dir: PathBuf,
    fetcher: &'a dyn Fetcher,
    callbacks: &'a VersionCallbacks,
}

impl<'a> ReleaseAssembler<'a>
{
    pub fn new(
        config: &'a Config,
        working_dir: PathBuf,
        fetcher: &'a dyn Fetcher,
        callbacks: &'a VersionCallbacks,
    ) -> Self
    {
        Self { config, working_dir, fetcher, callbacks }
    }

    /// Directory archives are written to
    pub fn output_dir(&self) -> PathBuf
    {
        self.working_dir
            .join(&self.config.destination)
    }

    /// Build every archive in memory.
    #[instrument(skip_all, fields(packs = self.config.packs.len(), file_type = ?self.config.file_type))]
    pub fn build(&self) -> Result<Vec<Artifact>>
    {
        let extension = self
            .config
            .file_type
            .extension();
        let mut seen: HashMap<String, SeenPack> = HashMap::new();
        let mut folders: HashMap<String, SeenPack> = HashMap::new();
        let mut built: Vec<BuiltPack> = Vec::with_capacity(
            self.config
                .packs
                .len(),
        );
        let mut artifacts = Vec::new();
        let mut shared = ArchiveTree::new();

        for (index, pack) in self
            .config
            .packs
            .iter()
            .enumerate()
        {
            let mut own = ArchiveTree::new();
            let (tree, root) = match self.config.file_type
            {
                FileType::Mcaddon =>
                {
                    let dir_name = pack
                        .release_name
                        .clone()
                        .unwrap_or_else(|| pack.folder_name());
                    if let Some(other) = folders.get(&dir_name)
                    {
                        return Err(ReleaseError::DuplicateReleaseFolder {
                            name: dir_name,
                            path: pack
                                .path
                                .clone(),
                            index,
                            other_path: other
                                .path
                                .clone(),
                            other_index: other.index,
                        }
                        .into());
                    }
                    folders.insert(dir_name.clone(), SeenPack { index, path: pack.path.clone() });
                    let root = shared.add_directory(shared.root(), &dir_name)?;
                    (&mut shared, root)
                }
                FileType::Mcpack =>
                {
                    let root = own.root();
                    (&mut own, root)
                }
            };

            let manifest = self.build_pack(tree, root, index, pack, extension, &mut seen)?;

            if self.config.file_type == FileType::Mcpack
            {
                let version = render_file_version(
                    &self.config.file_name_version,
                    &manifest.header.version,
                    pack,
                    self.callbacks,
                )?;
                let template = pack
                    .release_name
                    .clone()
                    .unwrap_or_else(|| format!("{}-v{VERSION_PLACEHOLDER}", pack.folder_name()));
                artifacts.push(Artifact {
                    file_name: archive_file_name(&template, &version, extension),
                    bytes: own.to_zip_bytes(ARCHIVE_COMMENT)?,
                });
            }

            built.push(BuiltPack { index, manifest });
        }

        if self.config.file_type == FileType::Mcaddon
        {
            let source = self.version_source(&built)?;
            let version = render_file_version(
                &self.config.file_name_version,
                &source
                    .manifest
                    .header
                    .version,
                &self.config.packs[source.index],
                self.callbacks,
            )?;
            artifacts.push(Artifact {
                file_name: archive_file_name(&self.config.file_name, &version, extension),
                bytes: shared.to_zip_bytes(ARCHIVE_COMMENT)?,
            });
        }

        Ok(artifacts)
    }

    #[instrument(skip_all, fields(pack = %pack.path.display(), index = index))]
    fn build_pack(
        &self,
        tree: &mut ArchiveTree,
        root: EntryId,
        index: usize,
        pack: &Pack,
        extension: &str,
        seen: &mut HashMap<String, SeenPack>,
    ) -> Result<Manifest>
    {
        let pack_dir = self
            .working_dir
            .join(&pack.path);
        let directives = PackDirectives::compile(index, &pack.modifications)?;

        let raw = read_text(&pack_dir.join(MANIFEST_FILE))?;
        let source = Manifest::parse(&raw).map_err(|source| ReleaseError::ManifestParse {
            pack: pack
                .path
                .clone(),
            source,
        })?;

        if let Some(first) = seen.get(&source.header.uuid)
        {
            return Err(ReleaseError::DuplicateUuid {
                uuid: source
                    .header
                    .uuid
                    .clone(),
                path: pack
                    .path
                    .clone(),
                index,
                other_path: first
                    .path
                    .clone(),
                other_index: first.index,
            }
            .into());
        }
        seen.insert(
            source
                .header
                .uuid
                .clone(),
            SeenPack {
                index,
                path: pack
                    .path
                    .clone(),
            },
        );

        let rewritten = rewrite_manifest(&raw, &pack.path, self.config.release_version_format, &directives)?;
        let version = rewritten
            .manifest
            .header
            .version
            .dotted();

        let cx = IngestContext {
            directives: &directives,
            manifest_text: Some(&rewritten.text),
            version: &version,
        };
        let stats = ingest_folder(tree, root, &pack_dir, &cx)
            .with_context(|| format!("Failed to read pack \"{}\"", pack.path.display()))?;
        debug!(?stats, "pack ingested");

        let scope = PackScope {
            index,
            pack,
            root,
            working_dir: &self.working_dir,
            version: &version,
            extension,
        };
        ModificationEngine::new(self.fetcher).apply(tree, &scope)?;

        info!(uuid = %rewritten.manifest.header.uuid, %version, "pack assembled");
        Ok(rewritten.manifest)
    }

    /// Pack whose version names the `.mcaddon`
    fn version_source<'b>(
        &self,
        built: &'b [BuiltPack],
    ) -> Result<&'b BuiltPack, ReleaseError>
    {
        let uuid = &self
            .config
            .file_name_version
            .source_pack;
        let found = match uuid
        {
            Some(uuid) => built
                .iter()
                .find(|b| &b.manifest.header.uuid == uuid),
            None => built.first(),
        };
        found.ok_or_else(|| ReleaseError::VersionSourceNotFound { uuid: uuid.clone() })
    }
}

fn archive_file_name(
    template: &str,
    version: &str,
    extension: &str,
) -> String
{
    format!("{}.{extension}", template.replace(VERSION_PLACEHOLDER, version))
}

/// Write artifacts into `out_dir`, returning the written paths.
pub fn write_artifacts(
    artifacts: &[Artifact],
    out_dir: &Path,
    invocation_dir: &Path,
    ctx: &AppContext,
) -> Result<Vec<PathBuf>>
{
    if !ctx.dry_run
    {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    }

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts
    {
        let path = out_dir.join(&artifact.file_name);
        let shown = path
            .strip_prefix(invocation_dir)
            .unwrap_or(&path)
            .display()
            .to_string();

        if ctx.dry_run
        {
            if !ctx.quiet
            {
                println!("Would generate: {shown} ({} bytes)", artifact.bytes.len());
            }
            continue;
        }

        write_output(&path, &artifact.bytes)?;
        if !ctx.quiet
        {
            if ctx.no_color
            {
                println!("Add-on generated: {shown}");
            }
            else
            {
                println!("{} {}", "Add-on generated:".green(), shown.bold());
            }
        }
        written.push(path);
    }
    Ok(written)
}

/// `release` subcommand
pub fn run(
    args: ReleaseArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let update = UpdateCheck::spawn(ctx.offline);

    let invocation_dir = std::env::current_dir().context("Failed to read current directory")?;
    let config_path = invocation_dir.join(&args.config);
    let config = load_config(&config_path)?;
    let working_dir = config.working_dir(&invocation_dir);

    let fetcher = HttpFetcher::new()?;
    let callbacks = VersionCallbacks::builtin();
    let assembler = ReleaseAssembler::new(&config, working_dir, &fetcher, &callbacks);

    let artifacts = assembler.build()?;
    write_artifacts(&artifacts, &assembler.output_dir(), &invocation_dir, ctx)?;

    if !ctx.quiet
        && let Some(notice) = update.notice()
    {
        if ctx.no_color
        {
            eprintln!("{notice}");
        }
        else
        {
            eprintln!("{}", notice.yellow());
        }
    }
    Ok(())
}
