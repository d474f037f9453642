//! Filepath: src/core/ingest.rs
//! Mirror a pack folder into the archive tree.
//!
//! Per file, in priority order:
//!   1) matched by a `delete_files` glob      -> skipped
//!   2) `manifest.json` at the pack root      -> canonical manifest text
//!   3) matched by find/replace directives    -> rewritten text
//!   4) anything else                         -> raw bytes
//!
//! Folders matched by `delete_folders` are pruned by the walker before any
//! of their contents are read.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::directive::PackDirectives;
use crate::core::manifest::MANIFEST_FILE;
use crate::infra::archive::{ArchiveTree, EntryId};
use crate::infra::config::DEFAULT_CONFIG_FILE;
use crate::infra::io::read_bytes;
use crate::infra::walk::PackWalker;

/// What the ingester needs to know about the pack being built
pub struct IngestContext<'a>
{
    /// Exclusions and replacements; empty for `add_folder` sources
    pub directives: &'a PackDirectives,

    /// Canonical manifest text, substituted for a root `manifest.json`
    pub manifest_text: Option<&'a str>,

    /// Header version rendered for `${version}`
    pub version: &'a str,
}

/// Counters reported after a folder is ingested
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats
{
    pub files: usize,
    pub directories: usize,
    pub rewritten: usize,
    pub skipped: usize,
}

#[instrument(skip_all, fields(source = %source.display()))]
pub fn ingest_folder(
    tree: &mut ArchiveTree,
    dest: EntryId,
    source: &Path,
    cx: &IngestContext<'_>,
) -> Result<IngestStats>
{
    let walker = PackWalker::new()
        .with_pruned_dirs(
            cx.directives
                .deleted_folders()
                .clone(),
        )
        .with_reserved_file(DEFAULT_CONFIG_FILE);

    let mut dirs: HashMap<String, EntryId> = HashMap::new();
    dirs.insert(String::new(), dest);
    let mut stats = IngestStats::default();

    for item in walker.walk(source)?
    {
        let (parent_rel, name) = match item
            .rel
            .rsplit_once('/')
        {
            Some((parent, name)) => (parent, name),
            None => ("", item.rel.as_str()),
        };
        let parent = *dirs
            .get(parent_rel)
            .with_context(|| format!("Parent of {} was not ingested", item.rel))?;

        if item.is_dir
        {
            let id = tree.add_directory(parent, name)?;
            dirs.insert(item.rel.clone(), id);
            stats.directories += 1;
            continue;
        }

        if cx
            .directives
            .is_deleted_file(&item.rel)
        {
            debug!(path = %item.rel, "skipping deleted file");
            stats.skipped += 1;
            continue;
        }

        if item.rel == MANIFEST_FILE
            && let Some(text) = cx.manifest_text
        {
            tree.add_text(parent, name, text)?;
            stats.files += 1;
            continue;
        }

        let data = read_bytes(&item.path)?;
        let has_replacements = cx
            .directives
            .replacements_for(&item.rel)
            .next()
            .is_some();

        let data = if has_replacements
        {
            match String::from_utf8(data)
            {
                Ok(text) =>
                {
                    stats.rewritten += 1;
                    cx.directives
                        .apply_replacements(&item.rel, text, cx.version)
                        .into_bytes()
                }
                Err(err) =>
                {
                    warn!(path = %item.rel, "file is not UTF-8; copying without replacements");
                    err.into_bytes()
                }
            }
        }
        else
        {
            data
        };

        tree.add_file(parent, name, data)?;
        stats.files += 1;
    }

    debug!(?stats, "folder ingested");
    Ok(stats)
}
