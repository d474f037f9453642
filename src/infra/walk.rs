//! Filepath: src/infra/walk.rs
//! Pack folder walker.
//! - Visits every file and directory; no ignore files, hidden-file or
//!   file-type rules apply, since a pack ships exactly what it contains
//! - Pruned-directory globs are applied early, so excluded trees are never
//!   read
//! - One reserved file name (the release config) can be skipped anywhere
//! - Symbolic links are not followed and are left out of the pack
//! - Deterministic ordering: parents before children, names sorted
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;
use ignore::{DirEntry, WalkBuilder};

use crate::core::directive::slash_path;

/// One entry below the walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkItem
{
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,

    /// Path relative to the root, `/`-separated
    pub rel: String,

    pub is_dir: bool,
}

/// Walker over a pack folder with optional directory pruning.
pub struct PackWalker
{
    /// Directories whose root-relative path matches are skipped entirely
    pruned_dirs: GlobSet,

    /// File name skipped wherever it appears
    reserved_file: Option<String>,
}

impl Default for PackWalker
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl PackWalker
{
    pub fn new() -> Self
    {
        Self {
            pruned_dirs: GlobSet::empty(),
            reserved_file: None,
        }
    }

    /// (Optional) Skip directories matching any of `globs`.
    pub fn with_pruned_dirs(
        mut self,
        globs: GlobSet,
    ) -> Self
    {
        self.pruned_dirs = globs;
        self
    }

    /// (Optional) Skip files named `name` at any depth.
    pub fn with_reserved_file(
        mut self,
        name: impl Into<String>,
    ) -> Self
    {
        self.reserved_file = Some(name.into());
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Packs are copied verbatim: no .gitignore, hidden or parent rules
        b.standard_filters(false);
        b.follow_links(false);
        b.sort_by_file_name(|a, b| a.cmp(b));

        // Early directory pruning (fast short-circuit).
        let pruned = self
            .pruned_dirs
            .clone();
        let base = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            if ent.depth() == 0
            {
                return true;
            }

            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);
            if !is_dir
            {
                return true;
            }

            match ent
                .path()
                .strip_prefix(&base)
            {
                Ok(rel) => !pruned.is_match(slash_path(rel)),
                Err(_) => true,
            }
        });

        b
    }

    /// Traverse everything under `root`. Items come back parent-first so a
    /// directory is always listed before its contents.
    pub fn walk(
        &self,
        root: &Path,
    ) -> Result<Vec<WalkItem>>
    {
        if !root.is_dir()
        {
            anyhow::bail!("Pack folder {} does not exist or is not a directory", root.display());
        }

        let mut out = Vec::new();

        for res in self
            .build_walk(root)
            .build()
        {
            let entry = res.with_context(|| format!("Failed to walk {}", root.display()))?;
            if entry.depth() == 0
            {
                continue;
            }

            let Some(ft) = entry.file_type()
            else
            {
                continue;
            };
            let is_dir = ft.is_dir();
            if !is_dir && !ft.is_file()
            {
                continue;
            }

            if !is_dir
                && let Some(reserved) = &self.reserved_file
                && entry.file_name() == OsStr::new(reserved)
            {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(root)
                .with_context(|| format!("{} escaped {}", entry.path().display(), root.display()))?;

            out.push(WalkItem {
                rel: slash_path(rel),
                path: entry
                    .path()
                    .to_path_buf(),
                is_dir,
            });
        }

        Ok(out)
    }
}
