//! Fatal release errors.
//!
//! Pipeline functions return `anyhow::Result`; these variants travel inside
//! it and can be recovered with `downcast_ref::<ReleaseError>()`.

use std::fmt;
use std::path::PathBuf;

/// Entry kind expected by a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind
{
    File,
    Directory,
}

impl fmt::Display for EntryKind
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReleaseError
{
    #[error(
        "Pack \"{}\" (packs[{index}]) has the same UUID as \"{}\" (packs[{other_index}]), which is not allowed.",
        .path.display(),
        .other_path.display()
    )]
    DuplicateUuid
    {
        uuid: String,
        path: PathBuf,
        index: usize,
        other_path: PathBuf,
        other_index: usize,
    },

    #[error(
        "Pack \"{}\" (packs[{index}]) would be released into the folder \"{name}\" already used by \"{}\" (packs[{other_index}]).",
        .path.display(),
        .other_path.display()
    )]
    DuplicateReleaseFolder
    {
        name: String,
        path: PathBuf,
        index: usize,
        other_path: PathBuf,
        other_index: usize,
    },

    #[error("Failed to parse manifest \"manifest.json\" in pack \"{}\": {source}", .pack.display())]
    ManifestParse
    {
        pack: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error("Failed to parse generated manifest \"manifest.json\" in pack \"{}\": {source}", .pack.display())]
    GeneratedManifest
    {
        pack: PathBuf,
        #[source]
        source: json5::Error,
    },

    #[error(
        "packs[{pack_index}].modifications[{directive_index}]: \"{target}\" could not be found in the pack \"{}\".",
        .pack.display()
    )]
    NotFound
    {
        pack_index: usize,
        directive_index: usize,
        target: String,
        pack: PathBuf,
    },

    #[error(
        "packs[{pack_index}].modifications[{directive_index}]: \"{target}\" is not a {expected} in the pack \"{}\".",
        .pack.display()
    )]
    WrongKind
    {
        pack_index: usize,
        directive_index: usize,
        target: String,
        expected: EntryKind,
        pack: PathBuf,
    },

    #[error("packs[{pack_index}].modifications[{directive_index}]: {message}")]
    InvalidDirective
    {
        pack_index: usize,
        directive_index: usize,
        message: String,
    },

    #[error("The pack with UUID {} could not be found.", .uuid.as_deref().unwrap_or("<first pack>"))]
    VersionSourceNotFound
    {
        uuid: Option<String>,
    },

    #[error("Version must be a string, but the version callback returned {found}.")]
    InvalidVersionType
    {
        found: String,
    },

    #[error("No version callback named \"{name}\" is registered.")]
    UnknownVersionCallback
    {
        name: String,
    },
}
