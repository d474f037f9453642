//! Filepath: src/core/directive.rs
//! Pack modification directives and their compiled matchers.
//!
//! Directives are deserialized from the `modifications` list of a pack.
//! `delete_files`, `delete_folders` and `find_and_replace_in_file` are
//! resolved while the pack folder is ingested; the remaining kinds run
//! afterwards, in list order, against the built archive tree.

use std::path::Path;

use globset::{GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::ReleaseError;

/// What to do when the destination of an add/rename already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution
{
    /// Replace the existing entry
    Overwrite,
    /// Leave the existing entry and do nothing
    Skip,
    /// Combine both directories
    #[default]
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modification
{
    AddFile
    {
        source: String,
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overwrite: Option<bool>,
    },
    AddFolder
    {
        source: String,
        destination: String,
        #[serde(default)]
        conflict_resolution: ConflictResolution,
    },
    RenameFile
    {
        target: String,
        new_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        overwrite: Option<bool>,
    },
    RenameFolder
    {
        target: String,
        new_name: String,
        #[serde(default)]
        conflict_resolution: ConflictResolution,
    },
    MoveFile
    {
        target: String,
        destination: String,
    },
    MoveFolder
    {
        target: String,
        destination: String,
    },
    DeleteFiles
    {
        targets: Vec<String>,
    },
    DeleteFolders
    {
        targets: Vec<String>,
    },
    FindAndReplaceInFile
    {
        target: String,
        find: String,
        replace: String,
        #[serde(default)]
        regex: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
}

/// Compile a glob the way pack paths are matched: `*` and `?` stay within
/// one path segment, `**` crosses segments.
fn compile_glob(pattern: &str) -> Result<globset::Glob, globset::Error>
{
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
}

/// Pack-root-relative path with `/` separators, as globs expect.
pub fn slash_path(rel: &Path) -> String
{
    rel.components()
        .map(|c| {
            c.as_os_str()
                .to_string_lossy()
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug)]
enum Finder
{
    Literal(String),
    Regex
    {
        re: Regex,
        global: bool,
    },
}

/// A compiled `find_and_replace_in_file` directive
#[derive(Debug)]
pub struct FindReplace
{
    target: GlobMatcher,
    finder: Finder,
    replace: String,
}

impl FindReplace
{
    pub fn new(
        target: &str,
        find: &str,
        replace: &str,
        regex: bool,
        flags: Option<&str>,
    ) -> Result<Self, String>
    {
        let target = compile_glob(target)
            .map_err(|e| format!("invalid target glob \"{target}\": {e}"))?
            .compile_matcher();

        let finder = if regex
        {
            let mut builder = RegexBuilder::new(find);
            let mut global = false;
            for flag in flags
                .unwrap_or("")
                .chars()
            {
                match flag
                {
                    'g' => global = true,
                    'i' =>
                    {
                        builder.case_insensitive(true);
                    }
                    'm' =>
                    {
                        builder.multi_line(true);
                    }
                    's' =>
                    {
                        builder.dot_matches_new_line(true);
                    }
                    'x' =>
                    {
                        builder.ignore_whitespace(true);
                    }
                    'u' | 'y' | 'd' => {}
                    other => warn!(flag = %other, "ignoring unknown regex flag"),
                }
            }
            let re = builder
                .build()
                .map_err(|e| format!("invalid regex \"{find}\": {e}"))?;
            Finder::Regex { re, global }
        }
        else
        {
            Finder::Literal(find.to_string())
        };

        Ok(Self { target, finder, replace: replace.to_string() })
    }

    /// Whether this directive applies to the pack-relative `path`
    pub fn matches(
        &self,
        path: &str,
    ) -> bool
    {
        self.target
            .is_match(path)
    }

    /// Apply to `text`, with `${version}` in the replacement substituted first.
    pub fn apply(
        &self,
        text: &str,
        version: &str,
    ) -> String
    {
        let replacement = self
            .replace
            .replace("${version}", version);

        match &self.finder
        {
            Finder::Literal(find) => text.replacen(find.as_str(), &replacement, 1),
            Finder::Regex { re, global } =>
            {
                let template = translate_template(&replacement);
                if *global
                {
                    re.replace_all(text, template.as_str())
                        .into_owned()
                }
                else
                {
                    re.replace(text, template.as_str())
                        .into_owned()
                }
            }
        }
    }
}

/// Rewrite `$1`, `$&`, `$<name>` group references into the `${...}` form the
/// regex crate expects, so `$1abc` means group 1 followed by `abc`.
fn translate_template(template: &str) -> String
{
    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template
        .chars()
        .peekable();

    while let Some(c) = chars.next()
    {
        if c != '$'
        {
            out.push(c);
            continue;
        }

        match chars.peek()
        {
            Some('$') =>
            {
                chars.next();
                out.push_str("$$");
            }
            Some('&') =>
            {
                chars.next();
                out.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() =>
            {
                let mut num = String::new();
                while let Some(&d) = chars.peek()
                    && d.is_ascii_digit()
                    && num.len() < 2
                {
                    num.push(d);
                    chars.next();
                }
                out.push_str(&format!("${{{num}}}"));
            }
            Some('<') =>
            {
                chars.next();
                let name: String = chars
                    .by_ref()
                    .take_while(|&c| c != '>')
                    .collect();
                out.push_str(&format!("${{{name}}}"));
            }
            // A lone `$` is literal text
            _ => out.push_str("$$"),
        }
    }

    out
}

/// Directives of one pack, split by the stage that consumes them.
#[derive(Debug)]
pub struct PackDirectives
{
    delete_files: GlobSet,
    delete_folders: GlobSet,
    replacements: Vec<FindReplace>,
}

impl PackDirectives
{
    /// No exclusions and no replacements; used for `add_folder` sources.
    pub fn empty() -> Self
    {
        Self {
            delete_files: GlobSet::empty(),
            delete_folders: GlobSet::empty(),
            replacements: Vec::new(),
        }
    }

    pub fn compile(
        pack_index: usize,
        modifications: &[Modification],
    ) -> Result<Self, ReleaseError>
    {
        let mut delete_files = GlobSetBuilder::new();
        let mut delete_folders = GlobSetBuilder::new();
        let mut replacements = Vec::new();

        let invalid = |directive_index: usize, message: String| ReleaseError::InvalidDirective {
            pack_index,
            directive_index,
            message,
        };

        for (i, modification) in modifications
            .iter()
            .enumerate()
        {
            match modification
            {
                Modification::DeleteFiles { targets } =>
                {
                    for t in targets
                    {
                        let glob = compile_glob(t)
                            .map_err(|e| invalid(i, format!("invalid glob \"{t}\": {e}")))?;
                        delete_files.add(glob);
                    }
                }
                Modification::DeleteFolders { targets } =>
                {
                    for t in targets
                    {
                        let glob = compile_glob(t)
                            .map_err(|e| invalid(i, format!("invalid glob \"{t}\": {e}")))?;
                        delete_folders.add(glob);
                    }
                }
                Modification::FindAndReplaceInFile { target, find, replace, regex, flags } =>
                {
                    let fr = FindReplace::new(target, find, replace, *regex, flags.as_deref())
                        .map_err(|m| invalid(i, m))?;
                    replacements.push(fr);
                }
                // Tree operations; handled by the engine
                Modification::AddFile { .. }
                | Modification::AddFolder { .. }
                | Modification::RenameFile { .. }
                | Modification::RenameFolder { .. }
                | Modification::MoveFile { .. }
                | Modification::MoveFolder { .. } =>
                {}
            }
        }

        Ok(Self {
            delete_files: delete_files
                .build()
                .map_err(|e| invalid(0, e.to_string()))?,
            delete_folders: delete_folders
                .build()
                .map_err(|e| invalid(0, e.to_string()))?,
            replacements,
        })
    }

    pub fn is_deleted_file(
        &self,
        rel: &str,
    ) -> bool
    {
        self.delete_files
            .is_match(rel)
    }

    /// Folder globs, handed to the walker so excluded trees are pruned
    pub fn deleted_folders(&self) -> &GlobSet
    {
        &self.delete_folders
    }

    /// Replacements whose target matches `rel`, in directive order
    pub fn replacements_for<'a>(
        &'a self,
        rel: &'a str,
    ) -> impl Iterator<Item = &'a FindReplace> + 'a
    {
        self.replacements
            .iter()
            .filter(move |fr| fr.matches(rel))
    }

    /// Run every matching replacement over `text`, in directive order.
    pub fn apply_replacements(
        &self,
        rel: &str,
        text: String,
        version: &str,
    ) -> String
    {
        self.replacements_for(rel)
            .fold(text, |acc, fr| fr.apply(&acc, version))
    }
}
