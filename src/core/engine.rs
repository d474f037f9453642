//! Filepath: src/core/engine.rs
//! Apply tree directives to a pack that has already been ingested.
//!
//! Directives run strictly in list order: a later directive sees the tree
//! left behind by earlier ones (a `move_file` may target a file that an
//! earlier `add_file` introduced). Directives that resolve during ingestion
//! are passed over here. Error messages carry the directive's index in the
//! pack's full `modifications` list.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::directive::{ConflictResolution, Modification, PackDirectives};
use crate::core::error::{EntryKind, ReleaseError};
use crate::core::ingest::{IngestContext, ingest_folder};
use crate::core::manifest::FORMAT_VERSION;
use crate::infra::archive::{ArchiveTree, EntryId};
use crate::infra::config::Pack;
use crate::infra::io::{Fetcher, is_remote_uri, read_bytes};

/// Name of the attribution file added to every pack root
pub const PROVENANCE_FILE: &str = "Release file generated with Add-On Releaser.txt";

/// Attribution link written into every provenance file
pub const PROJECT_URL: &str = concat!("https://crates.io/crates/", env!("CARGO_PKG_NAME"));

/// Body of the attribution file
pub fn provenance_text(extension: &str) -> String
{
    format!(
        "This release of the pack was compiled into a .{extension} file by Add-On Releaser v{FORMAT_VERSION}.\n{PROJECT_URL}\n"
    )
}

/// The pack a directive list belongs to
pub struct PackScope<'a>
{
    /// Position in the configured pack list
    pub index: usize,

    pub pack: &'a Pack,

    /// Pack root inside the archive tree
    pub root: EntryId,

    /// Directory local `add_file`/`add_folder` sources resolve against
    pub working_dir: &'a Path,

    /// Header version rendered for `${version}`
    pub version: &'a str,

    /// Extension of the archive being produced, for the attribution file
    pub extension: &'a str,
}

/// Result of a single directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome
{
    Applied,
    Skipped(&'static str),
    /// Resolved during ingestion
    Ingested,
}

pub struct ModificationEngine<'a>
{
    fetcher: &'a dyn Fetcher,
}

impl<'a> ModificationEngine<'a>
{
    pub fn new(fetcher: &'a dyn Fetcher) -> Self
    {
        Self { fetcher }
    }

    /// Run every tree directive of the pack, then stamp the attribution file.
    #[instrument(skip_all, fields(pack = %scope.pack.path.display()))]
    pub fn apply(
        &self,
        tree: &mut ArchiveTree,
        scope: &PackScope<'_>,
    ) -> Result<Vec<Outcome>>
    {
        let mut outcomes = Vec::with_capacity(
            scope
                .pack
                .modifications
                .len(),
        );

        for (i, modification) in scope
            .pack
            .modifications
            .iter()
            .enumerate()
        {
            let outcome = self.apply_one(tree, scope, i, modification)?;
            if let Outcome::Skipped(reason) = outcome
            {
                debug!(directive = i, reason, "directive skipped");
            }
            outcomes.push(outcome);
        }

        tree.add_text(scope.root, PROVENANCE_FILE, provenance_text(scope.extension))?;
        Ok(outcomes)
    }

    fn apply_one(
        &self,
        tree: &mut ArchiveTree,
        scope: &PackScope<'_>,
        i: usize,
        modification: &Modification,
    ) -> Result<Outcome>
    {
        match modification
        {
            Modification::MoveFile { target, destination } =>
            {
                let id = locate(tree, scope, i, target, EntryKind::File)?;
                move_into(tree, scope, i, id, destination)
            }
            Modification::MoveFolder { target, destination } =>
            {
                let id = locate(tree, scope, i, target, EntryKind::Directory)?;
                move_into(tree, scope, i, id, destination)
            }
            Modification::AddFile { source, destination, overwrite } =>
            {
                self.add_file(tree, scope, i, source, destination, overwrite.unwrap_or(false))
            }
            Modification::AddFolder { source, destination, conflict_resolution } =>
            {
                add_folder(tree, scope, source, destination, *conflict_resolution)
            }
            Modification::RenameFile { target, new_name, overwrite } =>
            {
                check_name(scope, i, new_name)?;
                let id = locate(tree, scope, i, target, EntryKind::File)?;
                let parent = tree
                    .parent(id)
                    .context("file entry has no parent")?;

                if let Some(existing) = tree.child(parent, new_name)
                    && existing != id
                    && !overwrite.unwrap_or(false)
                {
                    return Ok(Outcome::Skipped("rename target exists"));
                }
                tree.rename(id, new_name)?;
                Ok(Outcome::Applied)
            }
            Modification::RenameFolder { target, new_name, conflict_resolution } =>
            {
                check_name(scope, i, new_name)?;
                let id = locate(tree, scope, i, target, EntryKind::Directory)?;
                rename_folder(tree, scope, i, id, new_name, *conflict_resolution)
            }
            Modification::DeleteFiles { .. }
            | Modification::DeleteFolders { .. }
            | Modification::FindAndReplaceInFile { .. } => Ok(Outcome::Ingested),
        }
    }

    fn add_file(
        &self,
        tree: &mut ArchiveTree,
        scope: &PackScope<'_>,
        i: usize,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<Outcome>
    {
        if !overwrite
            && tree
                .lookup(scope.root, destination)
                .is_some()
        {
            return Ok(Outcome::Skipped("destination exists"));
        }

        let (dir, name) = split_parent(destination);
        if name.is_empty()
        {
            return Err(invalid(scope, i, format!("\"{destination}\" does not name a file")).into());
        }

        let data = if is_remote_uri(source)
        {
            self.fetcher
                .fetch(source)?
        }
        else
        {
            read_bytes(
                &scope
                    .working_dir
                    .join(source),
            )?
        };

        let parent = tree
            .create_dir_all(scope.root, dir)
            .ok_or_else(|| wrong_kind(scope, i, dir, EntryKind::Directory))?;
        tree.add_file(parent, name, data)?;
        Ok(Outcome::Applied)
    }
}

fn add_folder(
    tree: &mut ArchiveTree,
    scope: &PackScope<'_>,
    source: &str,
    destination: &str,
    conflict: ConflictResolution,
) -> Result<Outcome>
{
    if let Some(existing) = tree.lookup(scope.root, destination)
    {
        match conflict
        {
            ConflictResolution::Skip => return Ok(Outcome::Skipped("destination exists")),
            ConflictResolution::Overwrite if existing == scope.root =>
            {
                for child in tree
                    .children(existing)
                    .to_vec()
                {
                    tree.remove(child)?;
                }
            }
            ConflictResolution::Overwrite => tree.remove(existing)?,
            ConflictResolution::Merge => {}
        }
    }

    let Some(dest) = tree.create_dir_all(scope.root, destination)
    else
    {
        warn!(%destination, "add_folder destination is a file; skipping");
        return Ok(Outcome::Skipped("destination is not a directory"));
    };

    let empty = PackDirectives::empty();
    let cx = IngestContext {
        directives: &empty,
        manifest_text: None,
        version: scope.version,
    };
    ingest_folder(
        tree,
        dest,
        &scope
            .working_dir
            .join(source),
        &cx,
    )?;
    Ok(Outcome::Applied)
}

fn rename_folder(
    tree: &mut ArchiveTree,
    scope: &PackScope<'_>,
    i: usize,
    id: EntryId,
    new_name: &str,
    conflict: ConflictResolution,
) -> Result<Outcome>
{
    let parent = tree
        .parent(id)
        .ok_or_else(|| invalid(scope, i, "the pack root cannot be renamed".to_string()))?;

    let Some(existing) = tree
        .child(parent, new_name)
        .filter(|&e| e != id)
    else
    {
        tree.rename(id, new_name)?;
        return Ok(Outcome::Applied);
    };

    match conflict
    {
        ConflictResolution::Skip => Ok(Outcome::Skipped("rename target exists")),
        ConflictResolution::Overwrite =>
        {
            tree.remove(existing)?;
            tree.rename(id, new_name)?;
            Ok(Outcome::Applied)
        }
        ConflictResolution::Merge if !tree.is_dir(existing) =>
        {
            tree.remove(existing)?;
            tree.rename(id, new_name)?;
            Ok(Outcome::Applied)
        }
        ConflictResolution::Merge =>
        {
            tree.merge_into(id, existing)
                .with_context(|| directive_label(scope, i))?;
            tree.remove(id)?;
            Ok(Outcome::Applied)
        }
    }
}

fn move_into(
    tree: &mut ArchiveTree,
    scope: &PackScope<'_>,
    i: usize,
    id: EntryId,
    destination: &str,
) -> Result<Outcome>
{
    let dest = match tree.lookup(scope.root, destination)
    {
        Some(d) => d,
        None => match tree.create_dir_all(scope.root, destination)
        {
            Some(d) => d,
            None => return Ok(Outcome::Skipped("destination is not a directory")),
        },
    };
    if !tree.is_dir(dest)
    {
        return Ok(Outcome::Skipped("destination is not a directory"));
    }

    tree.move_entry(id, dest)
        .with_context(|| directive_label(scope, i))?;
    Ok(Outcome::Applied)
}

/// Find `target` under the pack root and check its kind.
fn locate(
    tree: &ArchiveTree,
    scope: &PackScope<'_>,
    i: usize,
    target: &str,
    expected: EntryKind,
) -> Result<EntryId, ReleaseError>
{
    let id = tree
        .lookup(scope.root, target)
        .ok_or_else(|| ReleaseError::NotFound {
            pack_index: scope.index,
            directive_index: i,
            target: target.to_string(),
            pack: scope
                .pack
                .path
                .clone(),
        })?;

    if tree.kind(id) != expected
    {
        return Err(wrong_kind(scope, i, target, expected));
    }
    Ok(id)
}

fn check_name(
    scope: &PackScope<'_>,
    i: usize,
    new_name: &str,
) -> Result<(), ReleaseError>
{
    if new_name.is_empty() || new_name.contains(['/', '\\']) || new_name == "." || new_name == ".."
    {
        return Err(invalid(scope, i, format!("\"{new_name}\" is not a valid entry name")));
    }
    Ok(())
}

/// Split `a/b/c.txt` into (`a/b`, `c.txt`).
fn split_parent(path: &str) -> (&str, &str)
{
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.len() != path.len()
    {
        return (trimmed, "");
    }
    match path.rfind(['/', '\\'])
    {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => ("", path),
    }
}

fn wrong_kind(
    scope: &PackScope<'_>,
    i: usize,
    target: &str,
    expected: EntryKind,
) -> ReleaseError
{
    ReleaseError::WrongKind {
        pack_index: scope.index,
        directive_index: i,
        target: target.to_string(),
        expected,
        pack: scope
            .pack
            .path
            .clone(),
    }
}

fn invalid(
    scope: &PackScope<'_>,
    i: usize,
    message: String,
) -> ReleaseError
{
    ReleaseError::InvalidDirective {
        pack_index: scope.index,
        directive_index: i,
        message,
    }
}

fn directive_label(
    scope: &PackScope<'_>,
    i: usize,
) -> String
{
    format!("packs[{}].modifications[{i}]", scope.index)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::infra::io::StaticFetcher;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture
    {
        tree: ArchiveTree,
        pack: Pack,
        workdir: TempDir,
    }

    impl Fixture
    {
        /// Tree with `scripts/main.js`, `scripts/util.js`, `textures/a.png`,
        /// `textures/shared.png`, `extra/shared.png`, `extra/b.png`, `notes.txt`
        fn new(modifications: &str) -> Self
        {
            let mut tree = ArchiveTree::new();
            let root = tree.root();
            for (path, body) in [
                ("scripts/main.js", "main"),
                ("scripts/util.js", "util"),
                ("textures/a.png", "a"),
                ("textures/shared.png", "textures"),
                ("extra/shared.png", "extra"),
                ("extra/b.png", "b"),
                ("notes.txt", "notes"),
            ]
            {
                let (dir, name) = split_parent(path);
                let parent = tree
                    .create_dir_all(root, dir)
                    .unwrap();
                tree.add_text(parent, name, body)
                    .unwrap();
            }

            let pack = Pack {
                path: PathBuf::from("packs/BP"),
                release_name: None,
                modifications: serde_json::from_str(modifications).unwrap(),
            };
            Self { tree, pack, workdir: TempDir::new().unwrap() }
        }

        fn run_with(
            &mut self,
            fetcher: &dyn Fetcher,
        ) -> Result<Vec<Outcome>>
        {
            let scope = PackScope {
                index: 2,
                pack: &self.pack,
                root: self
                    .tree
                    .root(),
                working_dir: self
                    .workdir
                    .path(),
                version: "1.0.0",
                extension: "mcpack",
            };
            ModificationEngine::new(fetcher).apply(&mut self.tree, &scope)
        }

        fn run(&mut self) -> Result<Vec<Outcome>>
        {
            self.run_with(&StaticFetcher::new())
        }

        fn text(
            &self,
            path: &str,
        ) -> Option<String>
        {
            let id = self
                .tree
                .lookup(self.tree.root(), path)?;
            self.tree
                .data(id)
                .map(|d| String::from_utf8_lossy(d).into_owned())
        }

        fn files(&self) -> Vec<String>
        {
            let mut f = self
                .tree
                .file_paths(self.tree.root());
            f.retain(|p| p != PROVENANCE_FILE);
            f.sort();
            f
        }
    }

    fn release_err(err: &anyhow::Error) -> &ReleaseError
    {
        err.downcast_ref::<ReleaseError>()
            .expect("ReleaseError")
    }

    #[test]
    fn move_file_creates_destination()
    {
        let mut fx = Fixture::new(r#"[{"type": "move_file", "target": "notes.txt", "destination": "docs/en"}]"#);
        fx.run().unwrap();
        assert_eq!(fx.text("docs/en/notes.txt").as_deref(), Some("notes"));
        assert!(fx.text("notes.txt").is_none());
    }

    #[test]
    fn move_missing_target_is_not_found()
    {
        let mut fx = Fixture::new(
            r#"[
                {"type": "delete_files", "targets": []},
                {"type": "move_file", "target": "nope.txt", "destination": "docs"}
            ]"#,
        );
        let err = fx
            .run()
            .unwrap_err();
        match release_err(&err)
        {
            ReleaseError::NotFound { pack_index, directive_index, target, .. } =>
            {
                assert_eq!((*pack_index, *directive_index), (2, 1));
                assert_eq!(target, "nope.txt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn move_folder_requires_directory()
    {
        let mut fx = Fixture::new(r#"[{"type": "move_folder", "target": "notes.txt", "destination": "docs"}]"#);
        let err = fx
            .run()
            .unwrap_err();
        assert!(matches!(
            release_err(&err),
            ReleaseError::WrongKind { expected: EntryKind::Directory, .. }
        ));
    }

    #[test]
    fn move_file_onto_its_own_parent_name()
    {
        let mut fx = Fixture::new(r#"[{"type": "move_file", "target": "docs/docs", "destination": "."}]"#);
        let root = fx
            .tree
            .root();
        let docs = fx
            .tree
            .add_directory(root, "docs")
            .unwrap();
        fx.tree
            .add_text(docs, "docs", "inner")
            .unwrap();

        fx.run().unwrap();
        assert_eq!(fx.text("docs").as_deref(), Some("inner"));
    }

    #[test]
    fn move_onto_a_file_is_a_no_op()
    {
        let mut fx = Fixture::new(r#"[{"type": "move_file", "target": "scripts/util.js", "destination": "notes.txt"}]"#);
        let outcomes = fx
            .run()
            .unwrap();
        assert!(matches!(outcomes[0], Outcome::Skipped(_)));
        assert!(
            fx.text("scripts/util.js")
                .is_some()
        );
    }

    #[test]
    fn add_file_then_move_succeeds_in_order()
    {
        let mut fx = Fixture::new(
            r#"[
                {"type": "add_file", "source": "https://cdn.example/icon.png", "destination": "icons/icon.png"},
                {"type": "move_file", "target": "icons/icon.png", "destination": "textures"}
            ]"#,
        );
        let fetcher = StaticFetcher::new().with("https://cdn.example/icon.png", b"png".to_vec());
        fx.run_with(&fetcher)
            .unwrap();
        assert_eq!(fx.text("textures/icon.png").as_deref(), Some("png"));
    }

    #[test]
    fn move_before_add_is_not_found()
    {
        let mut fx = Fixture::new(
            r#"[
                {"type": "move_file", "target": "icons/icon.png", "destination": "textures"},
                {"type": "add_file", "source": "https://cdn.example/icon.png", "destination": "icons/icon.png"}
            ]"#,
        );
        let fetcher = StaticFetcher::new().with("https://cdn.example/icon.png", b"png".to_vec());
        let err = fx
            .run_with(&fetcher)
            .unwrap_err();
        assert!(matches!(release_err(&err), ReleaseError::NotFound { directive_index: 0, .. }));
    }

    #[test]
    fn add_file_respects_overwrite_flag()
    {
        let mut fx = Fixture::new(
            r#"[
                {"type": "add_file", "source": "local.txt", "destination": "notes.txt"},
                {"type": "add_file", "source": "local.txt", "destination": "scripts/main.js", "overwrite": true}
            ]"#,
        );
        fs::write(
            fx.workdir
                .path()
                .join("local.txt"),
            "local",
        )
        .unwrap();
        let outcomes = fx
            .run()
            .unwrap();
        assert_eq!(outcomes[0], Outcome::Skipped("destination exists"));
        assert_eq!(fx.text("notes.txt").as_deref(), Some("notes"));
        assert_eq!(fx.text("scripts/main.js").as_deref(), Some("local"));
    }

    #[test]
    fn add_file_under_a_file_is_wrong_kind()
    {
        let mut fx = Fixture::new(r#"[{"type": "add_file", "source": "https://x/y", "destination": "notes.txt/y.txt"}]"#);
        let fetcher = StaticFetcher::new().with("https://x/y", b"y".to_vec());
        let err = fx
            .run_with(&fetcher)
            .unwrap_err();
        assert!(matches!(release_err(&err), ReleaseError::WrongKind { .. }));
    }

    #[test]
    fn failed_fetch_is_fatal()
    {
        let mut fx = Fixture::new(r#"[{"type": "add_file", "source": "https://x/missing", "destination": "m.txt"}]"#);
        assert!(
            fx.run()
                .is_err()
        );
    }

    fn add_folder_fixture(conflict: &str) -> Fixture
    {
        let fx = Fixture::new(&format!(
            r#"[{{"type": "add_folder", "source": "incoming", "destination": "textures", "conflict_resolution": "{conflict}"}}]"#
        ));
        let incoming = fx
            .workdir
            .path()
            .join("incoming");
        fs::create_dir_all(&incoming).unwrap();
        fs::write(incoming.join("shared.png"), "incoming").unwrap();
        fs::write(incoming.join("new.png"), "new").unwrap();
        fs::write(incoming.join("manifest.json"), "raw").unwrap();
        fx
    }

    #[test]
    fn add_folder_skip_leaves_tree_unchanged()
    {
        let mut fx = add_folder_fixture("skip");
        let before = fx.files();
        fx.run().unwrap();
        assert_eq!(fx.files(), before);
    }

    #[test]
    fn add_folder_overwrite_replaces_destination()
    {
        let mut fx = add_folder_fixture("overwrite");
        fx.run().unwrap();
        let textures: Vec<String> = fx
            .files()
            .into_iter()
            .filter(|p| p.starts_with("textures/"))
            .collect();
        assert_eq!(textures, vec!["textures/manifest.json", "textures/new.png", "textures/shared.png"]);
        assert_eq!(fx.text("textures/shared.png").as_deref(), Some("incoming"));
        // Nested manifests are copied verbatim
        assert_eq!(fx.text("textures/manifest.json").as_deref(), Some("raw"));
    }

    #[test]
    fn add_folder_merge_unions_with_source_winning()
    {
        let mut fx = add_folder_fixture("merge");
        fx.run().unwrap();
        assert_eq!(fx.text("textures/a.png").as_deref(), Some("a"));
        assert_eq!(fx.text("textures/new.png").as_deref(), Some("new"));
        assert_eq!(fx.text("textures/shared.png").as_deref(), Some("incoming"));
    }

    #[test]
    fn rename_file_skips_on_collision_without_overwrite()
    {
        let mut fx = Fixture::new(
            r#"[
                {"type": "rename_file", "target": "scripts/util.js", "new_name": "main.js"},
                {"type": "rename_file", "target": "notes.txt", "new_name": "README.txt"}
            ]"#,
        );
        let outcomes = fx
            .run()
            .unwrap();
        assert_eq!(outcomes[0], Outcome::Skipped("rename target exists"));
        assert_eq!(fx.text("scripts/main.js").as_deref(), Some("main"));
        assert_eq!(fx.text("README.txt").as_deref(), Some("notes"));
    }

    #[test]
    fn rename_file_overwrites_when_asked()
    {
        let mut fx = Fixture::new(
            r#"[{"type": "rename_file", "target": "scripts/util.js", "new_name": "main.js", "overwrite": true}]"#,
        );
        fx.run().unwrap();
        assert_eq!(fx.text("scripts/main.js").as_deref(), Some("util"));
        assert!(
            fx.text("scripts/util.js")
                .is_none()
        );
    }

    #[test]
    fn rename_folder_skip_and_overwrite()
    {
        let mut skip =
            Fixture::new(r#"[{"type": "rename_folder", "target": "extra", "new_name": "textures", "conflict_resolution": "skip"}]"#);
        let before = skip.files();
        skip.run().unwrap();
        assert_eq!(skip.files(), before);

        let mut over = Fixture::new(
            r#"[{"type": "rename_folder", "target": "extra", "new_name": "textures", "conflict_resolution": "overwrite"}]"#,
        );
        over.run().unwrap();
        let textures: Vec<String> = over
            .files()
            .into_iter()
            .filter(|p| p.starts_with("textures/"))
            .collect();
        assert_eq!(textures, vec!["textures/b.png", "textures/shared.png"]);
        assert_eq!(over.text("textures/shared.png").as_deref(), Some("extra"));
        assert!(
            over.text("extra/b.png")
                .is_none()
        );
    }

    #[test]
    fn rename_folder_merge_moves_children_into_existing_directory()
    {
        let mut fx = Fixture::new(
            r#"[{"type": "rename_folder", "target": "extra", "new_name": "textures", "conflict_resolution": "merge"}]"#,
        );
        fx.run().unwrap();
        let textures: Vec<String> = fx
            .files()
            .into_iter()
            .filter(|p| p.starts_with("textures/"))
            .collect();
        assert_eq!(textures, vec!["textures/a.png", "textures/b.png", "textures/shared.png"]);
        assert_eq!(fx.text("textures/shared.png").as_deref(), Some("extra"));
        assert!(
            fx.tree
                .lookup(fx.tree.root(), "extra")
                .is_none()
        );
    }

    #[test]
    fn rename_folder_merge_onto_file_replaces_it()
    {
        let mut fx = Fixture::new(
            r#"[{"type": "rename_folder", "target": "extra", "new_name": "notes.txt", "conflict_resolution": "merge"}]"#,
        );
        fx.run().unwrap();
        assert_eq!(fx.text("notes.txt/b.png").as_deref(), Some("b"));
    }

    #[test]
    fn rename_rejects_path_like_names()
    {
        let mut fx = Fixture::new(r#"[{"type": "rename_file", "target": "notes.txt", "new_name": "a/b.txt"}]"#);
        let err = fx
            .run()
            .unwrap_err();
        assert!(matches!(release_err(&err), ReleaseError::InvalidDirective { .. }));
    }

    #[test]
    fn provenance_file_is_added_once_after_directives()
    {
        let mut fx = Fixture::new("[]");
        fx.run().unwrap();
        fx.run().unwrap();
        let root = fx
            .tree
            .root();
        let count = fx
            .tree
            .children(root)
            .iter()
            .filter(|&&c| fx.tree.name(c) == PROVENANCE_FILE)
            .count();
        assert_eq!(count, 1);
        let text = fx
            .text(PROVENANCE_FILE)
            .unwrap();
        assert!(text.contains(".mcpack file by Add-On Releaser v"));
        assert_eq!(text, provenance_text("mcpack"));
        assert_eq!(
            text.lines()
                .nth(1),
            Some("https://crates.io/crates/addon-releaser")
        );
    }

    #[test]
    fn splits_parent_paths()
    {
        assert_eq!(split_parent("a/b/c.txt"), ("a/b", "c.txt"));
        assert_eq!(split_parent("c.txt"), ("", "c.txt"));
        assert_eq!(split_parent("dir/"), ("dir", ""));
    }
}
