//! Filepath: src/infra/archive.rs
//! In-memory archive tree that mirrors the eventual zip contents.
//!
//! Entries live in an arena and are addressed by `EntryId`. Moving or
//! renaming an entry only rewrites its parent link or name; nothing is
//! copied. Removed entries leave a tombstone so ids stay stable.
//!
//! Name collisions resolve in favor of the newest entry: adding, moving or
//! renaming onto an occupied name drops the previous occupant, except that
//! `add_directory` onto an existing directory reuses it.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::core::error::EntryKind;

/// Stable handle to an entry in an `ArchiveTree`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Structural errors the tree refuses to perform
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError
{
    #[error("cannot move directory \"{0}\" into itself")]
    MoveIntoSelf(String),

    #[error("\"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("the archive root cannot be moved, renamed or removed")]
    RootImmutable,
}

#[derive(Debug)]
enum Node
{
    Directory
    {
        children: Vec<EntryId>,
    },
    File
    {
        data: Vec<u8>,
    },
}

#[derive(Debug)]
struct Entry
{
    name: String,
    parent: Option<EntryId>,
    node: Node,
}

#[derive(Debug)]
pub struct ArchiveTree
{
    entries: Vec<Option<Entry>>,
    root: EntryId,
}

impl Default for ArchiveTree
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl ArchiveTree
{
    /// Empty tree with an unnamed root directory
    pub fn new() -> Self
    {
        Self {
            entries: vec![Some(Entry {
                name: String::new(),
                parent: None,
                node: Node::Directory { children: Vec::new() },
            })],
            root: EntryId(0),
        }
    }

    pub fn root(&self) -> EntryId
    {
        self.root
    }

    fn entry(
        &self,
        id: EntryId,
    ) -> &Entry
    {
        self.entries[id.0]
            .as_ref()
            .expect("EntryId refers to a removed entry")
    }

    fn entry_mut(
        &mut self,
        id: EntryId,
    ) -> &mut Entry
    {
        self.entries[id.0]
            .as_mut()
            .expect("EntryId refers to a removed entry")
    }

    /// True while `id` has not been removed
    pub fn contains(
        &self,
        id: EntryId,
    ) -> bool
    {
        self.entries
            .get(id.0)
            .is_some_and(Option::is_some)
    }

    pub fn name(
        &self,
        id: EntryId,
    ) -> &str
    {
        &self
            .entry(id)
            .name
    }

    pub fn parent(
        &self,
        id: EntryId,
    ) -> Option<EntryId>
    {
        self.entry(id)
            .parent
    }

    pub fn kind(
        &self,
        id: EntryId,
    ) -> EntryKind
    {
        match self
            .entry(id)
            .node
        {
            Node::Directory { .. } => EntryKind::Directory,
            Node::File { .. } => EntryKind::File,
        }
    }

    pub fn is_dir(
        &self,
        id: EntryId,
    ) -> bool
    {
        self.kind(id) == EntryKind::Directory
    }

    /// Children of a directory in insertion order; empty for files.
    pub fn children(
        &self,
        id: EntryId,
    ) -> &[EntryId]
    {
        match &self
            .entry(id)
            .node
        {
            Node::Directory { children } => children.as_slice(),
            Node::File { .. } => &[],
        }
    }

    /// File contents, `None` for directories
    pub fn data(
        &self,
        id: EntryId,
    ) -> Option<&[u8]>
    {
        match &self
            .entry(id)
            .node
        {
            Node::File { data } => Some(data.as_slice()),
            Node::Directory { .. } => None,
        }
    }

    /// Direct child of `dir` with the given name
    pub fn child(
        &self,
        dir: EntryId,
        name: &str,
    ) -> Option<EntryId>
    {
        self.children(dir)
            .iter()
            .copied()
            .find(|&c| self.name(c) == name)
    }

    /// Resolve a slash-separated path relative to `from`.
    /// Backslashes are treated as separators; empty and `.` segments are
    /// ignored, so `""` resolves to `from` itself.
    pub fn lookup(
        &self,
        from: EntryId,
        path: &str,
    ) -> Option<EntryId>
    {
        let mut cur = from;
        for seg in segments(path)
        {
            cur = self.child(cur, seg)?;
        }
        Some(cur)
    }

    /// Resolve `path` under `from`, creating missing directories.
    /// Returns `None` when an existing file blocks the path.
    pub fn create_dir_all(
        &mut self,
        from: EntryId,
        path: &str,
    ) -> Option<EntryId>
    {
        let mut cur = from;
        for seg in segments(path)
        {
            cur = match self.child(cur, seg)
            {
                Some(existing) if self.is_dir(existing) => existing,
                Some(_) => return None,
                None => self.attach(
                    cur,
                    seg.to_string(),
                    Node::Directory { children: Vec::new() },
                ),
            };
        }
        Some(cur)
    }

    /// Add (or reuse) a directory named `name` under `parent`.
    /// A file with the same name is replaced.
    pub fn add_directory(
        &mut self,
        parent: EntryId,
        name: &str,
    ) -> Result<EntryId, ArchiveError>
    {
        self.ensure_dir(parent)?;

        if let Some(existing) = self.child(parent, name)
        {
            if self.is_dir(existing)
            {
                return Ok(existing);
            }
            self.remove_subtree(existing);
        }

        Ok(self.attach(
            parent,
            name.to_string(),
            Node::Directory { children: Vec::new() },
        ))
    }

    /// Add a file under `parent`, replacing any entry with that name.
    pub fn add_file(
        &mut self,
        parent: EntryId,
        name: &str,
        data: Vec<u8>,
    ) -> Result<EntryId, ArchiveError>
    {
        self.ensure_dir(parent)?;

        if let Some(existing) = self.child(parent, name)
        {
            self.remove_subtree(existing);
        }

        Ok(self.attach(parent, name.to_string(), Node::File { data }))
    }

    /// Text variant of `add_file`
    pub fn add_text(
        &mut self,
        parent: EntryId,
        name: &str,
        text: impl Into<String>,
    ) -> Result<EntryId, ArchiveError>
    {
        self.add_file(parent, name, text.into().into_bytes())
    }

    /// Remove an entry and everything below it.
    pub fn remove(
        &mut self,
        id: EntryId,
    ) -> Result<(), ArchiveError>
    {
        if id == self.root
        {
            return Err(ArchiveError::RootImmutable);
        }
        self.remove_subtree(id);
        Ok(())
    }

    /// Re-parent `id` under `dest`, replacing a same-named child of `dest`.
    pub fn move_entry(
        &mut self,
        id: EntryId,
        dest: EntryId,
    ) -> Result<(), ArchiveError>
    {
        if id == self.root
        {
            return Err(ArchiveError::RootImmutable);
        }
        self.ensure_dir(dest)?;
        if self.is_ancestor_or_self(id, dest)
        {
            return Err(ArchiveError::MoveIntoSelf(self.path_of(id)));
        }
        if self.parent(id) == Some(dest)
        {
            return Ok(());
        }

        let name = self
            .name(id)
            .to_string();

        // The occupant may be an ancestor of `id`; unlink `id` before dropping it
        self.detach(id);
        if let Some(existing) = self.child(dest, &name)
        {
            self.remove_subtree(existing);
        }
        self.link(dest, id);
        Ok(())
    }

    /// Rename `id` in place, replacing a sibling that already holds `new_name`.
    pub fn rename(
        &mut self,
        id: EntryId,
        new_name: &str,
    ) -> Result<(), ArchiveError>
    {
        let parent = self
            .parent(id)
            .ok_or(ArchiveError::RootImmutable)?;
        if self.name(id) == new_name
        {
            return Ok(());
        }
        if let Some(existing) = self.child(parent, new_name)
        {
            self.remove_subtree(existing);
        }
        self.entry_mut(id)
            .name = new_name.to_string();
        Ok(())
    }

    /// Move every child of `src` into `dest`, recursing where both sides
    /// hold a directory of the same name; other collisions favor `src`.
    /// `src` itself is left in place, empty.
    pub fn merge_into(
        &mut self,
        src: EntryId,
        dest: EntryId,
    ) -> Result<(), ArchiveError>
    {
        self.ensure_dir(src)?;
        self.ensure_dir(dest)?;
        if self.is_ancestor_or_self(src, dest)
        {
            return Err(ArchiveError::MoveIntoSelf(self.path_of(src)));
        }

        let children = self
            .children(src)
            .to_vec();
        for child in children
        {
            let name = self
                .name(child)
                .to_string();
            match self.child(dest, &name)
            {
                Some(existing) if self.is_dir(existing) && self.is_dir(child) =>
                {
                    self.merge_into(child, existing)?;
                    self.remove_subtree(child);
                }
                _ => self.move_entry(child, dest)?,
            }
        }
        Ok(())
    }

    /// Slash-joined path of `id` from the root (root is `""`)
    pub fn path_of(
        &self,
        id: EntryId,
    ) -> String
    {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur
        {
            if c == self.root
            {
                break;
            }
            parts.push(self.name(c));
            cur = self.parent(c);
        }
        parts.reverse();
        parts.join("/")
    }

    /// All file paths below `from`, relative to it, depth-first.
    pub fn file_paths(
        &self,
        from: EntryId,
    ) -> Vec<String>
    {
        let mut out = Vec::new();
        self.collect_files(from, "", &mut out);
        out
    }

    fn collect_files(
        &self,
        dir: EntryId,
        prefix: &str,
        out: &mut Vec<String>,
    )
    {
        for &child in self.children(dir)
        {
            let path = format!("{prefix}{}", self.name(child));
            if self.is_dir(child)
            {
                self.collect_files(child, &format!("{path}/"), out);
            }
            else
            {
                out.push(path);
            }
        }
    }

    /// Serialize the whole tree into a deflate-compressed zip container.
    pub fn to_zip_bytes(
        &self,
        comment: &str,
    ) -> Result<Vec<u8>>
    {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        self.write_dir(&mut zip, self.root, "")?;

        zip.set_comment(comment);
        let cursor = zip
            .finish()
            .context("Failed to finalize zip archive")?;
        Ok(cursor.into_inner())
    }

    fn write_dir(
        &self,
        zip: &mut ZipWriter<Cursor<Vec<u8>>>,
        dir: EntryId,
        prefix: &str,
    ) -> Result<()>
    {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for &child in self.children(dir)
        {
            let path = format!("{prefix}{}", self.name(child));
            match &self
                .entry(child)
                .node
            {
                Node::Directory { .. } =>
                {
                    let dir_path = format!("{path}/");
                    zip.add_directory(dir_path.as_str(), options)
                        .with_context(|| format!("Failed to add directory {dir_path}"))?;
                    self.write_dir(zip, child, &dir_path)?;
                }
                Node::File { data } =>
                {
                    zip.start_file(path.as_str(), options)
                        .with_context(|| format!("Failed to add file {path}"))?;
                    zip.write_all(data)
                        .with_context(|| format!("Failed to write file {path}"))?;
                }
            }
        }
        Ok(())
    }

    fn ensure_dir(
        &self,
        id: EntryId,
    ) -> Result<(), ArchiveError>
    {
        if self.is_dir(id)
        {
            Ok(())
        }
        else
        {
            Err(ArchiveError::NotADirectory(self.path_of(id)))
        }
    }

    fn is_ancestor_or_self(
        &self,
        ancestor: EntryId,
        id: EntryId,
    ) -> bool
    {
        let mut cur = Some(id);
        while let Some(c) = cur
        {
            if c == ancestor
            {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    fn attach(
        &mut self,
        parent: EntryId,
        name: String,
        node: Node,
    ) -> EntryId
    {
        let id = EntryId(
            self.entries
                .len(),
        );
        self.entries
            .push(Some(Entry { name, parent: None, node }));
        self.link(parent, id);
        id
    }

    fn link(
        &mut self,
        parent: EntryId,
        id: EntryId,
    )
    {
        if let Node::Directory { children } = &mut self
            .entry_mut(parent)
            .node
        {
            children.push(id);
        }
        self.entry_mut(id)
            .parent = Some(parent);
    }

    fn detach(
        &mut self,
        id: EntryId,
    )
    {
        if let Some(parent) = self.parent(id)
            && let Node::Directory { children } = &mut self
                .entry_mut(parent)
                .node
        {
            children.retain(|&c| c != id);
        }
        self.entry_mut(id)
            .parent = None;
    }

    fn remove_subtree(
        &mut self,
        id: EntryId,
    )
    {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(cur) = stack.pop()
        {
            if let Some(entry) = self.entries[cur.0].take()
                && let Node::Directory { children } = entry.node
            {
                stack.extend(children);
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str>
{
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
}

#[cfg(test)]
mod tests
{
    use super::*;
    use std::io::Read;

    fn sample() -> (ArchiveTree, EntryId)
    {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let scripts = tree
            .add_directory(root, "scripts")
            .unwrap();
        tree.add_text(scripts, "main.js", "console.log(1);")
            .unwrap();
        tree.add_text(root, "manifest.json", "{}")
            .unwrap();
        (tree, scripts)
    }

    #[test]
    fn lookup_walks_nested_paths()
    {
        let (tree, scripts) = sample();
        let root = tree.root();
        assert_eq!(tree.lookup(root, "scripts"), Some(scripts));
        let main = tree
            .lookup(root, "scripts/main.js")
            .unwrap();
        assert_eq!(tree.kind(main), EntryKind::File);
        assert_eq!(tree.lookup(root, "./scripts\\main.js"), Some(main));
        assert_eq!(tree.lookup(root, "missing/main.js"), None);
        assert_eq!(tree.lookup(root, ""), Some(root));
    }

    #[test]
    fn move_reparents_without_copying()
    {
        let (mut tree, _) = sample();
        let root = tree.root();
        let manifest = tree
            .lookup(root, "manifest.json")
            .unwrap();
        let dest = tree
            .create_dir_all(root, "a/b")
            .unwrap();
        tree.move_entry(manifest, dest)
            .unwrap();
        assert_eq!(tree.lookup(root, "a/b/manifest.json"), Some(manifest));
        assert_eq!(tree.lookup(root, "manifest.json"), None);
    }

    #[test]
    fn move_onto_same_named_ancestor_replaces_it()
    {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let docs = tree
            .add_directory(root, "docs")
            .unwrap();
        let inner = tree
            .add_text(docs, "docs", "inner")
            .unwrap();
        tree.add_text(docs, "other.md", "other")
            .unwrap();

        tree.move_entry(inner, root)
            .unwrap();

        assert!(!tree.contains(docs));
        assert_eq!(tree.lookup(root, "docs"), Some(inner));
        assert_eq!(tree.data(inner), Some(&b"inner"[..]));
        assert_eq!(tree.file_paths(root), vec!["docs"]);
    }

    #[test]
    fn cannot_move_directory_into_itself()
    {
        let (mut tree, scripts) = sample();
        let inner = tree
            .add_directory(scripts, "inner")
            .unwrap();
        let err = tree
            .move_entry(scripts, inner)
            .unwrap_err();
        assert!(matches!(err, ArchiveError::MoveIntoSelf(_)));
    }

    #[test]
    fn rename_replaces_colliding_sibling()
    {
        let (mut tree, scripts) = sample();
        let root = tree.root();
        let other = tree
            .add_text(scripts, "other.js", "x")
            .unwrap();
        let main = tree
            .child(scripts, "main.js")
            .unwrap();
        tree.rename(other, "main.js")
            .unwrap();
        assert!(!tree.contains(main));
        assert_eq!(tree.lookup(root, "scripts/main.js"), Some(other));
        assert_eq!(
            tree.children(scripts)
                .len(),
            1
        );
    }

    #[test]
    fn create_dir_all_is_blocked_by_files()
    {
        let (mut tree, _) = sample();
        let root = tree.root();
        assert!(
            tree.create_dir_all(root, "manifest.json/x")
                .is_none()
        );
        assert!(
            tree.create_dir_all(root, "scripts/new")
                .is_some()
        );
    }

    #[test]
    fn merge_unions_children_and_favors_source()
    {
        let mut tree = ArchiveTree::new();
        let root = tree.root();
        let a = tree
            .add_directory(root, "a")
            .unwrap();
        let b = tree
            .add_directory(root, "b")
            .unwrap();
        tree.add_text(a, "shared.txt", "from a")
            .unwrap();
        tree.add_text(a, "only_a.txt", "a")
            .unwrap();
        tree.add_text(b, "shared.txt", "from b")
            .unwrap();
        tree.add_text(b, "only_b.txt", "b")
            .unwrap();

        tree.merge_into(a, b)
            .unwrap();

        let mut files = tree.file_paths(b);
        files.sort();
        assert_eq!(files, vec!["only_a.txt", "only_b.txt", "shared.txt"]);
        let shared = tree
            .child(b, "shared.txt")
            .unwrap();
        assert_eq!(tree.data(shared), Some(&b"from a"[..]));
        assert!(
            tree.children(a)
                .is_empty()
        );
    }

    #[test]
    fn exports_readable_zip()
    {
        let (tree, _) = sample();
        let bytes = tree
            .to_zip_bytes("test archive")
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive
            .file_names()
            .map(str::to_string)
            .collect();
        names.sort();
        assert_eq!(names, vec!["manifest.json", "scripts/", "scripts/main.js"]);

        let mut text = String::new();
        archive
            .by_name("scripts/main.js")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "console.log(1);");
    }
}
