//! Shared fixtures for integration tests
//!
//! Builds pack folders on disk and reads produced archives back.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

use addon_releaser::core::release::Artifact;
use addon_releaser::infra::io::StaticFetcher;
use addon_releaser::{Config, ReleaseAssembler, VersionCallbacks};
use assert_fs::prelude::*;

/// Write a pack folder with a manifest and an icon.
/// `version` is raw JSON: `[1, 2, 3]` or `"1.2.3"`.
pub fn write_pack(
    root: &assert_fs::TempDir,
    folder: &str,
    uuid: &str,
    version: &str,
)
{
    root.child(format!("{folder}/manifest.json"))
        .write_str(&format!(
            r#"{{
    "format_version": 2,
    "header": {{ "name": "{folder}", "description": "pack {folder}", "uuid": "{uuid}", "version": {version} }},
    "modules": [ {{ "type": "data", "uuid": "{uuid}-m", "version": {version} }} ]
}}"#
        ))
        .expect("write manifest");
    root.child(format!("{folder}/pack_icon.png"))
        .write_binary(&[0x89, 0x50, 0x4e, 0x47])
        .expect("write icon");
}

pub fn config(json: &str) -> Config
{
    serde_json::from_str(json).expect("config json")
}

/// Build every archive of `config` rooted at `dir`.
pub fn build(
    config: &Config,
    dir: &Path,
    fetcher: &StaticFetcher,
) -> anyhow::Result<Vec<Artifact>>
{
    let callbacks = VersionCallbacks::builtin();
    ReleaseAssembler::new(config, dir.to_path_buf(), fetcher, &callbacks).build()
}

/// Every file entry of a zip, keyed by path.
pub fn zip_files(bytes: &[u8]) -> BTreeMap<String, Vec<u8>>
{
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut out = BTreeMap::new();
    for i in 0..archive.len()
    {
        let mut entry = archive
            .by_index(i)
            .expect("entry");
        if entry.is_dir()
        {
            continue;
        }
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .expect("read entry");
        out.insert(
            entry
                .name()
                .to_string(),
            data,
        );
    }
    out
}

pub fn zip_text(
    bytes: &[u8],
    path: &str,
) -> String
{
    let files = zip_files(bytes);
    let data = files
        .get(path)
        .unwrap_or_else(|| panic!("{path} missing from archive: {:?}", files.keys().collect::<Vec<_>>()));
    String::from_utf8(data.clone()).expect("utf-8 entry")
}
