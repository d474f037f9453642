//! **addon-releaser** - Build Minecraft Bedrock `.mcaddon`/`.mcpack` release archives
//!
//! Pack folders are mirrored into an in-memory archive tree, manifests are
//! rewritten to a canonical version format, and declarative file
//! modifications are applied before the tree is zipped.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Release pipeline
pub mod core {
    /// Manifest version shapes and conversions
    pub mod version;

    /// Fatal release errors
    pub mod error;
    pub use error::{EntryKind, ReleaseError};

    /// Modification directives and their compiled matchers
    pub mod directive;
    pub use directive::{ConflictResolution, Modification, PackDirectives};

    /// Manifest model and rewriter
    pub mod manifest;
    pub use manifest::{Manifest, rewrite_manifest};

    /// Pack folder ingestion into the archive tree
    pub mod ingest;
    pub use ingest::ingest_folder;

    /// Tree directives (move, add, rename)
    pub mod engine;
    pub use engine::ModificationEngine;

    /// Whole-run orchestration and output
    pub mod release;
    pub use release::{ReleaseAssembler, VersionCallbacks, run as release_run};
}

/// Infrastructure - configuration, archive tree, filesystem and network
pub mod infra {
    /// Configuration model and loading
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// In-memory archive tree with zip export
    pub mod archive;
    pub use archive::{ArchiveTree, EntryId};

    /// Pack folder traversal
    pub mod walk;
    pub use walk::PackWalker;

    /// File reads, remote fetches and output writes
    pub mod io;
    pub use io::{Fetcher, HttpFetcher, StaticFetcher};

    /// Background update check
    pub mod update;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::{ReleaseAssembler, ReleaseError, VersionCallbacks, release_run};
pub use infra::{Config, Fetcher, load_config};
