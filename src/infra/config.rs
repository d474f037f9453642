use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, ConfigFormat, InitArgs};
use crate::core::directive::Modification;
use crate::core::version::VersionFormat;

/// Config file looked up when none is given; never packaged.
pub const DEFAULT_CONFIG_FILE: &str = "add-on-releaser-config.json";

/// Environment overrides, e.g. `ADDON_RELEASER_DESTINATION=out`
const ENV_PREFIX: &str = "ADDON_RELEASER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config
{
    /// Working directory for pack and source paths (default: invocation dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Output directory, relative to `cwd`
    #[serde(default = "default_destination")]
    pub destination: PathBuf,

    /// One `.mcaddon` for all packs, or one `.mcpack` per pack
    #[serde(default)]
    pub file_type: FileType,

    /// Canonical version representation for rewritten manifests
    #[serde(default)]
    pub release_version_format: VersionFormat,

    /// `.mcaddon` file name template; `${version}` is substituted
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// How the version in output file names is chosen and rendered
    #[serde(default)]
    pub file_name_version: FileNameVersion,

    pub packs: Vec<Pack>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType
{
    #[default]
    #[serde(alias = "single-archive")]
    Mcaddon,
    #[serde(alias = "one-file-per-pack")]
    Mcpack,
}

impl FileType
{
    pub fn extension(self) -> &'static str
    {
        match self
        {
            FileType::Mcaddon => "mcaddon",
            FileType::Mcpack => "mcpack",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileNameVersion
{
    #[serde(default)]
    pub format: FileNameVersionFormat,

    /// UUID of the pack whose version names the `.mcaddon` (default: first pack)
    #[serde(default, alias = "sourcePack", skip_serializing_if = "Option::is_none")]
    pub source_pack: Option<String>,

    /// Registered callback used when `format = "custom"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNameVersionFormat
{
    /// `1-2-3`
    #[default]
    Dashed,
    /// As held by the manifest (`1.2.3`)
    Current,
    /// Rendered by a registered callback
    #[serde(alias = "custom-callback")]
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack
{
    /// Pack folder, relative to `cwd`
    pub path: PathBuf,

    /// Folder name inside the `.mcaddon`, or `.mcpack` file name template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,

    #[serde(default)]
    pub modifications: Vec<Modification>,
}

impl Pack
{
    /// Final component of the pack folder path
    pub fn folder_name(&self) -> String
    {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

fn default_destination() -> PathBuf
{
    PathBuf::from("dist")
}

fn default_file_name() -> String
{
    "addon-v${version}".to_string()
}

impl Config
{
    /// Resolve `cwd` against the directory the tool was invoked from.
    pub fn working_dir(
        &self,
        invocation_dir: &Path,
    ) -> PathBuf
    {
        match &self.cwd
        {
            Some(cwd) => invocation_dir.join(cwd),
            None => invocation_dir.to_path_buf(),
        }
    }

    /// Starter configuration written by `init`
    pub fn starter() -> Self
    {
        Self {
            cwd: None,
            destination: default_destination(),
            file_type: FileType::Mcaddon,
            release_version_format: VersionFormat::Tuple,
            file_name: "my-addon-v${version}".to_string(),
            file_name_version: FileNameVersion::default(),
            packs: vec![
                Pack {
                    path: PathBuf::from("BP"),
                    release_name: None,
                    modifications: vec![Modification::DeleteFiles {
                        targets: vec!["**/*.log".to_string()],
                    }],
                },
                Pack {
                    path: PathBuf::from("RP"),
                    release_name: None,
                    modifications: Vec::new(),
                },
            ],
        }
    }
}

/// Load a config file (JSON, JSON5, TOML or YAML by extension) with
/// `ADDON_RELEASER_*` environment overrides layered on top.
pub fn load_config(path: &Path) -> Result<Config>
{
    if !path.is_file()
    {
        anyhow::bail!("Could not find configuration file \"{}\".", path.display());
    }

    let mut file = config::File::from(path).required(true);
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        // Hand-written .json configs may carry comments
        file = file.format(config::FileFormat::Json5);
    }

    let cfg = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let file_name = match args.format
    {
        ConfigFormat::Json => DEFAULT_CONFIG_FILE.to_string(),
        ConfigFormat::Toml => DEFAULT_CONFIG_FILE.replace(".json", ".toml"),
    };
    let config_path = args
        .path
        .join(file_name);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::starter();
    let text = match args.format
    {
        ConfigFormat::Json => serde_json::to_string_pretty(&config).context("Failed to serialize default config")?,
        ConfigFormat::Toml => toml::to_string_pretty(&config).context("Failed to serialize default config")?,
    };

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("Would create config file at {}", config_path.display());
        }
        return Ok(());
    }

    std::fs::write(&config_path, text).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
