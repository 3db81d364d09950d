//! Level packs described by a TOML manifest.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use iso_dimension_core::LevelConfig;
use iso_dimension_world::config::{
    level_config_stem, map_file_name, parse_level_config, CONFIG_EXTENSION,
};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    /// Number of levels laid out as `Levels/Level_N/Level_N_Config.isoconfig`.
    #[serde(default)]
    count: Option<u32>,
    #[serde(default)]
    levels: BTreeMap<String, PathBuf>,
}

/// Configuration and raw map of a single level.
#[derive(Clone, Debug)]
pub(crate) struct LevelSource {
    pub(crate) config: LevelConfig,
    pub(crate) raw_map: String,
}

/// Numbered levels resolved to their configuration files.
///
/// Map files named by a configuration are resolved against the pack root,
/// the directory containing the manifest.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LevelPack {
    root: PathBuf,
    levels: BTreeMap<u32, PathBuf>,
}

impl LevelPack {
    /// Reads the manifest at `path`, resolving entries relative to its directory.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read level manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&contents, &base)
    }

    fn parse(contents: &str, base_path: &Path) -> Result<Self> {
        let manifest: Manifest =
            toml::from_str(contents).context("failed to parse level manifest toml contents")?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            bail!(
                "unsupported level manifest version {}; expected {}",
                manifest.version,
                SUPPORTED_MANIFEST_VERSION
            );
        }

        let mut levels = BTreeMap::new();
        for number in 1..=manifest.count.unwrap_or(0) {
            let stem = level_config_stem(number);
            let _ = levels.insert(number, base_path.join(format!("{stem}.{CONFIG_EXTENSION}")));
        }
        for (name, relative_path) in manifest.levels {
            let number: u32 = name
                .parse()
                .with_context(|| format!("level key `{name}` is not a level number"))?;
            if number == 0 {
                bail!("level numbers start at 1");
            }
            if levels.insert(number, base_path.join(relative_path)).is_some() {
                bail!("level manifest contains duplicate entry for level {number}");
            }
        }

        if levels.is_empty() {
            bail!("level manifest does not list any levels");
        }
        Ok(Self {
            root: base_path.to_path_buf(),
            levels,
        })
    }

    /// Level numbers listed by the manifest in ascending order.
    pub(crate) fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    /// Loads the configuration and raw map of the numbered level.
    pub(crate) fn load_level(&self, number: u32) -> Result<LevelSource> {
        let Some(config_path) = self.levels.get(&number) else {
            bail!("level {number} is not part of the level pack");
        };
        let json = fs::read_to_string(config_path).with_context(|| {
            format!("failed to read level config at {}", config_path.display())
        })?;
        let config = parse_level_config(&json)
            .with_context(|| format!("invalid level config at {}", config_path.display()))?;

        let map_path = self.root.join(map_file_name(&config));
        let raw_map = fs::read_to_string(&map_path)
            .with_context(|| format!("failed to read level map at {}", map_path.display()))?;

        Ok(LevelSource { config, raw_map })
    }
}
