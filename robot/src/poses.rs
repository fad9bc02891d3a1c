use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sorter::{Pose, PoseKey};

pub const STORE_VERSION: u32 = 1;

/// Named arm poses, persisted as TOML.
///
/// `revision` goes up with every change so that a saved file can be told
/// apart from the one it replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStore {
    pub version: u32,
    pub revision: u64,
    poses: BTreeMap<String, Pose>,
}

impl Default for PoseStore {
    fn default() -> Self {
        let poses = [
            (PoseKey::View, Pose::new(0.351, 0.077, 0.219, 2.663, 1.049, 2.522)),
            (PoseKey::WeightDrop, Pose::new(0.122, -0.159, 0.106, -1.028, 1.551, -2.579)),
            (PoseKey::Pick, Pose::new(0.378, 0.128, 0.151, -2.679, 1.554, -2.743)),
            (PoseKey::Lift, Pose::new(0.174, 0.009, 0.223, -0.194, 0.897, -0.236)),
            (PoseKey::Lift2, Pose::new(0.137, -0.072, 0.153, -0.643, 1.230, -1.119)),
            (PoseKey::AlkalineDrop, Pose::new(0.351, -0.124, 0.151, -1.326, 1.431, -1.440)),
            (PoseKey::NimhDrop, Pose::new(0.238, -0.117, 0.127, -1.161, 1.429, -1.255)),
            (PoseKey::ZincDrop, Pose::new(0.284, 0.026, 0.132, -0.630, 1.061, -0.431)),
            (PoseKey::LithiumDrop, Pose::new(0.189, 0.024, 0.120, -0.715, 1.303, -0.750)),
            (PoseKey::UnknownDrop, Pose::new(0.443, -0.135, 0.166, -0.180, 1.354, -0.315)),
        ];

        Self {
            version: STORE_VERSION,
            revision: 0,
            poses: poses.into_iter().map(|(k, p)| (k.as_str().to_string(), p)).collect(),
        }
    }
}

impl PoseStore {
    /// Load the store at `path`, or the factory poses if there is no file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("No pose file at {}, using factory poses", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let store: PoseStore = toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
        store.validate()?;
        log::debug!("Loaded {} poses (revision {}) from {}", store.poses.len(), store.revision, path.display());

        Ok(store)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version != STORE_VERSION {
            bail!("Unsupported pose file version {} (expected {STORE_VERSION})", self.version);
        }
        for name in self.poses.keys() {
            name.parse::<PoseKey>()?;
        }

        Ok(())
    }

    /// Write to a sibling temp file first so a crash never leaves a torn file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let text = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, text).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }

    pub fn get(&self, key: PoseKey) -> Option<Pose> {
        self.poses.get(key.as_str()).copied()
    }

    pub fn set(&mut self, key: PoseKey, pose: Pose) {
        self.poses.insert(key.as_str().to_string(), pose);
        self.revision += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoseKey, Pose)> + '_ {
        PoseKey::ALL.into_iter().filter_map(|key| self.get(key).map(|pose| (key, pose)))
    }
}
