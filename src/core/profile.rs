use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::PathClass;

/* ============================== Data model ================================= */

/// Cached accessibility of a root folder, as of the last load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AccessState {
    #[default]
    Untested,
    Ok,
    Timeout,
    Inaccessible,
}

impl AccessState {
    /// Timeout/inaccessible folders are kept in the profile and rendered
    /// with a warning indicator.
    #[must_use]
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Timeout | Self::Inaccessible)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CachedAccess {
    pub state: AccessState,
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
}

/// One root folder of a profile. `class` and `access` are written back by
/// the load orchestrator; the tree builder only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFolder {
    pub path: String,
    #[serde(default)]
    pub class: PathClass,
    #[serde(default)]
    pub access: CachedAccess,
}

impl RootFolder {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            class: PathClass::Unknown,
            access: CachedAccess::default(),
        }
    }
}

/// Explicit on/off check for one file or directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileSelection {
    /// Absolute path using forward slashes.
    pub path: String,
    pub state: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetaPrompt {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub root_folders: Vec<RootFolder>,
    #[serde(default)]
    pub selections: Vec<ProfileSelection>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub meta_prompts: Vec<MetaPrompt>,
    #[serde(default)]
    pub user_instructions: String,
    #[serde(default)]
    pub strip_comments: bool,
    /// Last attempt completed with no per-folder warnings. Consumed by the
    /// fallback selector.
    #[serde(default)]
    pub known_good: bool,
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
}

pub const DEFAULT_PROFILE_NAME: &str = "default";

impl Profile {
    /// The fixed, network-free profile shipped with the application. Loading
    /// it can never hang: there are no root folders to probe.
    #[must_use]
    pub fn builtin_default() -> Self {
        Self {
            name: DEFAULT_PROFILE_NAME.to_string(),
            ignore_patterns: default_ignore_patterns(),
            meta_prompts: vec![MetaPrompt {
                title: "Context".to_string(),
                text: "The file tree and file contents below come from my local \
                       project. Use them as the source of truth when answering."
                    .to_string(),
                enabled: true,
            }],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn warning_folders(&self) -> Vec<&RootFolder> {
        self.root_folders
            .iter()
            .filter(|rf| rf.access.state.is_warning())
            .collect()
    }
}

#[must_use]
pub fn default_ignore_patterns() -> Vec<String> {
    [
        ".git",
        ".idea",
        ".vscode",
        "node_modules",
        "target",
        "venv",
        ".venv",
        "__pycache__",
        "*.pyc",
        "*.lock",
        ".DS_Store",
        "Thumbs.db",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/* ============================= Store errors ================================ */

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile '{0}' not found")]
    NotFound(String),
    #[error("profile '{name}' is corrupt: {source}")]
    Corrupt {
        name: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/* ========================== Paths & store layout =========================== */

const PROFILES_DIR: &str = "profiles";
const LAST_PROFILE_FILE: &str = "last_profile.txt";

#[must_use]
pub fn profiles_dir(store_root: &Path) -> PathBuf {
    store_root.join(PROFILES_DIR)
}

fn last_profile_file(store_root: &Path) -> PathBuf {
    store_root.join(LAST_PROFILE_FILE)
}

pub fn ensure_store_dirs(store_root: &Path) -> io::Result<()> {
    fs::create_dir_all(profiles_dir(store_root))
}

fn sanitize_profile_name(name: &str) -> String {
    // keep it simple & predictable for file names
    let mut s = name.trim().to_string();
    if s.is_empty() {
        s.push_str("unnamed");
    }
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn profile_path(store_root: &Path, name: &str) -> PathBuf {
    profiles_dir(store_root).join(format!("{}.json", sanitize_profile_name(name)))
}

/* =============================== Profile IO ================================ */

pub fn save_profile(store_root: &Path, profile: &Profile) -> io::Result<()> {
    ensure_store_dirs(store_root)?;
    let path = profile_path(store_root, &profile.name);
    let tmp = path.with_extension("tmp");
    let data = serde_json::to_vec_pretty(profile).map_err(|e| io::Error::other(e.to_string()))?;
    fs::write(&tmp, data)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Load a profile by name. A missing `default` resolves to the built-in
/// profile; anything else missing is `NotFound`, and unparsable JSON is
/// `Corrupt` so callers can tell a broken store from an absent one.
pub fn load_profile(store_root: &Path, name: &str) -> Result<Profile, StoreError> {
    let path = profile_path(store_root, name);
    let bytes = match fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if name == DEFAULT_PROFILE_NAME {
                return Ok(Profile::builtin_default());
            }
            return Err(StoreError::NotFound(name.to_string()));
        }
        Err(e) => return Err(StoreError::Io(e)),
    };

    serde_json::from_slice::<Profile>(&bytes).map_err(|source| StoreError::Corrupt {
        name: name.to_string(),
        source,
    })
}

pub fn delete_profile(store_root: &Path, name: &str) -> io::Result<()> {
    let path = profile_path(store_root, name);
    if path.exists() {
        // Best effort delete; ignore if it fails
        let _ = fs::remove_file(&path);
    }
    Ok(())
}

/// All parseable profiles in the store, sorted by name. Corrupt files are
/// skipped with a warning so one bad profile can't break enumeration.
#[must_use]
pub fn list_profiles(store_root: &Path) -> Vec<Profile> {
    let mut out = Vec::new();

    if let Ok(rd) = fs::read_dir(profiles_dir(store_root)) {
        for ent in rd.flatten() {
            let path = ent.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read(&path)
                .ok()
                .map(|bytes| serde_json::from_slice::<Profile>(&bytes))
            {
                Some(Ok(p)) if !p.name.trim().is_empty() => out.push(p),
                Some(Err(e)) => {
                    log::warn!("skipping corrupt profile {}: {e}", path.display());
                }
                _ => {}
            }
        }
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

/* ============================ Last-used marker ============================= */

/// The last selected profile, if the marker points at one that still exists.
#[must_use]
pub fn last_used_profile(store_root: &Path) -> Option<String> {
    let name = fs::read_to_string(last_profile_file(store_root)).ok()?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return None;
    }

    if name == DEFAULT_PROFILE_NAME || profile_path(store_root, &name).exists() {
        Some(name)
    } else {
        None
    }
}

pub fn save_last_used(store_root: &Path, name: &str) -> io::Result<()> {
    fs::create_dir_all(store_root)?;
    fs::write(last_profile_file(store_root), name)
}
