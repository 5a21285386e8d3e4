use std::path::Path;

use crate::core::{Profile, StoreError, load_profile};

/* =========================== Fallback selection ============================ */

/// Pick a replacement for a profile that failed or timed out during load.
///
/// Known-good profiles (last attempt completed with no folder warnings) are
/// preferred, most recently completed first; ties break on name so the
/// choice is deterministic. The failed profile itself is never returned.
/// With no candidate, the built-in default wins — it has no folders to
/// probe, so loading it cannot hang.
#[must_use]
pub fn select_fallback(failed_name: &str, profiles: &[Profile]) -> Profile {
    let mut best: Option<&Profile> = None;

    for candidate in profiles {
        if candidate.name == failed_name || !candidate.known_good {
            continue;
        }
        let better = match best {
            None => true,
            Some(current) => match (candidate.last_completed, current.last_completed) {
                (Some(a), Some(b)) => a > b || (a == b && candidate.name < current.name),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => candidate.name < current.name,
            },
        };
        if better {
            best = Some(candidate);
        }
    }

    best.cloned().unwrap_or_else(Profile::builtin_default)
}

/// The original profile, unchanged, so the caller can re-attempt the load
/// with the same parameters after a fallback.
pub fn retry_original(store_root: &Path, failed_name: &str) -> Result<Profile, StoreError> {
    load_profile(store_root, failed_name)
}
