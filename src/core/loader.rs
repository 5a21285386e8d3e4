use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};

use crate::core::{
    AccessState, CachedAccess, DEFAULT_FOLDER_ACCESS_TIMEOUT, DEFAULT_PATH_LENGTH_LIMIT, PathClass,
    ProbeOutcome, Profile, ProgressEvent, ProgressPhase, ProgressSink, RootFolder, classify_path,
    is_risky, list_profiles, load_profile, probe_folder, save_last_used, save_profile,
    select_fallback,
};

/* ============================ Load configuration =========================== */

/// Overall budget for loading one profile's folders.
pub const DEFAULT_FOLDER_LOADING_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Timeouts and risk thresholds, passed in explicitly so tests can pick
/// arbitrary values without touching shared state.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub overall_timeout: Duration,
    pub folder_timeout: Duration,
    pub path_length_limit: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            overall_timeout: DEFAULT_FOLDER_LOADING_TIMEOUT,
            folder_timeout: DEFAULT_FOLDER_ACCESS_TIMEOUT,
            path_length_limit: DEFAULT_PATH_LENGTH_LIMIT,
        }
    }
}

/// Asynchronous skip/cancel flags shared between the UI and the loader.
/// Observed between folder probes, so worst-case reaction latency is one
/// folder's probe budget.
#[derive(Debug, Clone, Default)]
pub struct LoadSignals {
    skip: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
}

impl LoadSignals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_skip(&self) {
        self.skip.store(true, Ordering::Relaxed);
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn skip_requested(&self) -> bool {
        self.skip.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}

/* ============================== Load attempt =============================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Completed,
    TimedOut,
    Skipped,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderResult {
    pub path: String,
    pub class: PathClass,
    pub access: AccessState,
}

/// Transient record of one load attempt. Discarded after resolution; the
/// durable part (per-folder access cache, known-good flag) is written back
/// into the profile.
#[derive(Debug, Clone)]
pub struct LoadAttempt {
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub folders: Vec<FolderResult>,
    pub outcome: LoadOutcome,
}

impl LoadAttempt {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.folders.iter().any(|f| f.access.is_warning())
    }

    #[must_use]
    pub fn is_known_good(&self) -> bool {
        self.outcome == LoadOutcome::Completed && !self.has_warnings()
    }
}

/* ============================== Orchestrator =============================== */

/// Walk the profile's root folders, probing risky ones under the configured
/// budgets, and write the results back into the profile's access cache.
///
/// Network-related failures never escape: a folder that times out or can't
/// be read is recorded as a warning and the walk continues. Only the four
/// terminal outcomes exit.
pub fn load_profile_folders(
    profile: &mut Profile,
    cfg: &LoadConfig,
    signals: &LoadSignals,
    progress: &ProgressSink,
) -> LoadAttempt {
    load_with_prober(profile, cfg, signals, progress, |rf, budget, sink| {
        probe_folder(&rf.path, budget, sink)
    })
}

/// [`load_profile_folders`] with the probe injected, so tests can simulate
/// slow or hanging folders without a real network mount.
pub fn load_with_prober(
    profile: &mut Profile,
    cfg: &LoadConfig,
    signals: &LoadSignals,
    progress: &ProgressSink,
    mut prober: impl FnMut(&RootFolder, Duration, &ProgressSink) -> ProbeOutcome,
) -> LoadAttempt {
    let started_at = Utc::now();
    let started = Instant::now();

    progress.send(ProgressEvent::message(
        ProgressPhase::ReadingConfig,
        format!("Loading profile '{}'", profile.name),
    ));
    progress.send(ProgressEvent::message(
        ProgressPhase::BuildingTree,
        "Building folder list",
    ));

    let folders = profile.root_folders.clone();
    let total = folders.len();
    let mut results: Vec<FolderResult> = Vec::with_capacity(total);
    let mut outcome = LoadOutcome::Completed;

    for (idx, folder) in folders.iter().enumerate() {
        if signals.cancel_requested() {
            outcome = LoadOutcome::Cancelled;
            break;
        }
        if signals.skip_requested() {
            outcome = LoadOutcome::Skipped;
            break;
        }
        if started.elapsed() >= cfg.overall_timeout {
            outcome = LoadOutcome::TimedOut;
            break;
        }

        progress.send(ProgressEvent::folder(
            ProgressPhase::ScanningFolder,
            folder.path.clone(),
            format!("Scanning folder {} of {total}", idx + 1),
            Some((idx + 1, total)),
        ));

        let class = classify_path(&folder.path, cfg.path_length_limit);
        let access = if is_risky(class) {
            // Clip the per-folder budget to what's left of the overall one.
            let remaining = cfg.overall_timeout.saturating_sub(started.elapsed());
            let budget = cfg.folder_timeout.min(remaining);
            match prober(folder, budget, progress) {
                ProbeOutcome::Ok => AccessState::Ok,
                ProbeOutcome::Timeout => AccessState::Timeout,
                ProbeOutcome::Inaccessible => AccessState::Inaccessible,
            }
        } else {
            // Fast path: the classifier already confirmed local existence.
            AccessState::Ok
        };

        results.push(FolderResult {
            path: folder.path.clone(),
            class,
            access,
        });
    }

    // Cache write-back happens only after the walk resolves, never mid-probe.
    let checked_at = Utc::now();
    for (rf, res) in profile.root_folders.iter_mut().zip(&results) {
        rf.class = res.class;
        rf.access = CachedAccess {
            state: res.access,
            checked_at: Some(checked_at),
        };
    }

    let summary = match outcome {
        LoadOutcome::Completed => format!("Profile '{}' loaded", profile.name),
        LoadOutcome::TimedOut => format!("Profile '{}' timed out while loading", profile.name),
        LoadOutcome::Skipped => format!("Profile '{}' skipped", profile.name),
        LoadOutcome::Cancelled => format!("Profile '{}' load cancelled", profile.name),
    };
    progress.send(ProgressEvent::message(ProgressPhase::Done, summary));

    LoadAttempt {
        profile: profile.name.clone(),
        started_at,
        folders: results,
        outcome,
    }
}

/* ============================= Startup driver ============================== */

#[derive(Debug, Clone)]
pub struct StartupOutcome {
    /// The profile actually in effect after startup.
    pub profile: Profile,
    /// The attempt that produced `profile`.
    pub attempt: LoadAttempt,
    /// Set when `profile` is not the one that was requested.
    pub fell_back_from: Option<String>,
    /// The requested profile's attempt, when it failed and a fallback ran.
    pub failed_attempt: Option<LoadAttempt>,
}

/// Load `requested` from the store and resolve it to a usable profile.
///
/// Never returns an error: a corrupt or missing store degrades to the
/// built-in default with an `Error` progress event, a timed-out or skipped
/// load consults the fallback selector, and a cancel jumps straight to the
/// default. The requested profile's access cache and known-good flag are
/// persisted in every terminal case.
pub fn run_startup(
    store_root: &Path,
    requested: &str,
    cfg: &LoadConfig,
    signals: &LoadSignals,
    progress: &ProgressSink,
) -> StartupOutcome {
    let mut profile = match load_profile(store_root, requested) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("profile '{requested}' unavailable: {e}");
            progress.send(ProgressEvent::message(
                ProgressPhase::Error,
                format!("Failed to read profile '{requested}': {e}"),
            ));
            let mut fallback = Profile::builtin_default();
            let attempt = load_profile_folders(&mut fallback, cfg, &LoadSignals::new(), progress);
            return StartupOutcome {
                profile: fallback,
                attempt,
                fell_back_from: Some(requested.to_string()),
                failed_attempt: None,
            };
        }
    };

    let attempt = load_profile_folders(&mut profile, cfg, signals, progress);
    record_attempt(&mut profile, &attempt);
    if let Err(e) = save_profile(store_root, &profile) {
        log::warn!("failed to persist access cache for '{}': {e}", profile.name);
    }

    match attempt.outcome {
        LoadOutcome::Completed => {
            if let Err(e) = save_last_used(store_root, requested) {
                log::warn!("failed to record last-used profile: {e}");
            }
            StartupOutcome {
                profile,
                attempt,
                fell_back_from: None,
                failed_attempt: None,
            }
        }
        LoadOutcome::Cancelled => {
            // Cancel means "use the default", bypassing fallback scoring.
            let mut fallback = Profile::builtin_default();
            let fb_attempt = load_profile_folders(&mut fallback, cfg, &LoadSignals::new(), progress);
            StartupOutcome {
                profile: fallback,
                attempt: fb_attempt,
                fell_back_from: Some(requested.to_string()),
                failed_attempt: Some(attempt),
            }
        }
        LoadOutcome::TimedOut | LoadOutcome::Skipped => {
            let mut fallback = select_fallback(requested, &list_profiles(store_root));
            // Fresh signals: a skip aimed at the failed profile must not
            // cascade into the fallback load.
            let fb_attempt = load_profile_folders(&mut fallback, cfg, &LoadSignals::new(), progress);
            record_attempt(&mut fallback, &fb_attempt);
            if let Err(e) = save_profile(store_root, &fallback) {
                log::warn!(
                    "failed to persist access cache for '{}': {e}",
                    fallback.name
                );
            }
            StartupOutcome {
                profile: fallback,
                attempt: fb_attempt,
                fell_back_from: Some(requested.to_string()),
                failed_attempt: Some(attempt),
            }
        }
    }
}

fn record_attempt(profile: &mut Profile, attempt: &LoadAttempt) {
    profile.known_good = attempt.is_known_good();
    if attempt.outcome == LoadOutcome::Completed {
        profile.last_completed = Some(Utc::now());
    }
}
