use std::{fs, path::Path, sync::mpsc, thread, time::Duration};

use crate::core::{ProgressEvent, ProgressPhase, ProgressSink};

/* ============================= Bounded probe =============================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ok,
    Timeout,
    Inaccessible,
}

/// Per-folder accessibility budget.
pub const DEFAULT_FOLDER_ACCESS_TIMEOUT: Duration = Duration::from_millis(3000);

/// Check whether `path` is an accessible folder, waiting at most `timeout`.
///
/// The actual filesystem check runs on a worker thread; the caller races the
/// worker's result channel against the budget. When the timer wins the worker
/// is abandoned, not joined — its late result is dropped with the channel, so
/// an unresponsive network mount can never block the caller past the budget.
#[must_use]
pub fn probe_folder(path: &str, timeout: Duration, progress: &ProgressSink) -> ProbeOutcome {
    let target = path.to_string();
    probe_with(path, timeout, progress, move || check_access(&target))
}

/// Same as [`probe_folder`], with the check injected. Lets callers (and
/// tests) substitute a check that hangs or fails on demand.
#[must_use]
pub fn probe_with(
    path: &str,
    timeout: Duration,
    progress: &ProgressSink,
    check: impl FnOnce() -> bool + Send + 'static,
) -> ProbeOutcome {
    progress.send(ProgressEvent::folder(
        ProgressPhase::ScanningFolder,
        path,
        format!("Checking access: {path}"),
        None,
    ));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(check());
    });

    let outcome = match rx.recv_timeout(timeout) {
        Ok(true) => ProbeOutcome::Ok,
        Ok(false) => ProbeOutcome::Inaccessible,
        Err(mpsc::RecvTimeoutError::Timeout) => ProbeOutcome::Timeout,
        // Worker died without answering; treat it like a failed check.
        Err(mpsc::RecvTimeoutError::Disconnected) => ProbeOutcome::Inaccessible,
    };

    let message = match outcome {
        ProbeOutcome::Ok => format!("Access ok: {path}"),
        ProbeOutcome::Timeout => format!("Access timed out: {path}"),
        ProbeOutcome::Inaccessible => format!("Not accessible: {path}"),
    };
    progress.send(ProgressEvent::folder(
        ProgressPhase::ScanningFolder,
        path,
        message,
        None,
    ));

    outcome
}

/// The underlying check: the path must be a readable directory. A handful of
/// entries are touched so an unreadable share fails here rather than later
/// during the tree scan. Errors of any kind count as inaccessible.
fn check_access(path: &str) -> bool {
    let p = Path::new(path);
    if !p.is_dir() {
        return false;
    }

    match fs::read_dir(p) {
        Ok(entries) => {
            for ent in entries.take(5) {
                if ent.is_err() {
                    return false;
                }
            }
            true
        }
        Err(_) => false,
    }
}
