use std::sync::mpsc;

/* ============================ Progress events ============================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    ReadingConfig,
    BuildingTree,
    ScanningFolder,
    Done,
    Error,
}

/// One load-progress update. Consumers render events exactly as received;
/// ordering is part of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub folder: Option<String>,
    pub message: Option<String>,
    /// (current, total) folder counter while scanning.
    pub progress: Option<(usize, usize)>,
}

impl ProgressEvent {
    #[must_use]
    pub const fn phase(phase: ProgressPhase) -> Self {
        Self {
            phase,
            folder: None,
            message: None,
            progress: None,
        }
    }

    #[must_use]
    pub fn message(phase: ProgressPhase, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::phase(phase)
        }
    }

    #[must_use]
    pub fn folder(
        phase: ProgressPhase,
        folder: impl Into<String>,
        message: impl Into<String>,
        progress: Option<(usize, usize)>,
    ) -> Self {
        Self {
            phase,
            folder: Some(folder.into()),
            message: Some(message.into()),
            progress,
        }
    }
}

/* ============================= Progress sink =============================== */

/// Ordered sink for load progress. A thin wrapper over an mpsc sender: FIFO
/// delivery, clonable into probe worker threads, and silently a no-op once
/// the receiving side is gone (headless callers just drop the receiver).
#[derive(Debug, Clone)]
pub struct ProgressSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ProgressSink {
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// A sink with no listener. Useful for tests and fast paths.
    #[must_use]
    pub fn discard() -> Self {
        Self::channel().0
    }

    pub fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Empty the receiver without blocking and return what was queued.
#[must_use]
pub fn drain_progress(rx: &mpsc::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}
