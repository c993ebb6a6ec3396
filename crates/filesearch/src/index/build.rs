//! Index build state and progress tracking.

use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Index build state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[repr(u8)]
pub enum IndexBuildState {
    /// No catalogue has been built or loaded.
    Idle = 0,
    Building = 1,
    Ready = 2,
}

impl IndexBuildState {
    /// Loads the state from an atomic.
    pub fn load(atomic: &AtomicU8) -> Self {
        Self::from_u8(atomic.load(Ordering::Acquire))
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Building,
            2 => Self::Ready,
            _ => Self::Idle,
        }
    }

    /// Returns the state as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Building => "building",
            Self::Ready => "ready",
        }
    }
}

/// Exclusive right to run a build, obtained by moving the state to `Building`.
///
/// Dropping the lease without calling [`BuildLease::finish`] restores the
/// state the engine had before the build started.
#[derive(Debug)]
pub struct BuildLease<'a> {
    state: &'a AtomicU8,
    previous: IndexBuildState,
    finished: bool,
}

impl<'a> BuildLease<'a> {
    /// Attempts to start a build. Returns `None` if one is already running.
    pub fn acquire(state: &'a AtomicU8) -> Option<Self> {
        let mut current = state.load(Ordering::Acquire);
        loop {
            if current == IndexBuildState::Building as u8 {
                return None;
            }
            match state.compare_exchange(
                current,
                IndexBuildState::Building as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(Self {
                        state,
                        previous: IndexBuildState::from_u8(current),
                        finished: false,
                    })
                }
                Err(observed) => current = observed,
            }
        }
    }

    /// Ends the build, leaving the engine in `next`.
    pub fn finish(mut self, next: IndexBuildState) {
        self.state.store(next as u8, Ordering::Release);
        self.finished = true;
    }
}

impl Drop for BuildLease<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.store(self.previous as u8, Ordering::Release);
        }
    }
}

/// Progress tracking for index building.
#[derive(Debug, Default)]
pub struct IndexBuildProgress {
    pub scanned_files: AtomicUsize,
    pub scanned_dirs: AtomicUsize,
    pub errors: AtomicUsize,
    pub started_at: AtomicU64,
    pub finished_at: AtomicU64,
}

impl IndexBuildProgress {
    /// Resets progress for a new build.
    pub fn reset_for_build(&self, started_at: u64) {
        self.scanned_files.store(0, Ordering::Relaxed);
        self.scanned_dirs.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.started_at.store(started_at, Ordering::Relaxed);
        self.finished_at.store(0, Ordering::Relaxed);
    }

    /// Zeroes every counter and timestamp.
    pub fn reset(&self) {
        self.reset_for_build(0);
    }

    pub fn record_file(&self) {
        self.scanned_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dir(&self) {
        self.scanned_dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a snapshot of the progress values.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            scanned_files: self.scanned_files.load(Ordering::Relaxed),
            scanned_dirs: self.scanned_dirs.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            started_at: zero_to_none(self.started_at.load(Ordering::Relaxed)),
            finished_at: zero_to_none(self.finished_at.load(Ordering::Relaxed)),
        }
    }
}

/// A snapshot of build progress values.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub scanned_files: usize,
    pub scanned_dirs: usize,
    pub errors: usize,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

/// Returns the current Unix timestamp in seconds.
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

/// Converts 0 to None for optional timestamps.
pub fn zero_to_none(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
