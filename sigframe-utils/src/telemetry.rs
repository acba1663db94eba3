//! Scoped timing logs for the export path.
//!
//! A [`TimingGuard`] records when it was created and, if telemetry is switched on and the
//! `sigframe::telemetry` target is enabled at the requested level, logs the elapsed time
//! when dropped.

use std::{
    borrow::Cow,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use log::{Level, LevelFilter, log, log_enabled};

/// Log target every guard writes to.
pub const TARGET: &str = "sigframe::telemetry";

static ENABLED: AtomicBool = AtomicBool::new(false);
static MAX_LEVEL: AtomicUsize = AtomicUsize::new(0);

/// Logs the elapsed time of a scope on drop.
pub struct TimingGuard {
    label: Cow<'static, str>,
    level: Level,
    start: Instant,
    active: bool,
}

impl TimingGuard {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Consume the guard without logging.
    pub fn finish(mut self) -> Duration {
        self.active = false;
        self.start.elapsed()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.active {
            log!(
                target: TARGET,
                self.level,
                "{} completed in {:.2?}",
                self.label,
                self.start.elapsed()
            );
        }
    }
}

/// Guard that is active whenever telemetry allows `level`.
pub fn timing_guard(label: impl Into<Cow<'static, str>>, level: Level) -> TimingGuard {
    timing_guard_if(label, level, true)
}

/// Guard that additionally requires `enabled`.
pub fn timing_guard_if(
    label: impl Into<Cow<'static, str>>,
    level: Level,
    enabled: bool,
) -> TimingGuard {
    TimingGuard {
        label: label.into(),
        level,
        start: Instant::now(),
        active: enabled && telemetry_allows(level) && log_enabled!(target: TARGET, level),
    }
}

/// Update the global telemetry switch and threshold.
pub fn configure(enabled: bool, level: LevelFilter) {
    ENABLED.store(enabled, Ordering::Relaxed);
    // `LevelFilter` orders Off < Error < ... < Trace, matching `as usize`.
    MAX_LEVEL.store(level as usize, Ordering::Relaxed);
}

pub fn telemetry_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// `true` when telemetry is on and `level` is within the configured threshold.
pub fn telemetry_allows(level: Level) -> bool {
    telemetry_enabled() && (level as usize) <= MAX_LEVEL.load(Ordering::Relaxed)
}
