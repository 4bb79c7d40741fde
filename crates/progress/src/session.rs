//! Per-transfer progress state and edit throttling

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of instantaneous speed samples averaged into the reported speed
pub const SPEED_WINDOW: usize = 10;

/// Default minimum spacing between two speed samples
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Default minimum spacing between two status message edits
pub const DEFAULT_UI_THROTTLE: Duration = Duration::from_secs(1);

/// Which way the bytes are flowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    /// Header used in rendered status text
    pub fn label(self) -> &'static str {
        match self {
            Direction::Download => "📥 Downloading",
            Direction::Upload => "📤 Uploading",
        }
    }
}

/// Timing policy shared by all sessions of a bot instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPolicy {
    /// Samples closer together than this produce no new speed reading
    pub min_sample_interval: Duration,
    /// Minimum time between two status message edits
    pub ui_throttle: Duration,
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self {
            min_sample_interval: DEFAULT_SAMPLE_INTERVAL,
            ui_throttle: DEFAULT_UI_THROTTLE,
        }
    }
}

/// Point-in-time view of a transfer
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub direction: Direction,
    pub transferred_bytes: u64,
    pub total_bytes: u64,
    /// 0.0 to 100.0, always 0.0 when the total is unknown
    pub percentage: f64,
    /// Mean of the recent instantaneous speeds, bytes per second
    pub average_speed: f64,
    /// `None` when no positive speed has been observed or the total is unknown
    pub eta: Option<Duration>,
    pub elapsed: Duration,
}

/// Progress state of a single download or upload.
///
/// A session is owned by exactly one task and is dropped when the transfer
/// ends. Byte counts are cumulative; a count lower than one already seen is
/// clamped so the reported progress never moves backwards.
#[derive(Debug, Clone)]
pub struct TransferSession {
    direction: Direction,
    total_bytes: u64,
    transferred_bytes: u64,
    start_time: Instant,
    recent_samples: VecDeque<(Instant, f64)>,
    last_sample_time: Instant,
    last_sample_bytes: u64,
    last_ui_push: Option<Instant>,
    policy: ProgressPolicy,
}

impl TransferSession {
    /// Start tracking a transfer of `total_bytes` with the default policy
    pub fn new(total_bytes: u64, direction: Direction) -> Self {
        Self::with_policy(total_bytes, direction, ProgressPolicy::default())
    }

    pub fn with_policy(total_bytes: u64, direction: Direction, policy: ProgressPolicy) -> Self {
        Self::starting_at(total_bytes, direction, policy, Instant::now())
    }

    /// Start tracking with an explicit start instant
    pub fn starting_at(
        total_bytes: u64,
        direction: Direction,
        policy: ProgressPolicy,
        start: Instant,
    ) -> Self {
        Self {
            direction,
            total_bytes,
            transferred_bytes: 0,
            start_time: start,
            recent_samples: VecDeque::with_capacity(SPEED_WINDOW),
            last_sample_time: start,
            last_sample_bytes: 0,
            last_ui_push: None,
            policy,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Number of speed samples currently averaged
    pub fn sample_count(&self) -> usize {
        self.recent_samples.len()
    }

    /// True once a known, non-zero total has been fully transferred
    pub fn is_complete(&self) -> bool {
        self.total_bytes > 0 && self.transferred_bytes == self.total_bytes
    }

    /// Record a cumulative byte count observed now
    pub fn record_sample(&mut self, transferred_bytes: u64) -> Option<Metrics> {
        self.record_sample_at(transferred_bytes, Instant::now())
    }

    /// Record a cumulative byte count observed at `now`.
    ///
    /// Returns `None` when the previous sample is less than the minimum
    /// sampling interval old; the byte count is still remembered so the
    /// next snapshot reflects it.
    pub fn record_sample_at(&mut self, transferred_bytes: u64, now: Instant) -> Option<Metrics> {
        self.transferred_bytes = self.clamp(transferred_bytes);

        let elapsed = now.saturating_duration_since(self.last_sample_time);
        if elapsed.is_zero() || elapsed < self.policy.min_sample_interval {
            return None;
        }

        let delta = self.transferred_bytes.saturating_sub(self.last_sample_bytes);
        let instant_speed = delta as f64 / elapsed.as_secs_f64();

        if self.recent_samples.len() >= SPEED_WINDOW {
            self.recent_samples.pop_front();
        }
        self.recent_samples.push_back((now, instant_speed));

        self.last_sample_bytes = self.transferred_bytes;
        self.last_sample_time = now;

        Some(self.snapshot_at(now))
    }

    /// Metrics from the current state without taking a new speed sample
    pub fn snapshot(&self) -> Metrics {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, now: Instant) -> Metrics {
        let percentage = if self.total_bytes > 0 {
            self.transferred_bytes as f64 * 100.0 / self.total_bytes as f64
        } else {
            0.0
        };

        let average_speed = self.average_speed();
        let eta = if self.total_bytes > 0 && average_speed > 0.0 {
            let remaining = self.total_bytes.saturating_sub(self.transferred_bytes);
            Duration::try_from_secs_f64(remaining as f64 / average_speed).ok()
        } else {
            None
        };

        Metrics {
            direction: self.direction,
            transferred_bytes: self.transferred_bytes,
            total_bytes: self.total_bytes,
            percentage,
            average_speed,
            eta,
            elapsed: now.saturating_duration_since(self.start_time),
        }
    }

    /// Whether a status edit may be issued now.
    ///
    /// The completion update is always allowed. This never moves the throttle
    /// clock; call [`mark_pushed`](Self::mark_pushed) after a successful edit.
    pub fn should_push_update(&self, now: Instant) -> bool {
        if self.is_complete() {
            return true;
        }

        match self.last_ui_push {
            Some(last) => now.saturating_duration_since(last) >= self.policy.ui_throttle,
            None => true,
        }
    }

    /// Reset the throttle clock after a status edit went through
    pub fn mark_pushed(&mut self, now: Instant) {
        self.last_ui_push = Some(now);
    }

    fn average_speed(&self) -> f64 {
        if self.recent_samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.recent_samples.iter().map(|(_, speed)| speed).sum();
        sum / self.recent_samples.len() as f64
    }

    fn clamp(&self, transferred_bytes: u64) -> u64 {
        let bytes = transferred_bytes.max(self.transferred_bytes);
        if self.total_bytes > 0 {
            bytes.min(self.total_bytes)
        } else {
            bytes
        }
    }
}
