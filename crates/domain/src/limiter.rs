//! Fixed-window request ceiling shared by callers of one provider

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);

/// Per-minute and per-hour request limiter. A limit of `None` is unbounded.
#[derive(Debug)]
pub struct RateLimiter {
    per_minute: Option<u32>,
    per_hour: Option<u32>,
    windows: Mutex<Windows>,
}

#[derive(Debug)]
struct Windows {
    minute_start: Instant,
    hour_start: Instant,
    minute_count: u32,
    hour_count: u32,
}

impl Windows {
    fn roll(&mut self, now: Instant) {
        if now.duration_since(self.minute_start) >= MINUTE {
            self.minute_start = now;
            self.minute_count = 0;
        }
        if now.duration_since(self.hour_start) >= HOUR {
            self.hour_start = now;
            self.hour_count = 0;
        }
    }
}

fn wait_for_window(limit: Option<u32>, count: u32, start: Instant, length: Duration, now: Instant) -> Duration {
    match limit {
        Some(limit) if count >= limit => length.saturating_sub(now.duration_since(start)),
        _ => Duration::ZERO,
    }
}

impl RateLimiter {
    pub fn new(per_minute: Option<u32>, per_hour: Option<u32>) -> Self {
        let now = Instant::now();
        Self {
            per_minute: per_minute.filter(|n| *n > 0),
            per_hour: per_hour.filter(|n| *n > 0),
            windows: Mutex::new(Windows {
                minute_start: now,
                hour_start: now,
                minute_count: 0,
                hour_count: 0,
            }),
        }
    }

    /// Build a limiter only when at least one ceiling is set; zero disables
    pub fn from_limits(per_minute: u32, per_hour: u32) -> Option<Self> {
        if per_minute == 0 && per_hour == 0 {
            None
        } else {
            Some(Self::new(Some(per_minute), Some(per_hour)))
        }
    }

    /// Wait until both windows have room, then take one slot
    pub async fn acquire(&self) {
        if self.per_minute.is_none() && self.per_hour.is_none() {
            return;
        }

        loop {
            let mut windows = self.windows.lock().await;
            let now = Instant::now();
            windows.roll(now);

            let wait = wait_for_window(
                self.per_minute,
                windows.minute_count,
                windows.minute_start,
                MINUTE,
                now,
            )
            .max(wait_for_window(
                self.per_hour,
                windows.hour_count,
                windows.hour_start,
                HOUR,
                now,
            ));

            if wait.is_zero() {
                windows.minute_count = windows.minute_count.saturating_add(1);
                windows.hour_count = windows.hour_count.saturating_add(1);
                return;
            }

            drop(windows);
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
            sleep(wait).await;
        }
    }
}
