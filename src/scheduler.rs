//! Redelivery schedule and background loop.
//!
//! Defines the [`Schedule`] enum for timing and [`DeliveryScheduler`], the
//! tokio task that re-sends the file to the active chat each time the
//! schedule fires. Fires are anchored to loop start (`Interval`) or to the
//! UTC clock (`Daily`); a fire that lands while a delivery is still running
//! is skipped, never replayed.

use crate::delivery::Courier;
use crate::destination::DestinationSlot;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// How often the file is re-delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    /// Deliver every N seconds.
    Interval {
        /// Interval in seconds between deliveries.
        secs: u64,
    },
    /// Deliver once daily at a given hour and minute (UTC).
    Daily {
        /// Hour of day (0-23, UTC).
        hour: u8,
        /// Minute of hour (0-59).
        min: u8,
    },
}

impl Default for Schedule {
    /// One delivery per day.
    fn default() -> Self {
        Self::Interval { secs: 86_400 }
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval { secs } => {
                if *secs >= 3600 {
                    write!(f, "every {} hours", secs / 3600)
                } else {
                    write!(f, "every {} minutes", secs / 60)
                }
            }
            Self::Daily { hour, min } => write!(f, "daily at {hour:02}:{min:02} UTC"),
        }
    }
}

impl Schedule {
    /// Seconds from `now` until the next fire.
    ///
    /// `Interval` fires at `started_at + k * secs`; periods that elapsed
    /// entirely (a delivery overran, the host slept) collapse into the next
    /// future fire.
    fn secs_until_next(&self, started_at: u64, now: u64) -> u64 {
        match self {
            Self::Interval { secs } => {
                let secs = (*secs).max(1);
                let elapsed = now.saturating_sub(started_at);
                secs - (elapsed % secs)
            }
            Self::Daily { hour, min } => {
                let day_secs = u64::from(*hour) * 3600 + u64::from(*min) * 60;
                let today_start = now - (now % 86_400);
                let scheduled = today_start + day_secs;
                if scheduled > now {
                    scheduled - now
                } else {
                    scheduled + 86_400 - now
                }
            }
        }
    }
}

/// Background loop that re-delivers the file on a fixed schedule.
pub struct DeliveryScheduler {
    schedule: Schedule,
    courier: Courier,
    destination: DestinationSlot,
}

impl DeliveryScheduler {
    /// Create a scheduler over the given courier and destination slot.
    pub fn new(schedule: Schedule, courier: Courier, destination: DestinationSlot) -> Self {
        Self {
            schedule,
            courier,
            destination,
        }
    }

    /// Start the background loop.
    ///
    /// The task runs for process lifetime; the handle is returned for tests
    /// and is never joined in production.
    pub fn run(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let started_at = now_epoch_secs();
            info!("delivery scheduler started: {}", self.schedule);

            loop {
                let now = now_epoch_secs();
                let delay = self.schedule.secs_until_next(started_at, now);
                let next_at = now.saturating_add(delay);
                if let Some(at) = chrono::DateTime::from_timestamp(next_at as i64, 0) {
                    debug!("next delivery at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
                }

                tokio::time::sleep(Duration::from_secs(delay)).await;
                self.tick().await;
            }
        })
    }

    /// One scheduler tick: deliver to the active chat, or skip when none
    /// has been adopted yet.
    async fn tick(&self) {
        let Some(chat_id) = self.destination.get() else {
            info!("scheduled delivery skipped: no active chat yet");
            return;
        };

        if let Err(e) = self.courier.deliver(chat_id).await {
            warn!("scheduled delivery to chat {chat_id} failed: {e}");
        }
    }
}

/// Returns current UTC seconds since epoch.
fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::telegram::TelegramClient;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn unreachable_courier() -> Courier {
        let telegram =
            Arc::new(TelegramClient::new("123:abc", 0).with_base_url("http://127.0.0.1:1"));
        Courier::new(
            telegram,
            PathBuf::from("/nonexistent/drivecast/report.pdf"),
            "report.pdf".to_owned(),
        )
    }

    #[test]
    fn interval_first_fire_is_one_full_period() {
        let schedule = Schedule::Interval { secs: 86_400 };
        assert_eq!(schedule.secs_until_next(1_000, 1_000), 86_400);
    }

    #[test]
    fn interval_mid_period() {
        let schedule = Schedule::Interval { secs: 600 };
        assert_eq!(schedule.secs_until_next(1_000, 1_250), 350);
    }

    #[test]
    fn interval_skips_missed_periods() {
        let schedule = Schedule::Interval { secs: 600 };
        // Three whole periods elapsed plus 50s; next fire is 550s out, the
        // missed ones are not replayed.
        assert_eq!(schedule.secs_until_next(1_000, 1_000 + 1_850), 550);
    }

    #[test]
    fn interval_on_boundary_waits_a_full_period() {
        let schedule = Schedule::Interval { secs: 600 };
        assert_eq!(schedule.secs_until_next(1_000, 1_600), 600);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let schedule = Schedule::Interval { secs: 0 };
        assert_eq!(schedule.secs_until_next(0, 5), 1);
    }

    #[test]
    fn daily_later_today() {
        let schedule = Schedule::Daily { hour: 10, min: 0 };
        // 09:00 UTC on some day.
        let now = 86_400 * 20_000 + 9 * 3600;
        assert_eq!(schedule.secs_until_next(0, now), 3600);
    }

    #[test]
    fn daily_already_passed_rolls_to_tomorrow() {
        let schedule = Schedule::Daily { hour: 10, min: 0 };
        // 11:00 UTC on some day.
        let now = 86_400 * 20_000 + 11 * 3600;
        assert_eq!(schedule.secs_until_next(0, now), 23 * 3600);
    }

    #[test]
    fn daily_exact_time_rolls_to_tomorrow() {
        let schedule = Schedule::Daily { hour: 10, min: 30 };
        let now = 86_400 * 20_000 + 10 * 3600 + 30 * 60;
        assert_eq!(schedule.secs_until_next(0, now), 86_400);
    }

    #[test]
    fn default_schedule_is_daily_interval() {
        assert_eq!(Schedule::default(), Schedule::Interval { secs: 86_400 });
    }

    #[test]
    fn schedule_display_interval_hours() {
        let s = Schedule::Interval { secs: 86_400 };
        assert_eq!(s.to_string(), "every 24 hours");
    }

    #[test]
    fn schedule_display_interval_minutes() {
        let s = Schedule::Interval { secs: 1800 };
        assert_eq!(s.to_string(), "every 30 minutes");
    }

    #[test]
    fn schedule_display_daily() {
        let s = Schedule::Daily { hour: 9, min: 0 };
        assert_eq!(s.to_string(), "daily at 09:00 UTC");
    }

    #[test]
    fn schedule_serde_round_trip() {
        let schedule = Schedule::Daily { hour: 9, min: 30 };
        let toml = toml::to_string(&schedule).unwrap();
        let restored: Schedule = toml::from_str(&toml).unwrap();
        assert_eq!(restored, schedule);
    }

    #[tokio::test]
    async fn run_survives_extreme_interval() {
        // u64::MAX seconds from now overflows naive epoch math; the loop
        // must keep waiting, not die on its first iteration.
        let scheduler = DeliveryScheduler::new(
            Schedule::Interval { secs: u64::MAX },
            unreachable_courier(),
            DestinationSlot::new(),
        );
        let handle = scheduler.run();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let err = handle.await.unwrap_err();
        assert!(err.is_cancelled(), "scheduler task died: {err}");
    }

    #[tokio::test]
    async fn tick_delivery_failure_is_contained() {
        let destination = DestinationSlot::new();
        destination.set(42);
        let scheduler =
            DeliveryScheduler::new(Schedule::default(), unreachable_courier(), destination);
        // File read fails; the tick logs and returns instead of propagating.
        scheduler.tick().await;
    }
}
