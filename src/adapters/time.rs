//! ESP32 time adapter.
//!
//! Monotonic uptime for the scheduler and wall-clock time for SAS token
//! expiry.
//!
//! - **`target_os = "espidf"`** — uptime from `esp_timer_get_time()`
//!   (microsecond precision, monotonic); wall clock set by SNTP.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side testing and simulation.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CommsError;

/// Anything earlier means SNTP has not run yet.
const EPOCH_2020: u64 = 1_577_836_800;

/// Time adapter for the ESP32 platform.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time reads the high-resolution timer; no
        // preconditions beyond the timer service started by the bootloader.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since the adapter was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds since the Unix epoch, or `None` before the clock is set.
    pub fn unix_time_secs(&self) -> Option<u64> {
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
        (secs >= EPOCH_2020).then_some(secs)
    }

    /// Expiry timestamp for a token valid `ttl_secs` from now.
    pub fn expiry_after(&self, ttl_secs: u32) -> Result<u64, CommsError> {
        self.unix_time_secs()
            .map(|now| now + u64::from(ttl_secs))
            .ok_or(CommsError::ClockNotSynced)
    }
}

/// Start SNTP and wait (bounded) for the first sync.
///
/// The returned handle must be kept alive for periodic resync.
#[cfg(target_os = "espidf")]
pub fn sync_clock(
    timeout: core::time::Duration,
) -> Result<esp_idf_svc::sntp::EspSntp<'static>, CommsError> {
    use esp_idf_svc::sntp::{EspSntp, SyncStatus};
    use log::{info, warn};

    const POLL: core::time::Duration = core::time::Duration::from_millis(250);

    let sntp = EspSntp::new_default().map_err(|e| {
        warn!("SNTP: init failed: {}", e);
        CommsError::ClockNotSynced
    })?;

    info!("SNTP: waiting for time sync...");
    let mut waited = core::time::Duration::ZERO;
    while sntp.get_sync_status() != SyncStatus::Completed {
        if waited >= timeout {
            warn!("SNTP: no sync after {:?}", timeout);
            return Err(CommsError::ClockNotSynced);
        }
        std::thread::sleep(POLL);
        waited += POLL;
    }
    info!("SNTP: time synced");
    Ok(sntp)
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_monotonic() {
        let t = Esp32TimeAdapter::new();
        let a = t.uptime_ms();
        let b = t.uptime_ms();
        assert!(b >= a);
    }

    #[test]
    fn host_clock_counts_as_synced() {
        let t = Esp32TimeAdapter::new();
        let now = t.unix_time_secs().unwrap();
        let expiry = t.expiry_after(60).unwrap();
        assert!((now + 60..=now + 62).contains(&expiry));
    }
}
