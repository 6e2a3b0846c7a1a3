/*
    time.rs - Farcaster time

    Message timestamps are seconds since 2021-01-01T00:00:00Z, which keeps
    them in a u32 for the lifetime of the protocol.
*/

use super::errors::{ValidationError, ValidationResult};
use std::time::{SystemTime, UNIX_EPOCH};

/// Unix timestamp (seconds) of the Farcaster epoch
pub const FARCASTER_EPOCH: u64 = 1_609_459_200;

/// Convert unix seconds into Farcaster time
pub fn to_farcaster_time(unix_secs: u64) -> ValidationResult<u32> {
    let secs = unix_secs.checked_sub(FARCASTER_EPOCH).ok_or_else(|| ValidationError::InvalidField {
        field: "timestamp",
        reason: "before the farcaster epoch".to_string(),
    })?;
    u32::try_from(secs).map_err(|_| ValidationError::InvalidField {
        field: "timestamp",
        reason: "does not fit in 32 bits".to_string(),
    })
}

/// Convert Farcaster time back into unix seconds
pub fn from_farcaster_time(time: u32) -> u64 {
    FARCASTER_EPOCH + time as u64
}

/// Current Farcaster time from the system clock
pub fn farcaster_time_now() -> u32 {
    let unix_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(FARCASTER_EPOCH);
    to_farcaster_time(unix_secs).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(to_farcaster_time(FARCASTER_EPOCH), Ok(0));
        assert_eq!(from_farcaster_time(0), FARCASTER_EPOCH);
    }

    #[test]
    fn test_before_epoch_rejected() {
        assert!(to_farcaster_time(FARCASTER_EPOCH - 1).is_err());
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(farcaster_time_now() > 0);
    }
}
