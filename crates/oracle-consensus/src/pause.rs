//! Pause-until gate for report acceptance

use oracle_core::{OracleError, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// `resume_since` value meaning "paused until explicitly resumed"
pub const PAUSE_INFINITELY: Timestamp = Timestamp::MAX;

/// Report acceptance is paused while `now < resume_since`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseState {
    /// First timestamp at which acceptance is resumed
    pub resume_since: Timestamp,
}

impl PauseState {
    /// Whether acceptance is paused at `now`
    pub fn is_paused(&self, now: Timestamp) -> bool {
        now < self.resume_since
    }

    /// Fail with `Paused` while paused
    pub fn check_resumed(&self, now: Timestamp) -> Result<()> {
        if self.is_paused(now) {
            return Err(OracleError::Paused {
                resume_since: self.resume_since,
            });
        }
        Ok(())
    }

    /// Pause for `duration` seconds (`PAUSE_INFINITELY` for no limit)
    pub fn pause_for(&mut self, now: Timestamp, duration: u64) -> Result<Timestamp> {
        self.check_resumed(now)?;
        if duration == 0 {
            return Err(OracleError::invalid_config("pause duration must be positive"));
        }
        self.resume_since = if duration == PAUSE_INFINITELY {
            PAUSE_INFINITELY
        } else {
            now.saturating_add(duration)
        };
        Ok(self.resume_since)
    }

    /// Pause until `until` inclusive (`PAUSE_INFINITELY` for no limit)
    pub fn pause_until(&mut self, now: Timestamp, until: Timestamp) -> Result<Timestamp> {
        self.check_resumed(now)?;
        if until < now {
            return Err(OracleError::invalid_config(format!(
                "pause end {until} is in the past"
            )));
        }
        self.resume_since = if until == PAUSE_INFINITELY {
            PAUSE_INFINITELY
        } else {
            until + 1
        };
        Ok(self.resume_since)
    }

    /// Resume immediately
    pub fn resume(&mut self, now: Timestamp) -> Result<()> {
        if !self.is_paused(now) {
            return Err(OracleError::NotPaused);
        }
        self.resume_since = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_for_expires() {
        let mut pause = PauseState::default();
        assert!(!pause.is_paused(100));
        assert_eq!(pause.pause_for(100, 50).unwrap(), 150);
        assert!(pause.is_paused(149));
        assert!(!pause.is_paused(150));
    }

    #[test]
    fn test_pause_until_inclusive() {
        let mut pause = PauseState::default();
        pause.pause_until(100, 120).unwrap();
        assert!(pause.is_paused(120));
        assert!(!pause.is_paused(121));
    }

    #[test]
    fn test_pause_infinitely_and_resume() {
        let mut pause = PauseState::default();
        pause.pause_for(10, PAUSE_INFINITELY).unwrap();
        assert!(pause.is_paused(u64::MAX - 1));
        assert_eq!(
            pause.pause_for(11, 5),
            Err(OracleError::Paused {
                resume_since: PAUSE_INFINITELY
            })
        );
        pause.resume(12).unwrap();
        assert!(!pause.is_paused(12));
        assert_eq!(pause.resume(13), Err(OracleError::NotPaused));
    }

    #[test]
    fn test_invalid_pause_arguments() {
        let mut pause = PauseState::default();
        assert!(pause.pause_for(10, 0).is_err());
        assert!(pause.pause_until(10, 9).is_err());
        assert!(!pause.is_paused(10));
    }
}
