use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::value_objects::{ParticipantId, ParticipantName, Timestamp};

/// 在场记录：一个已注册的参与者及其最后活跃时间。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: ParticipantName,
    pub last_status: Timestamp,
}

impl Participant {
    pub fn new(id: ParticipantId, name: ParticipantName, last_status: Timestamp) -> Self {
        Self {
            id,
            name,
            last_status,
        }
    }

    /// True once the gap since the last activity strictly exceeds the
    /// staleness threshold. A `last_status` in the future (clock skew) never
    /// counts as idle.
    pub fn is_idle(&self, now: Timestamp, threshold: Duration) -> bool {
        (now - self.last_status)
            .to_std()
            .map(|idle| idle > threshold)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn participant(last_status: Timestamp) -> Participant {
        Participant::new(
            ParticipantId::from(Uuid::new_v4()),
            ParticipantName::parse("Alice").unwrap(),
            last_status,
        )
    }

    #[test]
    fn idle_only_past_the_threshold() {
        let now = Utc::now();
        let threshold = Duration::from_secs(10);

        let fresh = participant(now - chrono::Duration::seconds(5));
        assert!(!fresh.is_idle(now, threshold));

        let exactly_at = participant(now - chrono::Duration::seconds(10));
        assert!(!exactly_at.is_idle(now, threshold));

        let stale = participant(now - chrono::Duration::seconds(11));
        assert!(stale.is_idle(now, threshold));
    }

    #[test]
    fn future_last_status_is_never_idle() {
        let now = Utc::now();
        let skewed = participant(now + chrono::Duration::seconds(30));
        assert!(!skewed.is_idle(now, Duration::from_secs(10)));
    }
}
