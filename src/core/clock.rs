use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

/// Source of the two non-deterministic inputs of a document: the message
/// identifier and the creation timestamp.
pub trait Clock {
    /// Unique `MsgId` seed. Sanitized and cut to 35 characters by the builder.
    fn message_id(&self) -> String;
    /// Local build time, written to `CreDtTm` with second precision.
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock with a random message identifier.
///
/// Timestamps alone are not unique when several files are generated within
/// the same second, so the identifier comes from a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn message_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock returning fixed values, for reproducible output.
#[derive(Debug, Clone)]
pub struct FixedClock {
    message_id: String,
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(message_id: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            message_id: message_id.into(),
            now,
        }
    }
}

impl Clock for FixedClock {
    fn message_id(&self) -> String {
        self.message_id.clone()
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_ids_are_unique_and_short() {
        let clock = SystemClock;
        let a = clock.message_id();
        let b = clock.message_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let clock = FixedClock::new("1710500000", now);
        assert_eq!(clock.message_id(), "1710500000");
        assert_eq!(clock.now(), now);
    }
}
