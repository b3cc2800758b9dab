//! Artifact identity.
//!
//! An artifact id is a Unix millisecond timestamp. The clock never hands out
//! the same value twice: when two requests land in the same millisecond the
//! later one is bumped forward, so names stay `railway-item-<millis>.pdf` and
//! remain unique within the process.

use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

pub const ARTIFACT_PREFIX: &str = "railway-item-";
pub const ARTIFACT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactId(i64);

impl ArtifactId {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn artifact_name(self) -> String {
        format!("{}{}.{}", ARTIFACT_PREFIX, self.0, ARTIFACT_EXTENSION)
    }

    /// Recover the id from a name produced by [`artifact_name`](Self::artifact_name).
    pub fn parse_name(name: &str) -> Option<Self> {
        let digits = name
            .strip_prefix(ARTIFACT_PREFIX)?
            .strip_suffix(ARTIFACT_EXTENSION)?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing artifact ids.
#[derive(Debug, Default)]
pub struct ArtifactClock {
    last: AtomicI64,
}

impl ArtifactClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> ArtifactId {
        self.issue_at(Utc::now().timestamp_millis())
    }

    /// Issue an id for wall-clock time `now_millis`.
    pub fn issue_at(&self, now_millis: i64) -> ArtifactId {
        let prev = match self.last.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_millis.max(last + 1))
        }) {
            Ok(prev) | Err(prev) => prev,
        };
        ArtifactId(now_millis.max(prev + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_name_format() {
        let id = ArtifactId::from_millis(1705312800000);
        assert_eq!(id.artifact_name(), "railway-item-1705312800000.pdf");
        assert_eq!(ArtifactId::parse_name(&id.artifact_name()), Some(id));
    }

    #[test]
    fn test_parse_name_rejects_foreign_names() {
        assert_eq!(ArtifactId::parse_name("railway-item-.pdf"), None);
        assert_eq!(ArtifactId::parse_name("railway-item-12a.pdf"), None);
        assert_eq!(ArtifactId::parse_name("other-12.pdf"), None);
        assert_eq!(ArtifactId::parse_name("railway-item-12.png"), None);
    }

    #[test]
    fn test_same_millisecond_is_bumped() {
        let clock = ArtifactClock::new();
        let a = clock.issue_at(1_000);
        let b = clock.issue_at(1_000);
        let c = clock.issue_at(999);
        assert_eq!(a.millis(), 1_000);
        assert_eq!(b.millis(), 1_001);
        assert_eq!(c.millis(), 1_002);
        assert_eq!(clock.issue_at(5_000).millis(), 5_000);
    }

    #[test]
    fn test_concurrent_issue_is_unique() {
        let clock = Arc::new(ArtifactClock::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || (0..500).map(|_| clock.issue()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
