use std::collections::HashSet;

/// Fraction of a bubble that must be inside the viewport before it counts
/// as read.
pub const READ_THRESHOLD: f64 = 0.5;

/// Share of `[top, top + height)` that lies inside the viewport.
pub fn visible_fraction(top: f64, height: f64, viewport_top: f64, viewport_height: f64) -> f64 {
    if height <= 0.0 || viewport_height <= 0.0 {
        return 0.0;
    }
    let start = top.max(viewport_top);
    let end = (top + height).min(viewport_top + viewport_height);
    ((end - start) / height).clamp(0.0, 1.0)
}

/// Tracks which received messages have been seen.
///
/// Ids are reported at most once for the lifetime of the tracker, even
/// across chat switches; only ids registered with [`ReadTracker::watch`]
/// for the current chat are considered.
#[derive(Debug, Default)]
pub struct ReadTracker {
    reported: HashSet<i64>,
    watched: Vec<i64>,
}

impl ReadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watch(&mut self, message_id: i64) {
        if !self.watched.contains(&message_id) {
            self.watched.push(message_id);
        }
    }

    /// Forget the watch list of the previous chat.
    pub fn reset_watch(&mut self) {
        self.watched.clear();
    }

    /// Watched ids not yet reported, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = i64> + '_ {
        self.watched.iter().copied().filter(|id| !self.reported.contains(id))
    }

    /// Returns true exactly once per id, the first time it is observed at or
    /// above the threshold.
    pub fn observe(&mut self, message_id: i64, fraction: f64) -> bool {
        if fraction < READ_THRESHOLD || !self.watched.contains(&message_id) {
            return false;
        }
        self.reported.insert(message_id)
    }

    pub fn was_reported(&self, message_id: i64) -> bool {
        self.reported.contains(&message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_partially_visible_bubble() {
        assert_eq!(visible_fraction(90.0, 20.0, 0.0, 100.0), 0.5);
        assert_eq!(visible_fraction(10.0, 20.0, 0.0, 100.0), 1.0);
        assert_eq!(visible_fraction(150.0, 20.0, 0.0, 100.0), 0.0);
        assert_eq!(visible_fraction(-15.0, 20.0, 0.0, 100.0), 0.25);
        assert_eq!(visible_fraction(0.0, 0.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn reports_each_id_once_at_threshold() {
        let mut reads = ReadTracker::new();
        reads.watch(1);
        reads.watch(2);
        assert!(!reads.observe(1, 0.49));
        assert!(reads.observe(1, 0.5));
        assert!(!reads.observe(1, 1.0));
        assert_eq!(reads.pending().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn unwatched_ids_are_ignored() {
        let mut reads = ReadTracker::new();
        assert!(!reads.observe(5, 1.0));
        reads.watch(5);
        reads.reset_watch();
        assert!(!reads.observe(5, 1.0));
    }

    #[test]
    fn dedup_survives_chat_switch() {
        let mut reads = ReadTracker::new();
        reads.watch(3);
        assert!(reads.observe(3, 0.9));
        reads.reset_watch();
        reads.watch(3);
        assert!(!reads.observe(3, 0.9));
        assert!(reads.was_reported(3));
        assert_eq!(reads.pending().count(), 0);
    }
}
