use crate::config::ScrollDirection;

/// Last vertical scroll offset seen by an intersection check.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMemory {
    last_offset: f64,
}

impl ScrollMemory {
    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Returns whether a trigger at `current` matches `direction`.
    ///
    /// The offset is recorded on every call, including denied ones. Without a
    /// scroll position (no browsing context) the check always passes.
    pub fn check(&mut self, current: Option<f64>, direction: ScrollDirection) -> bool {
        let Some(current) = current else {
            return true;
        };

        let scrolling_down = current > self.last_offset;
        self.last_offset = current;
        direction.allows(scrolling_down)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_filter_suppresses_upward_scroll() {
        let mut memory = ScrollMemory::default();
        assert!(memory.check(Some(400.0), ScrollDirection::Down));
        assert!(!memory.check(Some(250.0), ScrollDirection::Down));
        assert!(memory.check(Some(300.0), ScrollDirection::Down));
    }

    #[test]
    fn test_up_filter_suppresses_downward_scroll() {
        let mut memory = ScrollMemory::default();
        assert!(!memory.check(Some(400.0), ScrollDirection::Up));
        assert!(memory.check(Some(100.0), ScrollDirection::Up));
        assert!(!memory.check(Some(120.0), ScrollDirection::Up));
    }

    #[test]
    fn test_denied_checks_still_advance_memory() {
        let mut memory = ScrollMemory::default();
        assert!(!memory.check(Some(500.0), ScrollDirection::Up));
        assert_eq!(memory.last_offset(), 500.0);
        // Compared against 500, not the initial 0.
        assert!(memory.check(Some(450.0), ScrollDirection::Up));
        assert_eq!(memory.last_offset(), 450.0);
    }

    #[test]
    fn test_unchanged_offset_counts_as_not_down() {
        let mut memory = ScrollMemory::default();
        assert!(!memory.check(Some(0.0), ScrollDirection::Down));
        assert!(memory.check(Some(0.0), ScrollDirection::Up));
    }

    #[test]
    fn test_missing_scroll_position_degrades_open() {
        let mut memory = ScrollMemory::default();
        memory.check(Some(80.0), ScrollDirection::Both);
        assert!(memory.check(None, ScrollDirection::Down));
        assert!(memory.check(None, ScrollDirection::Up));
        assert_eq!(memory.last_offset(), 80.0);
    }
}
