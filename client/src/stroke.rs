use std::collections::HashSet;

use pixelwall_shared::Coord;

/// De-duplication window for one continuous pointer gesture. A slow drag
/// fires pointerover for the same cell many times; the visited set bounds
/// outbound traffic to one Pixel message per cell per stroke.
#[derive(Debug, Default)]
pub struct StrokeTracker {
    painting: bool,
    visited: HashSet<Coord>,
}

impl StrokeTracker {
    pub fn begin(&mut self) {
        self.visited.clear();
        self.painting = true;
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }

    /// True exactly once per coordinate per stroke, and never while no
    /// stroke is active.
    pub fn try_visit(&mut self, coord: Coord) -> bool {
        if !self.painting {
            return false;
        }
        self.visited.insert(coord)
    }

    pub fn end(&mut self) {
        self.painting = false;
        self.visited.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revisits_within_a_stroke_emit_once() {
        let mut tracker = StrokeTracker::default();
        tracker.begin();
        assert!(tracker.try_visit(Coord::new(1, 1)));
        assert!(!tracker.try_visit(Coord::new(1, 1)));
        assert!(!tracker.try_visit(Coord::new(1, 1)));
        assert!(tracker.try_visit(Coord::new(1, 2)));
    }

    #[test]
    fn visits_are_ignored_while_not_painting() {
        let mut tracker = StrokeTracker::default();
        assert!(!tracker.is_painting());
        assert!(!tracker.try_visit(Coord::new(0, 0)));
        tracker.begin();
        assert!(tracker.is_painting());
        assert!(tracker.try_visit(Coord::new(0, 0)));
        tracker.end();
        assert!(!tracker.is_painting());
        assert!(!tracker.try_visit(Coord::new(0, 0)));
    }

    #[test]
    fn a_new_stroke_resets_the_visited_set() {
        let mut tracker = StrokeTracker::default();
        tracker.begin();
        assert!(tracker.try_visit(Coord::new(3, 4)));
        tracker.end();
        tracker.begin();
        assert!(tracker.try_visit(Coord::new(3, 4)));
    }
}
