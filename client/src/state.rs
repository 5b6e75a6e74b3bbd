use pixelwall_shared::saves::SaveSummary;

use crate::board::BoardView;
use crate::stroke::StrokeTracker;

/// Page-lifetime session state, constructed once at startup and shared via
/// `Rc<RefCell<_>>` across the event closures. Every mutation happens on
/// the single browser thread.
pub struct Session {
    pub board: BoardView,
    pub stroke: StrokeTracker,
    pub saves: Vec<SaveSummary>,
}

impl Session {
    pub fn new(board: BoardView) -> Self {
        Self {
            board,
            stroke: StrokeTracker::default(),
            saves: Vec::new(),
        }
    }
}
