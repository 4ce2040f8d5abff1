use std::collections::VecDeque;

use crate::canvas::CanvasState;
use crate::pixel_buffer::PixelBuffer;

/// Default number of snapshots kept before the oldest is evicted
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Bounded stack of full buffer snapshots.
///
/// Insertion evicts from the front once `max_depth` is reached, undo pops
/// from the back. Every snapshot is an independent copy of the committed
/// buffer.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    /// Oldest snapshot first
    snapshots: VecDeque<PixelBuffer>,
    max_depth: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl UndoHistory {
    /// Creates an empty history. A depth of zero is bumped to one.
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            snapshots: VecDeque::with_capacity(max_depth),
            max_depth,
        }
    }

    /// Push a copy of the committed buffer, evicting the oldest snapshot
    /// when full
    pub fn save_state(&mut self, canvas: &CanvasState) {
        if self.snapshots.len() >= self.max_depth {
            self.snapshots.pop_front();
            log::debug!("Undo history full, evicted oldest snapshot");
        }
        self.snapshots.push_back(canvas.buffer().copy());
        log::debug!("Saved checkpoint ({}/{})", self.snapshots.len(), self.max_depth);
    }

    /// Restore the most recent snapshot. Returns false when there is nothing
    /// to undo.
    pub fn undo(&mut self, canvas: &mut CanvasState) -> bool {
        match self.snapshots.pop_back() {
            Some(snapshot) => {
                canvas.restore_image(&snapshot);
                log::debug!("Undo applied, {} snapshot(s) left", self.snapshots.len());
                true
            }
            None => {
                log::debug!("Nothing to undo");
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
