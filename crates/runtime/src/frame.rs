/// Frame metadata for one shared-canvas redraw.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Number of redraw requests folded into this frame.
    pub coalesced_requests: u32,
}

/// Coalesces redraw requests into at most one frame per dispatch turn.
///
/// Marker mutations call [`RedrawQueue::request`]; the render loop calls
/// [`RedrawQueue::take_frame`] once per viewport update and only draws when it
/// yields a frame.
#[derive(Debug, Default, Clone)]
pub struct RedrawQueue {
    next_index: u64,
    pending: u32,
}

impl RedrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn frames_drawn(&self) -> u64 {
        self.next_index
    }

    pub fn take_frame(&mut self) -> Option<Frame> {
        if self.pending == 0 {
            return None;
        }
        let frame = Frame {
            index: self.next_index,
            coalesced_requests: self.pending,
        };
        self.next_index += 1;
        self.pending = 0;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::RedrawQueue;

    #[test]
    fn many_requests_make_one_frame() {
        let mut q = RedrawQueue::new();
        assert!(q.take_frame().is_none());
        q.request();
        q.request();
        q.request();
        let f = q.take_frame().expect("frame");
        assert_eq!(f.index, 0);
        assert_eq!(f.coalesced_requests, 3);
        assert!(q.take_frame().is_none());
    }

    #[test]
    fn frame_indices_advance() {
        let mut q = RedrawQueue::new();
        q.request();
        let _ = q.take_frame();
        q.request();
        assert_eq!(q.take_frame().map(|f| f.index), Some(1));
        assert_eq!(q.frames_drawn(), 2);
    }
}
