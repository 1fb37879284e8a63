//! Animation frame coalescing.
//!
//! At most one frame is pending. Requesting a new frame cancels the
//! previous one, so only the latest visual update is painted.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(u64);

#[derive(Debug)]
pub struct FrameCoalescer<T> {
    next_id: u64,
    pending: Option<(FrameId, T)>,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: None,
        }
    }
}

impl<T> FrameCoalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `value` for the next frame, replacing anything pending.
    pub fn request(&mut self, value: T) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.pending = Some((id, value));
        id
    }

    /// Drop the pending frame. Returns its id if there was one.
    pub fn cancel(&mut self) -> Option<FrameId> {
        self.pending.take().map(|(id, _)| id)
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending.as_ref().map(|(id, _)| *id)
    }

    /// Run the frame: hand out the pending value.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}
