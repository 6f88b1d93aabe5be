//! Cooperative per-frame scheduling with synchronous cancellation.
//!
//! Everything runs on the event-loop thread: the frame step, resize events
//! and condition changes. A [`FrameLoop`] is the single repeating task. Its
//! [`CancelToken`] is shared with whoever queues the next frame, so that a
//! frame already queued when the background is torn down sees the
//! cancellation before it touches any resource.

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag for one frame loop.
///
/// Cloning shares the flag. Not `Send`: the loop is single-threaded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke the loop. Idempotent.
    pub fn cancel(&self) {
        self.0.set(true);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A repeating frame task.
///
/// Callers drive it with [`begin_frame`](Self::begin_frame) before doing any
/// work and [`schedule_next`](Self::schedule_next) before queueing the next
/// frame; both refuse once the token is cancelled.
#[derive(Debug, Default)]
pub struct FrameLoop {
    token: CancelToken,
    frames_run: u64,
    frames_scheduled: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle sharing this loop's cancellation flag.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Whether a frame may run now. Counts the frame when it may.
    pub fn begin_frame(&mut self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.frames_run += 1;
        true
    }

    /// Whether the next frame may be queued. Counts the request when it may.
    pub fn schedule_next(&mut self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.frames_scheduled += 1;
        true
    }

    /// Stop the loop. Returns `true` only for the call that actually cancelled.
    pub fn cancel(&mut self) -> bool {
        let was_live = !self.token.is_cancelled();
        self.token.cancel();
        was_live
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Frames that passed [`begin_frame`](Self::begin_frame).
    #[inline]
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    /// Frames that passed [`schedule_next`](Self::schedule_next).
    #[inline]
    pub fn frames_scheduled(&self) -> u64 {
        self.frames_scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_loop_runs_and_schedules() {
        let mut frames = FrameLoop::new();
        assert!(frames.begin_frame());
        assert!(frames.schedule_next());
        assert!(frames.begin_frame());
        assert_eq!(frames.frames_run(), 2);
        assert_eq!(frames.frames_scheduled(), 1);
    }

    #[test]
    fn test_cancel_blocks_queued_frame() {
        let mut frames = FrameLoop::new();
        assert!(frames.schedule_next());
        frames.cancel();
        // The frame queued above must not run.
        assert!(!frames.begin_frame());
        assert!(!frames.schedule_next());
        assert_eq!(frames.frames_run(), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut frames = FrameLoop::new();
        assert!(frames.cancel());
        assert!(!frames.cancel());
        assert!(frames.is_cancelled());
    }

    #[test]
    fn test_token_shares_state() {
        let mut frames = FrameLoop::new();
        let token = frames.token();
        token.cancel();
        assert!(frames.is_cancelled());
        assert!(!frames.begin_frame());
    }
}
