//! Task and frame scheduling
//!
//! Everything runs on one cooperative event loop. Two primitives are exposed:
//! the task queue ("next tick") and the frame queue ("before the next repaint").
//! They are kept separate because delaying work by rendering opportunities is
//! not the same as delaying it by time.

use futures::future::LocalBoxFuture;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Macrotask scheduling
pub trait TaskScheduler {
    /// Run `task` on a later turn of the event loop, never synchronously
    fn defer(&self, task: Task);

    /// Drive a future to completion on the UI thread
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>);
}

/// Rendering opportunity scheduling
pub trait FrameScheduler {
    /// Run `callback` once, before the next repaint
    fn request_animation_frame(&self, callback: Task);
}
