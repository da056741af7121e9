//! Frame pacing
//!
//! Delays expressed in rendering opportunities rather than wall-clock time.

use std::rc::Rc;

use veil_platform::FrameScheduler;

/// Run `f` after `frames` full rendering opportunities have passed
///
/// Each step requests the next animation frame and counts down; `f` runs inside
/// the frame callback that observes a zero count. With `frames == 0` it runs on
/// the very next frame, never synchronously.
pub fn after_frames(scheduler: Rc<dyn FrameScheduler>, frames: u32, f: impl FnOnce() + 'static) {
    chain(scheduler, frames, Box::new(f));
}

fn chain(scheduler: Rc<dyn FrameScheduler>, remaining: u32, f: Box<dyn FnOnce()>) {
    let next = scheduler.clone();
    scheduler.request_animation_frame(Box::new(move || {
        if remaining == 0 {
            f();
        } else {
            chain(next, remaining - 1, f);
        }
    }));
}
