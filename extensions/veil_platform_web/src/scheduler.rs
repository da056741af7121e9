//! Browser event loop scheduling
//!
//! Tasks go through `setTimeout(0)`, frames through `requestAnimationFrame`
//! and futures through `wasm_bindgen_futures`.

use futures::future::LocalBoxFuture;
use veil_platform::{FrameScheduler, Task, TaskScheduler};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Schedulers bound to one browser window
#[derive(Clone)]
pub struct WebScheduler {
    window: Window,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TaskScheduler for WebScheduler {
    fn defer(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
        {
            tracing::warn!(?err, "setTimeout failed, task dropped");
        }
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(future);
    }
}

impl FrameScheduler for WebScheduler {
    fn request_animation_frame(&self, callback: Task) {
        let callback = Closure::once_into_js(move |_timestamp: f64| callback());
        if let Err(err) = self.window.request_animation_frame(callback.unchecked_ref()) {
            tracing::warn!(?err, "requestAnimationFrame failed, frame callback dropped");
        }
    }
}
