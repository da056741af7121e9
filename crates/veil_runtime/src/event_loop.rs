//! Headless event loop
//!
//! A single-threaded loop with three queues:
//!
//! - tasks, run in FIFO order by [`EventLoop::tick`]
//! - animation frames, run by [`EventLoop::run_frame`]; callbacks requested
//!   while a frame runs belong to the next frame
//! - futures, polled on a [`LocalPool`] whenever the loop turns
//!
//! Nothing runs on its own; the embedder (a host, a test) decides when time
//! passes.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use veil_platform::{FrameScheduler, Task, TaskScheduler};

pub struct EventLoop {
    tasks: RefCell<VecDeque<Task>>,
    frames: RefCell<Vec<Task>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    frame_count: Cell<u64>,
}

impl EventLoop {
    pub fn new() -> Rc<Self> {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Rc::new(Self {
            tasks: RefCell::new(VecDeque::new()),
            frames: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
            frame_count: Cell::new(0),
        })
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    /// One loop turn
    ///
    /// Polls ready futures, then runs the tasks that were queued before the
    /// turn started. Tasks queued by those tasks wait for the next turn.
    /// Returns the number of tasks run.
    pub fn tick(&self) -> usize {
        self.poll_futures();
        let due: Vec<Task> = self.tasks.borrow_mut().drain(..).collect();
        let ran = due.len();
        for task in due {
            task();
        }
        self.poll_futures();
        ran
    }

    /// Turn until no task is queued and no future can make progress
    pub fn run_until_stalled(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.tick();
            total += ran;
            if ran == 0 && self.tasks.borrow().is_empty() {
                break;
            }
        }
        total
    }

    /// Run one animation frame
    ///
    /// Returns the number of frame callbacks run.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut *self.frames.borrow_mut());
        let ran = due.len();
        for callback in due {
            callback();
        }
        self.frame_count.set(self.frame_count.get() + 1);
        tracing::trace!(frame = self.frame_count.get(), callbacks = ran, "frame");
        ran
    }

    pub fn run_frames(&self, frames: usize) -> usize {
        (0..frames).map(|_| self.run_frame()).sum()
    }

    fn poll_futures(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }
}

impl TaskScheduler for EventLoop {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }

    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) {
        if let Err(e) = self.spawner.spawn_local(future) {
            tracing::error!("failed to spawn local future: {}", e);
        }
    }
}

impl FrameScheduler for EventLoop {
    fn request_animation_frame(&self, callback: Task) {
        self.frames.borrow_mut().push(callback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;

    fn log() -> Rc<RefCell<Vec<&'static str>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_tasks_run_in_order_one_turn_at_a_time() {
        let event_loop = EventLoop::new();
        let seen = log();

        let s = seen.clone();
        let inner_loop = event_loop.clone();
        event_loop.defer(Box::new(move || {
            s.borrow_mut().push("first");
            let s = s.clone();
            inner_loop.defer(Box::new(move || s.borrow_mut().push("nested")));
        }));
        let s = seen.clone();
        event_loop.defer(Box::new(move || s.borrow_mut().push("second")));

        assert_eq!(event_loop.tick(), 2);
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
        assert_eq!(event_loop.pending_tasks(), 1);

        assert_eq!(event_loop.run_until_stalled(), 1);
        assert_eq!(*seen.borrow(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn test_frames_requested_during_a_frame_wait() {
        let event_loop = EventLoop::new();
        let seen = log();

        let s = seen.clone();
        let frames = event_loop.clone();
        event_loop.request_animation_frame(Box::new(move || {
            s.borrow_mut().push("frame 1");
            let s = s.clone();
            frames.request_animation_frame(Box::new(move || s.borrow_mut().push("frame 2")));
        }));

        assert_eq!(event_loop.run_frame(), 1);
        assert_eq!(*seen.borrow(), vec!["frame 1"]);
        assert_eq!(event_loop.pending_frames(), 1);

        assert_eq!(event_loop.run_frames(3), 1);
        assert_eq!(event_loop.frame_count(), 4);
        assert_eq!(*seen.borrow(), vec!["frame 1", "frame 2"]);
    }

    #[test]
    fn test_futures_complete_when_woken() {
        let event_loop = EventLoop::new();
        let (tx, rx) = oneshot::channel::<&'static str>();
        let seen = log();

        let s = seen.clone();
        event_loop.spawn_local(Box::pin(async move {
            if let Ok(value) = rx.await {
                s.borrow_mut().push(value);
            }
        }));

        event_loop.run_until_stalled();
        assert!(seen.borrow().is_empty());

        tx.send("resolved").unwrap();
        event_loop.run_until_stalled();
        assert_eq!(*seen.borrow(), vec!["resolved"]);
    }
}
