//! # Task System Core Traits
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed on a worker thread
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the main thread, where it
//!    may touch the chunk streamer, emit render commands and spawn new tasks

use crate::engine_state::rendering::streaming::{ChunkStreamer, RenderCommand};

/// A unit of work that can be executed on a worker thread.
///
/// Tasks own everything they need (or shared handles to it), so they can be
/// moved across threads and outlive the frame that created them.
pub trait Task: Send {
    /// Processes the task and returns a result.
    ///
    /// Runs on a worker thread. Must not block on the main thread.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`, applied on the main thread.
pub trait TaskResult: Send {
    /// Applies the result to the streamer.
    ///
    /// # Returns
    /// A tuple containing:
    /// 1. A vector of new tasks to schedule (can be empty)
    /// 2. A vector of render commands for the renderer (can be empty)
    fn handle_result(
        self: Box<Self>,
        streamer: &mut ChunkStreamer,
    ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>);
}
