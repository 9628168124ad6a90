//! # Task Management System
//!
//! A small worker pool for running chunk meshing off the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work executed on a worker thread
//! - `TaskResult`: The result of a completed task, applied on the main thread
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker is a `std::thread` with a dedicated pair of mpsc channels.
//! Tasks are distributed round-robin; a worker holds at most
//! [`MAX_TASKS_IN_FLIGHT`] tasks, everything else waits in a FIFO queue.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via `TaskManager::publish_task()`
//! 2. The manager hands them to available workers using round-robin
//! 3. Workers process tasks and send back results
//! 4. Results are applied on the main thread in `process_completed_tasks()`
//! 5. Results can spawn new tasks or emit render commands
//!
//! ## Example Usage
//! ```rust,ignore
//! let mut task_manager = TaskManager::new(num_workers);
//!
//! task_manager.publish_task(Box::new(MyTask::new(...)));
//!
//! // In the main loop:
//! let commands = task_manager.process_completed_tasks(&mut streamer);
//! task_manager.process_queued_tasks();
//! ```

pub mod task;

use log::{error, info, warn};
use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use task::{Task, TaskResult};

use super::rendering::streaming::{ChunkStreamer, RenderCommand};

/// A communication channel between the main thread and a worker thread.
///
/// Dropping the channel closes `task_sender`, which ends the worker loop.
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// # Fields
/// - `channels`: Set of active worker channels
/// - `queued_tasks`: Tasks waiting for an available worker
/// - `current_channel`: Index for round-robin scheduling
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// This is set to 1 to ensure tasks are processed in order within each channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the operating system refuses to spawn a thread.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} mesh workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Tasks handed to workers whose results have not been applied yet.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels.iter().map(|c| c.num_tasks_in_flight).sum()
    }

    /// Tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }

    /// Whether every published task has completed and been applied.
    pub fn is_idle(&self) -> bool {
        self.queued_tasks.is_empty() && self.tasks_in_flight() == 0
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the send failed (the worker has exited)
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        match self.channels[channel_idx].task_sender.send(task) {
            Ok(_) => {
                self.channels[channel_idx].num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => Err(task.0),
        }
    }

    /// Finds an available worker channel, round-robin from the last used one.
    ///
    /// # Returns
    /// - `Some(usize)` index of a channel below `MAX_TASKS_IN_FLIGHT`
    /// - `None` if all channels are busy or there are no channels
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| self.channels[idx].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT)
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers until the queue is empty or every worker
    /// is busy. Tasks leave the queue in FIFO order.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                break;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => {
                    // Channel is disconnected, put task back and stop processing
                    self.queued_tasks.push_front(task);
                    break;
                }
            }
        }
    }

    /// Applies every result that has already arrived, without blocking.
    ///
    /// # Returns
    /// The render commands produced by the applied results.
    pub fn process_completed_tasks(&mut self, streamer: &mut ChunkStreamer) -> Vec<RenderCommand> {
        let mut results = Vec::new();
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                results.push(result);
            }
        }
        self.apply_results(results, streamer)
    }

    /// Blocks until every published task, including tasks spawned by results,
    /// has completed and been applied.
    ///
    /// # Returns
    /// The render commands produced along the way.
    pub fn wait_until_idle(&mut self, streamer: &mut ChunkStreamer) -> Vec<RenderCommand> {
        let mut commands = Vec::new();
        loop {
            self.process_queued_tasks();
            if self.tasks_in_flight() == 0 {
                if !self.queued_tasks.is_empty() {
                    warn!(
                        "No worker can accept tasks, dropping {} queued tasks",
                        self.queued_tasks.len()
                    );
                    self.queued_tasks.clear();
                }
                break;
            }

            let mut results = Vec::new();
            for channel in &mut self.channels {
                if channel.num_tasks_in_flight == 0 {
                    continue;
                }
                match channel.result_receiver.recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        results.push(result);
                    }
                    Err(_) => {
                        error!("Mesh worker exited with {} tasks in flight", channel.num_tasks_in_flight);
                        channel.num_tasks_in_flight = 0;
                    }
                }
            }
            commands.extend(self.apply_results(results, streamer));
        }
        commands
    }

    fn apply_results(
        &mut self,
        results: Vec<Box<dyn TaskResult + Send>>,
        streamer: &mut ChunkStreamer,
    ) -> Vec<RenderCommand> {
        let mut commands = Vec::new();
        let mut tasks_to_queue = Vec::new();
        for result in results {
            let (new_tasks, render_commands) = result.handle_result(streamer);
            commands.extend(render_commands);
            tasks_to_queue.extend(new_tasks);
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::WorldDimensions;
    use crate::engine_state::rendering::meshing::ChunkMesher;
    use crate::engine_state::voxels::chunk::ChunkLayout;

    struct CountingTask {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    struct CountingResult {
        counter: Arc<AtomicUsize>,
        follow_ups: usize,
    }

    impl Task for CountingTask {
        fn process(&self) -> Box<dyn TaskResult + Send> {
            self.counter.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingResult {
                counter: self.counter.clone(),
                follow_ups: self.follow_ups,
            })
        }
    }

    impl TaskResult for CountingResult {
        fn handle_result(
            self: Box<Self>,
            _streamer: &mut ChunkStreamer,
        ) -> (Vec<Box<dyn Task + Send>>, Vec<RenderCommand>) {
            let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
            if self.follow_ups > 0 {
                tasks.push(Box::new(CountingTask {
                    counter: self.counter.clone(),
                    follow_ups: self.follow_ups - 1,
                }));
            }
            (tasks, Vec::new())
        }
    }

    fn streamer() -> ChunkStreamer {
        let mesher = Arc::new(ChunkMesher::with_defaults(ChunkLayout::new(16, 0)));
        ChunkStreamer::new(mesher, WorldDimensions::default(), 4)
    }

    #[test]
    fn every_task_and_follow_up_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(2);
        let mut streamer = streamer();

        for _ in 0..5 {
            manager.publish_task(Box::new(CountingTask {
                counter: counter.clone(),
                follow_ups: 2,
            }));
        }
        assert_eq!(manager.tasks_in_flight(), 2);
        assert_eq!(manager.queued_task_count(), 3);

        manager.wait_until_idle(&mut streamer);
        assert!(manager.is_idle());
        assert_eq!(counter.load(Ordering::SeqCst), 15);
    }

    #[test]
    fn zero_workers_keep_tasks_queued() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut manager = TaskManager::new(0);
        assert!(!manager.publish_task(Box::new(CountingTask {
            counter: counter.clone(),
            follow_ups: 0,
        })));
        assert_eq!(manager.queued_task_count(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
