//! # Task Management System
//!
//! A pool of worker threads fed through per-worker channels. The manager
//! distributes tasks round-robin, queues overflow in FIFO order, and drains
//! completed results on the main thread, where they may mutate the world and
//! spawn follow-up tasks.
//!
//! ## Task Lifecycle
//! 1. Tasks are created and published via [`TaskManager::publish_task`]
//! 2. The manager distributes tasks to available worker channels round-robin
//! 3. Workers process tasks and send results back
//! 4. [`TaskManager::process_completed_tasks`] applies results to the world
//!    on the main thread and publishes any follow-up tasks
//! 5. [`TaskManager::process_queued_tasks`] refills workers from the queue
//!
//! Each channel accepts at most one task in flight, so results come back in
//! publish order per worker and load spreads evenly.

pub mod geometry_build_task;
pub mod task;
pub mod terrain_generation_task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::info;

use crate::voxels::world::World;
use task::{Task, TaskResult};

/// A communication channel between the main thread and one worker thread.
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks in flight per worker channel.
///
/// Kept at 1 so tasks are processed in order within each channel and results
/// can never pile up behind a slow job.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker
    /// threads.
    ///
    /// # Panics
    /// Panics if thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    let _ = result_tx.send(result);
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                _worker: worker,
            });
        }

        info!("started {} task workers", num_workers);

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel, incrementing its
    /// in-flight counter on success. On failure (worker disconnected) the
    /// task is handed back for requeueing.
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

    /// Finds a channel that can accept a new task, round-robin from the last
    /// channel used.
    fn find_available_channel(&self) -> Option<usize> {
        if self.channels.is_empty() {
            return None;
        }
        if self
            .channels
            .iter()
            .all(|channel| channel.num_tasks_in_flight >= MAX_TASKS_IN_FLIGHT)
        {
            return None;
        }

        let start_channel = self.current_channel % self.channels.len();
        let mut current = start_channel;
        loop {
            if self.channels[current].num_tasks_in_flight < MAX_TASKS_IN_FLIGHT {
                return Some(current);
            }
            current = (current + 1) % self.channels.len();
            if current == start_channel {
                return None;
            }
        }
    }

    /// Publishes a task for background execution.
    ///
    /// # Returns
    /// `true` if the task was immediately scheduled on a worker, `false` if
    /// it was queued because all workers are busy.
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        if self.channels.is_empty() {
            self.queued_tasks.push_back(task);
            return false;
        }

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

    /// Refills idle workers from the queue, oldest task first. Call once per
    /// iteration of the main loop.
    pub fn process_queued_tasks(&mut self) {
        if self.queued_tasks.is_empty() {
            return;
        }

        match self.find_available_channel() {
            None => {} // all workers busy, keep tasks queued
            Some(mut channel_idx) => {
                while let Some(task) = self.queued_tasks.pop_front() {
                    match self.try_send_task(task, channel_idx) {
                        Ok(_) => match self.find_available_channel() {
                            Some(next_idx) => channel_idx = next_idx,
                            None => break,
                        },
                        Err(task) => {
                            // Channel disconnected; put the task back and stop.
                            self.queued_tasks.push_front(task);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Drains completed results, applies them to the world, and publishes any
    /// follow-up tasks they spawn. Must run on the main thread, which is the
    /// only place the world is mutated.
    pub fn process_completed_tasks(&mut self, world: &mut World) {
        let mut tasks_to_queue = Vec::new();
        for channel in &mut self.channels {
            while let Ok(result) = channel.result_receiver.try_recv() {
                channel.num_tasks_in_flight -= 1;
                tasks_to_queue.extend(result.handle_result(world));
            }
        }

        for task in tasks_to_queue {
            self.publish_task(task);
        }
    }

    /// Whether any task is queued or in flight. The main loop spins until
    /// this goes false.
    pub fn has_work(&self) -> bool {
        !self.queued_tasks.is_empty()
            || self
                .channels
                .iter()
                .any(|channel| channel.num_tasks_in_flight > 0)
    }
}
