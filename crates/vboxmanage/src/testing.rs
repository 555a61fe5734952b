//! Scripted process runner for tests
//!
//! Provides deterministic `VBoxManage` behaviour without spawning processes.
//! Responses are keyed by the arguments after the executable. A key scripted
//! with several responses returns them in order and then keeps repeating the
//! last one.

use crate::runner::{InvocationResult, ProcessRunner};
use exambox_core::VBoxCommand;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, VecDeque<InvocationResult>>>,
    calls: Mutex<Vec<Vec<String>>>,
    delay: Option<Duration>,
    running: AtomicUsize,
    max_running: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every run, to make overlap observable
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response for the given command
    pub fn respond(&self, command: &VBoxCommand, result: InvocationResult) {
        self.responses
            .lock()
            .entry(command.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn succeed(&self, command: &VBoxCommand, output: &str) {
        self.respond(command, InvocationResult::success(output));
    }

    pub fn fail(&self, command: &VBoxCommand, output: &str) {
        self.respond(command, InvocationResult::failure(output, "exit status: 1"));
    }

    /// Every run so far, executable excluded
    pub fn calls(&self) -> Vec<VBoxCommand> {
        self.calls
            .lock()
            .iter()
            .map(|argv| argv.iter().skip(1).cloned().collect())
            .collect()
    }

    /// Full argv of every run, executable included
    pub fn raw_calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, command: &VBoxCommand) -> usize {
        self.calls().iter().filter(|call| *call == command).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of runs observed in flight at once
    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    fn next_response(&self, key: &str) -> InvocationResult {
        let mut responses = self.responses.lock();
        match responses.get_mut(key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| unscripted(key)),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| unscripted(key)),
            None => unscripted(key),
        }
    }
}

fn unscripted(key: &str) -> InvocationResult {
    InvocationResult::failure("", format!("no scripted response for: {key}"))
}

impl ProcessRunner for ScriptedRunner {
    fn run_and_get_output(&self, argv: &[String]) -> InvocationResult {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().push(argv.to_vec());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let key = argv.iter().skip(1).cloned().collect::<Vec<_>>().join(" ");
        let result = self.next_response(&key);

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
