//! Run configuration.

use std::time::Duration;

use colloquy_core::TerminationCondition;

/// Default time allowed for a single backend generation step.
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default cap on tool exchanges within one turn.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 8;

/// Configuration for one conversation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// The initial task, seeded into the transcript as the virtual
    /// user's message before the first turn.
    pub initial_task: String,
    /// When the run stops.
    pub termination: TerminationCondition,
    /// Time allowed for each backend generation step.
    pub invocation_timeout: Duration,
    /// Maximum tool exchanges inside a single turn. A turn that asks
    /// for more fails rather than looping forever.
    pub max_tool_iterations: usize,
}

impl RunConfig {
    pub fn new(initial_task: impl Into<String>, termination: TerminationCondition) -> Self {
        Self {
            initial_task: initial_task.into(),
            termination,
            invocation_timeout: DEFAULT_INVOCATION_TIMEOUT,
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    pub fn invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    pub fn max_tool_iterations(mut self, cap: usize) -> Self {
        self.max_tool_iterations = cap;
        self
    }
}
