//! Test utilities: scripted engine and probe

#![allow(dead_code)]

use async_trait::async_trait;
use sarek::{
    EngineCommand, EngineError, MemorySink, PipelineRunner, ProcessOutcome, Settings, Tool,
    ToolProbe, ToolStatus, WorkflowEngine,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Scripted reply for one engine invocation
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Exit(i32),
    Signal,
    Timeout(u64),
}

/// Mock engine that replays scripted outcomes and records every command
///
/// Clones share the same script and log, so a test can keep one handle
/// after moving the other into a runner.
#[derive(Clone, Default)]
pub struct MockEngine {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    commands: Arc<Mutex<Vec<EngineCommand>>>,
}

impl MockEngine {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Engine whose every invocation succeeds
    pub fn succeeding(count: usize) -> Self {
        Self::new(vec![Reply::Exit(0); count])
    }

    pub fn commands(&self) -> Vec<EngineCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

#[async_trait]
impl WorkflowEngine for MockEngine {
    async fn run(&self, command: &EngineCommand) -> Result<ProcessOutcome, EngineError> {
        self.commands.lock().unwrap().push(command.clone());

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Exit(code)) => Ok(ProcessOutcome::from_code(code)),
            Some(Reply::Signal) => Ok(ProcessOutcome { exit_code: None }),
            Some(Reply::Timeout(secs)) => Err(EngineError::Timeout(secs)),
            None => panic!("MockEngine: no reply scripted for `{}`", command),
        }
    }
}

/// Probe that reports a fixed set of programs as installed
pub struct MockProbe {
    installed: Vec<String>,
}

impl MockProbe {
    pub fn with(installed: &[&str]) -> Self {
        Self {
            installed: installed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ToolProbe for MockProbe {
    async fn probe(&self, tool: &Tool) -> ToolStatus {
        if self.installed.contains(&tool.program) {
            ToolStatus::Present {
                version: Some("23.10.1".to_string()),
            }
        } else {
            ToolStatus::Missing
        }
    }
}

/// Runner over a mock engine, with a sink the test can inspect
pub fn runner_with(
    engine: MockEngine,
    sample: &str,
    settings: Settings,
) -> (PipelineRunner<MockEngine>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let runner = PipelineRunner::new(engine, sample, settings, sink.clone());
    (runner, sink)
}
