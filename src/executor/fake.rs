//! Scripted engine for executor tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

use crate::engine::{Engine, EngineConfig, EngineError};
use crate::models::{RunStats, RunSummary};

#[derive(Clone, Debug)]
enum Behavior {
    Pass(RunStats),
    Error(String),
    Panic,
}

/// What the fake engine does for one collection
#[derive(Clone, Debug)]
pub struct Script {
    delay_ms: u64,
    behavior: Behavior,
}

impl Script {
    pub fn pass(stats: RunStats) -> Self {
        Self {
            delay_ms: 0,
            behavior: Behavior::Pass(stats),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            delay_ms: 0,
            behavior: Behavior::Error(message.into()),
        }
    }

    pub fn panic() -> Self {
        Self {
            delay_ms: 0,
            behavior: Behavior::Panic,
        }
    }

    pub fn after_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::pass(RunStats::default())
    }
}

/// Engine that follows per-collection scripts and records what it ran
#[derive(Default)]
pub struct FakeEngine {
    scripts: HashMap<String, Script>,
    barrier: Option<Arc<Barrier>>,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
    last_config: Mutex<Option<EngineConfig>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, collection: &str, script: Script) -> Self {
        self.scripts.insert(collection.to_string(), script);
        self
    }

    /// Every run waits until `n` runs are in flight at once
    pub fn rendezvous(mut self, n: usize) -> Self {
        self.barrier = Some(Arc::new(Barrier::new(n)));
        self
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn last_config(&self) -> Option<EngineConfig> {
        self.last_config.lock().unwrap().clone()
    }
}

#[async_trait]
impl Engine for FakeEngine {
    async fn run(&self, config: &EngineConfig) -> Result<RunSummary, EngineError> {
        let key = config.collection.as_str().to_string();
        self.started.lock().unwrap().push(key.clone());
        *self.last_config.lock().unwrap() = Some(config.clone());

        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }

        let script = self.scripts.get(&key).cloned().unwrap_or_default();
        if script.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(script.delay_ms)).await;
        }
        self.finished.lock().unwrap().push(key.clone());

        match script.behavior {
            Behavior::Pass(stats) => Ok(RunSummary::new(stats)),
            Behavior::Error(message) => Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                message,
            ))),
            Behavior::Panic => panic!("scripted engine panic for {key}"),
        }
    }
}
