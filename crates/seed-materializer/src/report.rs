use crate::stage::Stage;
use serde::Serialize;
use std::time::Duration;

/// Outcome of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    /// Relational rows read as the stage's primary input.
    pub read: u64,
    /// Documents written or patched.
    pub written: u64,
    /// References that could not be resolved and were skipped.
    pub soft_misses: u64,
    pub duration: Duration,
}

impl StageReport {
    pub(crate) fn new(stage: Stage) -> Self {
        Self {
            stage,
            read: 0,
            written: 0,
            soft_misses: 0,
            duration: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaterializeReport {
    pub stages: Vec<StageReport>,
    pub total_duration: Duration,
}

impl MaterializeReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    pub fn written(&self, stage: Stage) -> u64 {
        self.stage(stage).map_or(0, |r| r.written)
    }

    pub fn soft_misses(&self) -> u64 {
        self.stages.iter().map(|r| r.soft_misses).sum()
    }
}
