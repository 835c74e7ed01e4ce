//! Test orchestration: the runner that executes single checks and the
//! orchestrator that sequences the four phases.

pub mod orchestrator;
pub mod report;
pub mod runner;
