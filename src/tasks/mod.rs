//! Background Tasks Module
//!
//! Periodic maintenance with no bearing on correctness.

mod maintenance;

pub use maintenance::spawn_prune_task;
