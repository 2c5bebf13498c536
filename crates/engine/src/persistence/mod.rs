//! Persistence layer for the orchestration backend
//!
//! This module provides:
//! - [`ExecutionStore`] trait for execution, history and schedule state
//! - [`InMemoryExecutionStore`] used by the worker process

mod memory;
mod store;

pub use memory::InMemoryExecutionStore;
pub use store::{
    ExecutionRecord, ExecutionStore, ScheduleRecord, StoreError, RECENT_ACTIONS_LIMIT,
};
