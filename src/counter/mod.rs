//! Per-(letter type, program, year) sequential letter numbering.
//!
//! All mutation of a counter goes through [`CounterService::commit`] or the
//! administrative [`CounterService::reset`]; previews and reports are read-only.

pub mod handlers;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;


pub use memory::InMemoryCounterStore;
pub use model::*;
pub use service::{CounterService, RetryPolicy};
pub use store::CounterStore;
