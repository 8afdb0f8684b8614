//! Record API implementations that need no server

pub mod in_memory;

pub use in_memory::{Fault, InMemoryRecordApi};
