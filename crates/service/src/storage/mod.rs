//! Storage implementations that live inside the process.

pub mod memory;
