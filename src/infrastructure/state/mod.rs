//! Runtime state adapters

mod json_file;

pub use json_file::JsonStateStore;
