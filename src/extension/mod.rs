//! # Binding Pipelines
//!
//! Read and write sessions over a format backend, the capability traits
//! records implement, and the caches and controls a session is given.
pub mod reader;
pub mod record;
pub mod session;
pub mod writer;
