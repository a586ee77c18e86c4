//! # Table Configuration Module
//!
//! Declarative column specs, the table descriptor shared by both pipelines,
//! and the resolver that binds columns to physical header positions.
pub mod column;
pub mod resolver;
pub mod table;
