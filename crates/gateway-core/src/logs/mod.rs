//! Logging configuration: a structured, column-aligned text formatter plus
//! a single-line JSON formatter for log aggregators.

pub mod logger;
