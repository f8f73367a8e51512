//! Foundation types for the embedded GraphQL language service.
//!
//! This crate provides shared types used across the stack, from extraction
//! up to the LSP transport. It carries no GraphQL knowledge of its own.
//!
//! # Type Categories
//!
//! - **File types**: [`FileUri`], [`Language`]
//! - **Position types**: [`Position`], [`Range`], [`OffsetRange`]
//! - **Diagnostic types**: [`Diagnostic`], [`DiagnosticSource`], [`DiagnosticSeverity`]

mod diagnostic;
mod file;
mod position;

pub use diagnostic::{Diagnostic, DiagnosticSeverity, DiagnosticSource};
pub use file::{FileUri, Language};
pub use position::{OffsetRange, Position, Range};
