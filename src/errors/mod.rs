//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Error structures with source position information
//! - The error taxonomy reported to users (`ErrorKind`)
//! - Code generation failures
//! - Helpful error messages and suggestions

pub mod errors;
