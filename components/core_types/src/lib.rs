//! Core value and error types for the Corten asset loader.
//!
//! This crate provides the foundational types shared by the runtime and the
//! loader: the values carried by settled promises, the namespace tree export
//! paths resolve against, and the error types.
//!
//! # Overview
//!
//! - [`Value`] - Values carried by settled promises
//! - [`Namespace`] - Shared object tree addressed by dotted paths
//! - [`LoadFailure`] - Diagnostics for a failed fetch
//! - [`LoaderError`] - Errors raised by the loader
//!
//! # Examples
//!
//! ```
//! use core_types::{Namespace, Value};
//!
//! let window = Namespace::new();
//! window.set("app.ready", Value::Boolean(true));
//!
//! assert_eq!(window.resolve("app.ready"), Some(Value::Boolean(true)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod failure;
mod namespace;
mod value;

pub use error::{LoaderError, LoaderResult};
pub use failure::LoadFailure;
pub use namespace::Namespace;
pub use value::Value;
