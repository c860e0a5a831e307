//! Loader error types.
//!
//! Every fallible operation in the workspace returns [`LoaderError`]. Resource
//! failures additionally travel through rejected promises; the error here is
//! what gets raised on the host when nobody may be listening.

use crate::LoadFailure;
use thiserror::Error;

/// An error raised by the loader.
///
/// # Examples
///
/// ```
/// use core_types::{LoadFailure, LoaderError};
///
/// let error = LoaderError::ResourceLoad {
///     url: "http://localhost/static/js/app.js".to_string(),
///     failure: LoadFailure::new("404"),
/// };
///
/// assert!(error.to_string().contains("app.js"));
/// ```
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// Shortcut expansion went deeper than the allowed depth, almost always a
    /// cycle between aliases.
    #[error("endless recursion during shortcut replacement\n{dump}")]
    ShortcutRecursion {
        /// Substitutions in progress when the limit was hit, outermost first
        trail: Vec<String>,
        /// Table contents and trail, formatted for humans
        dump: String,
    },

    /// A resource reported a load failure.
    #[error("failed to load resource \"{url}\"\nerror info: \"{failure}\"")]
    ResourceLoad {
        /// Absolute URL of the resource
        url: String,
        /// What the transport reported
        failure: LoadFailure,
    },

    /// A reference could not be turned into an absolute URL.
    #[error("invalid url \"{input}\": {source}")]
    InvalidUrl {
        /// The reference as written
        input: String,
        /// Why it was rejected
        #[source]
        source: url::ParseError,
    },

    /// A module declared itself but was never requested through the loader.
    #[error("module \"{0}\" is not registered with the loader")]
    UnknownModule(String),

    /// Invalid loader configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A host task failed.
    #[error("task failed: {0}")]
    Task(String),
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;
