//! Load-time error type for dictionaries.

use thiserror::Error;

/// Errors that can occur while loading dictionary XML.
///
/// Sources are flattened to strings so the error stays `Clone` and
/// comparable in tests; dictionary loading is a startup-time concern and a
/// single human-readable message is the contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// The file could not be read from disk.
    #[error("failed to read {path}: {reason}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error, rendered.
        reason: String,
    },

    /// The document is not well-formed XML.
    #[error("invalid XML in {path}: {reason}")]
    Xml {
        /// Path of the malformed document.
        path: String,
        /// Parser error, rendered.
        reason: String,
    },

    /// The document has no `<fix>` root element.
    #[error("missing <fix> root element in {path}")]
    MissingRoot {
        /// Path of the offending document.
        path: String,
    },

    /// A directory scan found no loadable dictionary.
    ///
    /// Per-file failures are joined into `failures`; individual load errors
    /// are also logged as they occur and do not block the scan on their own.
    #[error("no dictionaries loaded from {path}{failures}")]
    NoneLoaded {
        /// Directory that was scanned.
        path: String,
        /// Joined per-file failure summaries (empty when the directory
        /// simply contained no `.xml` files).
        failures: String,
    },
}
