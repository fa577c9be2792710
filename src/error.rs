//! Error types for the cannon
//!
//! The simulation itself never fails; errors come from the asset gate
//! and the DOM glue.

use thiserror::Error;

/// Result type alias for cannon operations
pub type Result<T> = std::result::Result<T, CannonError>;

/// Main error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CannonError {
    /// An image failed to load or decode
    #[error("asset '{name}' failed to load: {reason}")]
    AssetLoad { name: String, reason: String },

    /// Assets did not finish loading in time
    #[error("asset loading timed out after {elapsed_ms:.0} ms ({pending} pending)")]
    AssetTimeout { elapsed_ms: f64, pending: usize },

    /// A load event arrived for an asset the gate does not track
    #[error("unknown asset '{0}'")]
    UnknownAsset(String),

    /// The asset gate was asked to move between states it cannot connect
    #[error("invalid gate transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// Required page element is missing or of the wrong type
    #[error("missing element: {0}")]
    MissingElement(String),
}
