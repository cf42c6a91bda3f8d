//! Crate-wide error type.
//!
//! The pure codec (builder/validator) and the source tracker never return
//! `Result` — per-packet rejection is a boolean/event outcome, not an
//! exception (see the base spec's error handling design). `SacnError`
//! covers configuration mistakes and the environment failures surfaced by
//! a socket backend.

use thiserror::Error;

use crate::protocol::layout::{PRIORITY_MAX, SOURCE_NAME_SIZE};

/// Errors surfaced by façade construction/configuration and socket backends.
#[derive(Error, Debug)]
pub enum SacnError {
    /// Universe outside the valid `[1, 63999]` range.
    #[error("invalid universe: {0} (must be 1..=63999)")]
    InvalidUniverse(u16),

    /// Priority above the protocol maximum of 200.
    #[error("invalid priority: {0} (must be 0..={PRIORITY_MAX})")]
    InvalidPriority(u8),

    /// Source name longer than the 64-octet wire field (minus NUL).
    #[error("source name too long: {0} bytes (max {})", SOURCE_NAME_SIZE - 1)]
    NameTooLong(usize),

    /// `begin()` called on a façade that is already bound.
    #[error("already bound, call stop() first")]
    AlreadyBound,

    /// Unicast transport configured without a destination address.
    #[error("unicast transport requires a destination address")]
    MissingUnicastDestination,

    /// An operation that requires `begin()` was called before it.
    #[error("not bound, call begin() first")]
    NotBound,

    /// Socket backend I/O failure.
    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SacnError>;
