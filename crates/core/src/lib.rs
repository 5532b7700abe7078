//! Argument cursor and typed extraction for command-style argument lists.
//!
//! The main entry points are [`ArgsCursor`] with its typed extractors
//! (`get_i64`, `get_u32`, `get_f64`, `get_str`, ...), [`parse_arg_spec`]
//! for declarative name/value matching, and [`parse_aggregate`] for the
//! aggregate request grammar layered on both.

#![warn(missing_docs)]

/// Aggregate request grammar built on the cursor and the spec matcher.
pub mod aggregate;
/// Values substituted for non-numeric input under coalescing.
pub mod config;
/// The cursor itself: position, peeking, advancing and sub-ranges.
pub mod cursor;
/// Status codes and typed errors.
pub mod error;
/// Extraction flags.
pub mod flags;
/// Declarative spec tables and the matcher.
pub mod spec;
/// Raw and host-native tokens.
pub mod token;

mod extract;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Cursor
pub use cursor::{ArgsCursor, Remaining};
pub use token::{HostString, Token, TokenKind};

// Extraction
pub use config::CoalesceDefaults;
pub use flags::ArgFlags;

// Errors
pub use error::{ArgError, SpecError, Status};

// Matcher
pub use spec::{ArgSpec, ArgTarget, ValueType, parse_arg_spec};

// Aggregate
pub use aggregate::{AggregateError, AggregateRequest, Reducer, SortKey, Step, parse_aggregate};

// Diagnostics (re-exported from the diagnostics crate)
pub use argcursor_diagnostics::{Diagnostic, Severity, Span, codes};
