//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete.

// ── Extraction (AC1xxx) ─────────────────────────────────────────────────

/// A token could not be converted to the requested type.
pub const PARSE_FAILURE: &str = "AC1001";
/// The cursor was exhausted where a value was required.
pub const MISSING_ARGUMENT: &str = "AC1002";
/// A value parsed but violated a sign or width constraint.
pub const OUT_OF_RANGE: &str = "AC1003";
/// The spec matcher met a name absent from its table.
pub const UNKNOWN_NAME: &str = "AC1004";

// ── Aggregate requests (AC2xxx) ─────────────────────────────────────────

/// A keyword that does not start any aggregate pipeline step.
pub const UNKNOWN_STEP: &str = "AC2001";
/// A property reference without the `@` prefix.
pub const BAD_PROPERTY: &str = "AC2002";
/// An `APPLY` step without its `AS <name>` clause.
pub const MISSING_ALIAS: &str = "AC2003";

/// Every known code, in numeric order.
pub const ALL: &[&str] = &[
    PARSE_FAILURE,
    MISSING_ARGUMENT,
    OUT_OF_RANGE,
    UNKNOWN_NAME,
    UNKNOWN_STEP,
    BAD_PROPERTY,
    MISSING_ALIAS,
];

pub(crate) fn explanation(id: &str) -> Option<&'static str> {
    let text = match id {
        PARSE_FAILURE => {
            "The argument exists but could not be converted to the expected type, \
             e.g. a word where an integer was required, or a fractional number \
             where an integer was required and coalescing was not enabled."
        }
        MISSING_ARGUMENT => {
            "The argument list ended where a value was required. Variadic groups \
             report this when their count is larger than the number of arguments left."
        }
        OUT_OF_RANGE => {
            "The argument parsed but lies outside the acceptable bounds: a negative \
             value for an unsigned or non-negative argument, zero for a positive \
             argument, or a value too wide for the target integer type."
        }
        UNKNOWN_NAME => {
            "The argument name is not part of this option table. This is a soft \
             condition: the name may belong to a different grammar layer."
        }
        UNKNOWN_STEP => {
            "The keyword does not start an aggregate step. Expected one of LOAD, \
             GROUPBY, SORTBY, APPLY, FILTER or LIMIT. REDUCE is only valid \
             after GROUPBY."
        }
        BAD_PROPERTY => "Property references must start with `@`, e.g. `@brand`.",
        MISSING_ALIAS => "APPLY requires an `AS <name>` clause naming the computed property.",
        _ => return None,
    };
    Some(text)
}
