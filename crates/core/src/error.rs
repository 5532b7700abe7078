//! Status codes and typed errors for extraction and spec matching.

use std::collections::BTreeMap;
use std::fmt;

use argcursor_diagnostics::{Diagnostic, Span, codes};

use crate::spec::ValueType;

/// Outcome of one extraction or matcher call, as a closed set of codes.
///
/// The typed errors carry context; `Status` is what a host checks or logs
/// when it only needs the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Not an error.
    Ok,
    /// The token does not convert to the requested type.
    Parse,
    /// The cursor was exhausted where a value was required.
    NoArg,
    /// The value parsed but violates a sign or width constraint.
    Limit,
    /// The matcher met a name missing from its table.
    UnknownName,
}

impl Status {
    /// Fixed human-readable message for this status.
    pub fn message(self) -> &'static str {
        match self {
            Status::Ok => "SUCCESS",
            Status::Parse => "Could not convert argument to expected type",
            Status::NoArg => "Expected an argument, but none provided",
            Status::Limit => "Value is outside acceptable bounds",
            Status::UnknownName => "Unknown argument",
        }
    }

    /// Diagnostic code for this status; `None` for [`Status::Ok`].
    pub fn code(self) -> Option<&'static str> {
        match self {
            Status::Ok => None,
            Status::Parse => Some(codes::PARSE_FAILURE),
            Status::NoArg => Some(codes::MISSING_ARGUMENT),
            Status::Limit => Some(codes::OUT_OF_RANGE),
            Status::UnknownName => Some(codes::UNKNOWN_NAME),
        }
    }

    /// Returns `true` for [`Status::Ok`].
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl<T> From<&Result<T, ArgError>> for Status {
    fn from(result: &Result<T, ArgError>) -> Self {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }
}

/// Failure of a single typed extraction.
///
/// The cursor never advances when an extraction fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    /// The token could not be converted to the requested type.
    #[error("could not convert {token:?} to {expected}")]
    Parse {
        /// The offending token, lossily decoded.
        token: String,
        /// The requested type.
        expected: ValueType,
    },

    /// No token was left where one was required.
    #[error("expected an argument, but none provided")]
    Missing,

    /// The token parsed but its value is not acceptable.
    #[error("{token:?} is outside the acceptable bounds for {expected}")]
    OutOfRange {
        /// The offending token, lossily decoded.
        token: String,
        /// The requested type.
        expected: ValueType,
    },
}

impl ArgError {
    /// Status category of this error.
    pub fn status(&self) -> Status {
        match self {
            ArgError::Parse { .. } => Status::Parse,
            ArgError::Missing => Status::NoArg,
            ArgError::OutOfRange { .. } => Status::Limit,
        }
    }

    /// The offending token text, if a token was present.
    pub fn token(&self) -> Option<&str> {
        match self {
            ArgError::Parse { token, .. } | ArgError::OutOfRange { token, .. } => Some(token),
            ArgError::Missing => None,
        }
    }

    /// Convert into a diagnostic covering `span`.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let mut ctx = BTreeMap::new();
        if let Some(token) = self.token() {
            ctx.insert("value".to_string(), token.to_string());
        }
        if let ArgError::Parse { expected, .. } | ArgError::OutOfRange { expected, .. } = self {
            ctx.insert("expected".to_string(), expected.to_string());
        }
        let diag = Diagnostic::error(status_code(self.status()), self.to_string(), Some(span));
        if ctx.is_empty() {
            diag
        } else {
            diag.with_context(ctx)
        }
    }
}

/// Failure of [`parse_arg_spec`](crate::parse_arg_spec).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    /// A name absent from the spec table.
    ///
    /// This is a soft condition: the name may belong to another grammar
    /// layer. The cursor sits just past the name, so the caller can read the
    /// name's own values next.
    #[error("unknown argument {name:?}")]
    UnknownName {
        /// The unmatched name, lossily decoded.
        name: String,
        /// Token index of the name.
        at: usize,
    },

    /// A known name whose value failed to extract.
    #[error("{name}: {source}")]
    Invalid {
        /// Index of the offending entry in the spec table.
        index: usize,
        /// Name of the offending entry, as declared in the table.
        name: String,
        /// Token index of the name.
        at: usize,
        /// The extraction failure.
        #[source]
        source: ArgError,
    },
}

impl SpecError {
    /// Status category of this error.
    pub fn status(&self) -> Status {
        match self {
            SpecError::UnknownName { .. } => Status::UnknownName,
            SpecError::Invalid { source, .. } => source.status(),
        }
    }

    /// Returns `true` if the caller may handle the token itself and continue.
    pub fn is_soft(&self) -> bool {
        matches!(self, SpecError::UnknownName { .. })
    }

    /// Token index of the name that stopped the matcher.
    pub fn at(&self) -> usize {
        match self {
            SpecError::UnknownName { at, .. } | SpecError::Invalid { at, .. } => *at,
        }
    }

    /// Convert into a name-qualified diagnostic.
    ///
    /// Unknown names become warnings, since the caller may still accept them.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SpecError::UnknownName { name, at } => Diagnostic::warn(
                codes::UNKNOWN_NAME,
                self.to_string(),
                Some(Span::token(*at)),
            )
            .with_context(BTreeMap::from([("arg".to_string(), name.clone())])),
            SpecError::Invalid {
                name, at, source, ..
            } => {
                let span = match source {
                    ArgError::Missing => Span::token(*at),
                    _ => Span::new(*at, *at + 2),
                };
                let mut diag = source.to_diagnostic(span);
                diag.message = self.to_string();
                let mut ctx = diag.context.take().unwrap_or_default();
                ctx.insert("arg".to_string(), name.clone());
                diag.with_context(ctx)
            }
        }
    }
}

fn status_code(status: Status) -> &'static str {
    status.code().unwrap_or(codes::PARSE_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argcursor_diagnostics::Severity;

    #[test]
    fn status_messages() {
        assert_eq!(Status::Ok.message(), "SUCCESS");
        assert_eq!(Status::Limit.to_string(), "Value is outside acceptable bounds");
        assert_eq!(Status::UnknownName.message(), "Unknown argument");
        assert!(Status::Ok.code().is_none());
        assert_eq!(Status::NoArg.code(), Some(codes::MISSING_ARGUMENT));
    }

    #[test]
    fn status_from_result() {
        let ok: Result<i64, ArgError> = Ok(3);
        let err: Result<i64, ArgError> = Err(ArgError::Missing);
        assert_eq!(Status::from(&ok), Status::Ok);
        assert_eq!(Status::from(&err), Status::NoArg);
    }

    #[test]
    fn arg_error_display() {
        let e = ArgError::Parse {
            token: "abc".into(),
            expected: ValueType::I64,
        };
        assert_eq!(e.to_string(), "could not convert \"abc\" to signed-64");
        assert_eq!(e.status(), Status::Parse);
    }

    #[test]
    fn spec_error_is_soft_only_for_unknown() {
        let soft = SpecError::UnknownName {
            name: "FOO".into(),
            at: 0,
        };
        let hard = SpecError::Invalid {
            index: 0,
            name: "LIMIT".into(),
            at: 0,
            source: ArgError::Missing,
        };
        assert!(soft.is_soft());
        assert!(!hard.is_soft());
        assert_eq!(soft.status(), Status::UnknownName);
        assert_eq!(hard.status(), Status::NoArg);
        assert_eq!(
            hard.to_string(),
            "LIMIT: expected an argument, but none provided"
        );
    }

    #[test]
    fn spec_error_diagnostic_is_name_qualified() {
        let err = SpecError::Invalid {
            index: 1,
            name: "LIMIT".into(),
            at: 2,
            source: ArgError::OutOfRange {
                token: "-1".into(),
                expected: ValueType::U32,
            },
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.id, codes::OUT_OF_RANGE);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.span, Some(Span::new(2, 4)));
        let ctx = diag.context.unwrap();
        assert_eq!(ctx["arg"], "LIMIT");
        assert_eq!(ctx["value"], "-1");
        assert_eq!(ctx["expected"], "unsigned-32");
    }

    #[test]
    fn unknown_name_diagnostic_is_warning() {
        let err = SpecError::UnknownName {
            name: "FOO".into(),
            at: 3,
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.severity, Severity::Warn);
        assert_eq!(diag.span, Some(Span::token(3)));
    }
}
