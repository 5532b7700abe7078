//! Aggregate request grammar built on the cursor.
//!
//! ```text
//! <index> <query> [VERBATIM] [WITHCURSOR] [TIMEOUT <ms>]
//!   ( LOAD <n> <field>...
//!   | GROUPBY <n> @<prop>... ( REDUCE <fn> <nargs> <arg>... [AS <name>] )*
//!   | SORTBY <n> (@<prop> [ASC|DESC])... [MAX <num>]
//!   | APPLY <expr> AS <name>
//!   | FILTER <expr>
//!   | LIMIT <offset> <num> )*
//! ```
//!
//! Request options go through [`parse_arg_spec`]; the first name it does not
//! know is taken as a pipeline step keyword, the step is read positionally,
//! and option matching resumes after it.

use std::collections::BTreeMap;

use argcursor_diagnostics::{Diagnostic, Span, codes};
use serde::Serialize;
use tracing::debug;

use crate::cursor::ArgsCursor;
use crate::error::{ArgError, SpecError, Status};
use crate::flags::ArgFlags;
use crate::spec::{ArgSpec, ArgTarget, parse_arg_spec};
use crate::token::{HostString, Token};

/// A parsed aggregate request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRequest {
    /// Index name.
    pub index: String,
    /// Query text, passed through untouched.
    pub query: String,
    /// `VERBATIM` was given.
    pub verbatim: bool,
    /// `WITHCURSOR` was given.
    pub with_cursor: bool,
    /// `TIMEOUT` in milliseconds; 0 means no timeout.
    pub timeout_ms: u64,
    /// Pipeline steps, in order.
    pub steps: Vec<Step>,
}

/// One pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
    /// `LOAD <n> <field>...`
    Load {
        /// Loaded fields, without any `@` prefix.
        fields: Vec<String>,
    },
    /// `GROUPBY <n> @<prop>... REDUCE ...`
    GroupBy {
        /// Grouping properties, without the `@` prefix.
        properties: Vec<String>,
        /// Reducers applied to each group.
        reducers: Vec<Reducer>,
    },
    /// `SORTBY <n> (@<prop> [ASC|DESC])... [MAX <num>]`
    SortBy {
        /// Sort keys, most significant first.
        keys: Vec<SortKey>,
        /// Keep at most this many results.
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
    },
    /// `APPLY <expr> AS <name>`
    Apply {
        /// Expression text.
        expr: String,
        /// Name of the computed property.
        alias: String,
    },
    /// `FILTER <expr>`
    Filter {
        /// Expression text.
        expr: String,
    },
    /// `LIMIT <offset> <num>`
    Limit {
        /// Results to skip.
        offset: u64,
        /// Results to return.
        num: u64,
    },
}

/// `REDUCE <fn> <nargs> <arg>... [AS <name>]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reducer {
    /// Reducer function name, as given.
    pub function: String,
    /// Reducer arguments.
    pub args: Vec<String>,
    /// Output property name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// One `SORTBY` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    /// Property, without the `@` prefix.
    pub property: String,
    /// `false` when followed by `DESC`.
    pub ascending: bool,
}

/// Failure to parse an aggregate request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregateError {
    /// A positional value failed to extract.
    #[error("{context}: {source}")]
    Arg {
        /// What was being read, e.g. `"LIMIT offset"`.
        context: &'static str,
        /// Token index where extraction was attempted.
        at: usize,
        /// The extraction failure.
        #[source]
        source: ArgError,
    },

    /// A request option failed.
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// A keyword that starts no step.
    #[error("unknown aggregate step {name:?}")]
    UnknownStep {
        /// The keyword, lossily decoded.
        name: String,
        /// Token index of the keyword.
        at: usize,
    },

    /// A property reference without `@`.
    #[error("{context}: property {name:?} must start with '@'")]
    BadProperty {
        /// The step reading the property.
        context: &'static str,
        /// The offending token.
        name: String,
        /// Token index of the property.
        at: usize,
    },

    /// `APPLY` without `AS <name>`.
    #[error("APPLY {expr:?} requires AS <name>")]
    MissingAlias {
        /// The expression that lacks an alias.
        expr: String,
        /// Token index where `AS` was expected.
        at: usize,
    },
}

impl AggregateError {
    /// Status category for cursor-level failures; `None` for grammar errors.
    pub fn status(&self) -> Option<Status> {
        match self {
            AggregateError::Arg { source, .. } => Some(source.status()),
            AggregateError::Spec(e) => Some(e.status()),
            _ => None,
        }
    }

    /// Convert into a diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            AggregateError::Arg {
                context,
                at,
                source,
            } => {
                let span = match source {
                    ArgError::Missing => Span::empty(*at),
                    _ => Span::token(*at),
                };
                let mut diag = source.to_diagnostic(span);
                diag.message = self.to_string();
                let mut ctx = diag.context.take().unwrap_or_default();
                ctx.insert("arg".to_string(), context.to_string());
                diag.with_context(ctx)
            }
            AggregateError::Spec(e) => e.to_diagnostic(),
            AggregateError::UnknownStep { name, at } => Diagnostic::error(
                codes::UNKNOWN_STEP,
                self.to_string(),
                Some(Span::token(*at)),
            )
            .with_context(BTreeMap::from([("step".to_string(), name.clone())])),
            AggregateError::BadProperty { context, name, at } => Diagnostic::error(
                codes::BAD_PROPERTY,
                self.to_string(),
                Some(Span::token(*at)),
            )
            .with_context(BTreeMap::from([
                ("arg".to_string(), context.to_string()),
                ("value".to_string(), name.clone()),
            ])),
            AggregateError::MissingAlias { expr, at } => Diagnostic::error(
                codes::MISSING_ALIAS,
                self.to_string(),
                Some(Span::empty(*at)),
            )
            .with_context(BTreeMap::from([("expr".to_string(), expr.clone())])),
        }
    }
}

/// Run one extraction, tagging a failure with `context` and the position.
fn read<'a, H: HostString, T>(
    ac: &mut ArgsCursor<'a, H>,
    context: &'static str,
    f: impl FnOnce(&mut ArgsCursor<'a, H>) -> Result<T, ArgError>,
) -> Result<T, AggregateError> {
    let at = ac.position();
    f(ac).map_err(|source| AggregateError::Arg {
        context,
        at,
        source,
    })
}

/// Consume the current token if it equals `keyword`, ignoring case.
fn eat_keyword<H: HostString>(ac: &mut ArgsCursor<'_, H>, keyword: &str) -> bool {
    if ac.current().is_some_and(|t| t.eq_ignore_case(keyword)) {
        ac.advance();
        true
    } else {
        false
    }
}

fn string<H: HostString>(
    ac: &mut ArgsCursor<'_, H>,
    context: &'static str,
) -> Result<String, AggregateError> {
    read(ac, context, |ac| ac.get_str(ArgFlags::empty())).map(str::to_string)
}

fn property<H: HostString>(
    token: Token<'_, H>,
    context: &'static str,
    at: usize,
) -> Result<String, AggregateError> {
    let text = token.to_str().map_err(|source| AggregateError::Arg {
        context,
        at,
        source,
    })?;
    match text.strip_prefix('@') {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(AggregateError::BadProperty {
            context,
            name: text.to_string(),
            at,
        }),
    }
}

/// Read a variadic group, returning it with the absolute index of its first token.
fn group<'a, H: HostString>(
    ac: &mut ArgsCursor<'a, H>,
    context: &'static str,
) -> Result<(ArgsCursor<'a, H>, usize), AggregateError> {
    let base = ac.position() + 1;
    let sub = read(ac, context, |ac| ac.get_var_args())?;
    Ok((sub, base))
}

/// Parse an aggregate request from the cursor's remaining tokens.
///
/// On success the cursor is exhausted.
pub fn parse_aggregate<H: HostString>(
    ac: &mut ArgsCursor<'_, H>,
) -> Result<AggregateRequest, AggregateError> {
    let index = string(ac, "index")?;
    let query = string(ac, "query")?;
    let mut req = AggregateRequest {
        index,
        query,
        verbatim: false,
        with_cursor: false,
        timeout_ms: 0,
        steps: Vec::new(),
    };

    loop {
        let mut options = [
            ArgSpec::new("VERBATIM", ArgTarget::Flag(&mut req.verbatim)),
            ArgSpec::new("WITHCURSOR", ArgTarget::Flag(&mut req.with_cursor)),
            ArgSpec::new("TIMEOUT", ArgTarget::U64(&mut req.timeout_ms))
                .with_flags(ArgFlags::NON_NEGATIVE),
        ];
        match parse_arg_spec(ac, &mut options) {
            Ok(()) => break,
            Err(SpecError::UnknownName { name, at }) => {
                let step = parse_step(ac, &name, at)?;
                req.steps.push(step);
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(
        index = %req.index,
        steps = req.steps.len(),
        "parsed aggregate request"
    );
    Ok(req)
}

fn parse_step<H: HostString>(
    ac: &mut ArgsCursor<'_, H>,
    keyword: &str,
    at: usize,
) -> Result<Step, AggregateError> {
    let is = |k: &str| keyword.eq_ignore_ascii_case(k);
    if is("LOAD") {
        parse_load(ac)
    } else if is("GROUPBY") {
        parse_group_by(ac)
    } else if is("SORTBY") {
        parse_sort_by(ac)
    } else if is("APPLY") {
        let expr = string(ac, "APPLY expression")?;
        if !eat_keyword(ac, "AS") {
            return Err(AggregateError::MissingAlias {
                expr,
                at: ac.position(),
            });
        }
        let alias = string(ac, "APPLY alias")?;
        Ok(Step::Apply { expr, alias })
    } else if is("FILTER") {
        Ok(Step::Filter {
            expr: string(ac, "FILTER expression")?,
        })
    } else if is("LIMIT") {
        let offset = read(ac, "LIMIT offset", |ac| ac.get_u64(ArgFlags::NON_NEGATIVE))?;
        let num = read(ac, "LIMIT num", |ac| ac.get_u64(ArgFlags::POSITIVE))?;
        Ok(Step::Limit { offset, num })
    } else {
        Err(AggregateError::UnknownStep {
            name: keyword.to_string(),
            at,
        })
    }
}

fn parse_load<H: HostString>(ac: &mut ArgsCursor<'_, H>) -> Result<Step, AggregateError> {
    let (fields, base) = group(ac, "LOAD")?;
    let fields = fields
        .into_iter()
        .enumerate()
        .map(|(i, token)| {
            let text = token.to_str().map_err(|source| AggregateError::Arg {
                context: "LOAD",
                at: base + i,
                source,
            })?;
            Ok(text.strip_prefix('@').unwrap_or(text).to_string())
        })
        .collect::<Result<Vec<_>, AggregateError>>()?;
    Ok(Step::Load { fields })
}

fn parse_group_by<H: HostString>(ac: &mut ArgsCursor<'_, H>) -> Result<Step, AggregateError> {
    let (props, base) = group(ac, "GROUPBY")?;
    let properties = props
        .into_iter()
        .enumerate()
        .map(|(i, token)| property(token, "GROUPBY", base + i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut reducers = Vec::new();
    while eat_keyword(ac, "REDUCE") {
        let function = string(ac, "REDUCE function")?;
        let (args, base) = group(ac, "REDUCE")?;
        let args = args
            .into_iter()
            .enumerate()
            .map(|(i, token)| {
                token
                    .to_str()
                    .map(str::to_string)
                    .map_err(|source| AggregateError::Arg {
                        context: "REDUCE",
                        at: base + i,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let alias = if eat_keyword(ac, "AS") {
            Some(string(ac, "REDUCE alias")?)
        } else {
            None
        };
        reducers.push(Reducer {
            function,
            args,
            alias,
        });
    }

    Ok(Step::GroupBy {
        properties,
        reducers,
    })
}

fn parse_sort_by<H: HostString>(ac: &mut ArgsCursor<'_, H>) -> Result<Step, AggregateError> {
    let (mut items, base) = group(ac, "SORTBY")?;
    let mut keys = Vec::new();
    while let Some(token) = items.current() {
        let at = base + items.position();
        items.advance();
        let property = property(token, "SORTBY", at)?;
        let mut ascending = true;
        if eat_keyword(&mut items, "DESC") {
            ascending = false;
        } else {
            eat_keyword(&mut items, "ASC");
        }
        keys.push(SortKey {
            property,
            ascending,
        });
    }

    let max = if eat_keyword(ac, "MAX") {
        Some(read(ac, "SORTBY MAX", |ac| ac.get_u64(ArgFlags::POSITIVE))?)
    } else {
        None
    };
    Ok(Step::SortBy { keys, max })
}
