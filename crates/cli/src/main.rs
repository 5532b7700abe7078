mod entry;
mod render;

use std::collections::HashSet;
use std::process;

use anyhow::{Context, Result, bail};
use argcursor_core::{ArgError, ArgsCursor, CoalesceDefaults, SpecError, parse_aggregate};
use argcursor_diagnostics::{self as diag, Diagnostic, Severity, Span};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::entry::{EntryDef, Slot, parse_entry};
use crate::render::{Format, TokenLine, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "argcursor",
    version,
    about = "Feed argument tokens through argcursor's extractors and grammars"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Match tokens against a spec table built from `--entry` options.
    Match {
        /// Spec entry as NAME:TYPE[:FLAG,...]. Types: string, token, i64,
        /// u64, u32, i32, f64, flag. Flags: positive, non-negative,
        /// no-advance, coalesce.
        #[arg(long = "entry", short = 'e', value_name = "NAME:TYPE[:FLAGS]", value_parser = parse_entry)]
        entries: Vec<EntryDef>,
        /// Integer produced for non-numeric input under `coalesce`.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        coalesce_int: i64,
        /// Double produced for non-numeric input under `coalesce`.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        coalesce_float: f64,
        /// Tokens to match, after `--`.
        #[arg(last = true)]
        tokens: Vec<String>,
    },

    /// Read one variadic group (`<count> <arg>...`) and show the remainder.
    Varargs {
        /// Tokens, after `--`.
        #[arg(last = true)]
        tokens: Vec<String>,
    },

    /// Parse an aggregate request and print it as JSON.
    Aggregate {
        /// Request tokens, after `--`.
        #[arg(last = true)]
        tokens: Vec<String>,
    },

    /// Explain a diagnostic ID (e.g. AC1003).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match run(cli.cmd, format) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": false,
                        "error": "command_failed",
                        "message": format!("{e:#}"),
                    });
                    println!("{out}");
                }
                Format::Pretty => eprintln!("error: {e:#}"),
            }
            process::exit(1);
        }
    }
}

/// Run a command; `Ok(false)` means it reported error diagnostics.
fn run(cmd: Cmd, format: Format) -> Result<bool> {
    match cmd {
        Cmd::Match {
            entries,
            coalesce_int,
            coalesce_float,
            tokens,
        } => {
            let coalesce = CoalesceDefaults {
                f64: coalesce_float,
                ..CoalesceDefaults::uniform(coalesce_int)
            };
            cmd_match(&entries, coalesce, &tokens, format)
        }
        Cmd::Varargs { tokens } => cmd_varargs(&tokens, format),
        Cmd::Aggregate { tokens } => cmd_aggregate(&tokens, format),
        Cmd::Explain { id } => {
            cmd_explain(&id, format)?;
            Ok(true)
        }
    }
}

/// Only install a subscriber when `RUST_LOG` asks for one; logs go to stderr.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

// ── Commands ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MatchReport {
    ok: bool,
    values: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    lengths: Map<String, Value>,
    position: usize,
    remaining: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

fn cmd_match(
    entries: &[EntryDef],
    coalesce: CoalesceDefaults,
    tokens: &[String],
    format: Format,
) -> Result<bool> {
    let mut seen = HashSet::new();
    for def in entries {
        if !seen.insert(def.name.to_ascii_lowercase()) {
            bail!(
                "entry {:?} is shadowed by an earlier entry with the same name",
                def.name
            );
        }
    }

    let mut ac = ArgsCursor::from_host(tokens).with_coalesce(coalesce);
    let mut slots: Vec<Slot<'_>> = entries.iter().map(|d| Slot::new(d.value_type)).collect();
    let result = entry::run(&mut ac, entries, &mut slots);
    tracing::debug!(position = ac.position(), ok = result.is_ok(), "match finished");

    let mut values = Map::new();
    let mut lengths = Map::new();
    for (def, slot) in entries.iter().zip(&slots) {
        values.insert(def.name.clone(), slot.to_json());
        if let Some(len) = slot.len() {
            lengths.insert(def.name.clone(), Value::from(len));
        }
    }
    let diagnostics: Vec<Diagnostic> = result
        .as_ref()
        .err()
        .map(SpecError::to_diagnostic)
        .into_iter()
        .collect();

    let report = MatchReport {
        ok: !has_errors(&diagnostics),
        values,
        lengths,
        position: ac.position(),
        remaining: tokens[ac.position()..].to_vec(),
        diagnostics,
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Pretty => {
            for (name, value) in &report.values {
                println!("{name} = {value}");
            }
            if !report.remaining.is_empty() {
                println!("remaining: {}", report.remaining.join(" "));
            }
            render_diagnostics(&TokenLine::new(tokens), &report.diagnostics, format);
        }
    }
    Ok(report.ok)
}

fn cmd_varargs(tokens: &[String], format: Format) -> Result<bool> {
    let mut ac = ArgsCursor::from_host(tokens);
    let diagnostic = match ac.get_var_args() {
        Ok(group) => {
            let group: Vec<String> = group
                .iter()
                .map(|t| String::from_utf8_lossy(t.as_bytes()).into_owned())
                .collect();
            let rest = &tokens[ac.position()..];
            match format {
                Format::Json => {
                    let out = serde_json::json!({ "ok": true, "group": group, "rest": rest });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
                Format::Pretty => {
                    println!("group: {}", group.join(" "));
                    println!("rest: {}", rest.join(" "));
                }
            }
            return Ok(true);
        }
        Err(e) => {
            let span = match e {
                ArgError::Missing => Span::empty(ac.len()),
                _ => Span::token(ac.position()),
            };
            e.to_diagnostic(span)
        }
    };
    report_failure(tokens, diagnostic, format)
}

fn cmd_aggregate(tokens: &[String], format: Format) -> Result<bool> {
    let mut ac = ArgsCursor::from_host(tokens);
    match parse_aggregate(&mut ac) {
        Ok(request) => {
            let json = serde_json::to_string_pretty(&request)
                .context("failed to serialize aggregate request")?;
            println!("{json}");
            Ok(true)
        }
        Err(e) => report_failure(tokens, e.to_diagnostic(), format),
    }
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output, so it goes to stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn report_failure(tokens: &[String], diagnostic: Diagnostic, format: Format) -> Result<bool> {
    let diagnostics = vec![diagnostic];
    match format {
        Format::Json => {
            let out = serde_json::json!({ "ok": false, "diagnostics": diagnostics });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => render_diagnostics(&TokenLine::new(tokens), &diagnostics, format),
    }
    Ok(!has_errors(&diagnostics))
}

/// Warnings do not make a command fail.
fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
}
