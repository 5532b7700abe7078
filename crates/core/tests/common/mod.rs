//! Shared test helpers for `argcursor_core` integration tests.

#![allow(unreachable_pub)]

use argcursor_core::Diagnostic;

/// Borrow string literals as raw byte tokens.
#[allow(dead_code)]
pub fn raw<'a>(argv: &[&'a str]) -> Vec<&'a [u8]> {
    argv.iter().map(|s| s.as_bytes()).collect()
}

/// Owned host strings, as a command dispatcher would hold them.
#[allow(dead_code)]
pub fn host(argv: &[&str]) -> Vec<String> {
    argv.iter().map(|s| (*s).to_string()).collect()
}

/// Assert a diagnostic's code and token span.
#[allow(dead_code)]
pub fn assert_diag(diag: &Diagnostic, id: &str, span: (usize, usize)) {
    assert_eq!(diag.id, id, "unexpected code in {diag}");
    let s = diag
        .span
        .unwrap_or_else(|| panic!("diagnostic without span: {diag}"));
    assert_eq!((s.start, s.end), span, "unexpected span in {diag}");
}
