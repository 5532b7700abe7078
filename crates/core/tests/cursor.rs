//! Cursor navigation: positions, peeking, advancing and sub-ranges.

mod common;

use argcursor_core::{ArgError, ArgFlags, ArgsCursor, CoalesceDefaults, TokenKind};
use common::{host, raw};
use pretty_assertions::assert_eq;

// ─── Construction ───────────────────────────────────────────────────────────

#[test]
fn new_cursor_sits_at_first_token() {
    let argv = raw(&["a", "b", "c", "d", "e"]);
    let ac = ArgsCursor::from_raw(&argv);
    assert_eq!(ac.position(), 0);
    assert_eq!(ac.remaining(), 5);
    assert_eq!(ac.len(), 5);
    assert!(!ac.is_at_end());
    assert!(!ac.is_empty());
}

#[test]
fn empty_cursor_is_at_end() {
    let argv: Vec<&[u8]> = Vec::new();
    let mut ac = ArgsCursor::from_raw(&argv);
    assert!(ac.is_empty());
    assert!(ac.is_at_end());
    assert!(ac.current().is_none());
    assert!(!ac.advance());
    assert_eq!(ac.position(), 0);
}

#[test]
fn raw_and_host_cursors_read_alike() {
    let words = ["LIMIT", "10", "2.5"];
    let raw_argv = raw(&words);
    let host_argv = host(&words);
    let mut r = ArgsCursor::from_raw(&raw_argv);
    let mut h = ArgsCursor::from_host(&host_argv);

    assert_eq!(r.kind(), TokenKind::Raw);
    assert_eq!(h.kind(), TokenKind::Host);
    assert_eq!(
        r.get_bytes(ArgFlags::empty()),
        h.get_bytes(ArgFlags::empty())
    );
    assert_eq!(r.get_u32(ArgFlags::empty()), h.get_u32(ArgFlags::empty()));
    assert_eq!(r.get_f64(ArgFlags::empty()), h.get_f64(ArgFlags::empty()));
    assert!(r.is_at_end() && h.is_at_end());
}

// ─── Navigation ─────────────────────────────────────────────────────────────

#[test]
fn peek_and_current_do_not_move() {
    let argv = host(&["x", "y", "z"]);
    let ac = ArgsCursor::from_host(&argv);
    assert_eq!(ac.current().unwrap().as_bytes(), b"x");
    assert_eq!(ac.peek_at(0).unwrap().as_bytes(), b"x");
    assert_eq!(ac.peek_at(2).unwrap().as_bytes(), b"z");
    assert!(ac.peek_at(3).is_none());
    assert_eq!(ac.position(), 0);
}

#[test]
fn advance_by_past_end_clamps_and_reports() {
    let argv = raw(&["a", "b", "c"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    assert!(ac.advance());
    assert!(!ac.advance_by(3));
    assert_eq!(ac.position(), 3);
    assert_eq!(ac.remaining(), 0);
}

#[test]
fn iter_yields_remaining_tokens_without_moving() {
    let argv = raw(&["a", "b", "c"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    ac.advance();
    let rest: Vec<&str> = ac.iter().map(|t| t.to_str().unwrap()).collect();
    assert_eq!(rest, vec!["b", "c"]);
    assert_eq!(ac.position(), 1);
    assert_eq!(ac.iter().len(), ac.remaining());
}

#[test]
fn position_is_the_inherent_method_through_mut_ref() {
    fn step(ac: &mut ArgsCursor<'_>) -> usize {
        ac.advance();
        ac.position()
    }
    let argv = raw(&["a", "b"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    assert_eq!(step(&mut ac), 1);
    assert_eq!(step(&mut ac), 2);
}

// ─── Sub-ranges ─────────────────────────────────────────────────────────────

#[test]
fn var_args_group_then_trailing_token() {
    let argv = raw(&["3", "a", "b", "c", "d"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    let mut sub = ac.get_var_args().unwrap();

    assert_eq!(sub.len(), 3);
    assert_eq!(sub.position(), 0);
    assert_eq!(sub.get_str(ArgFlags::empty()), Ok("a"));
    assert_eq!(sub.get_str(ArgFlags::empty()), Ok("b"));
    assert_eq!(sub.get_str(ArgFlags::empty()), Ok("c"));
    assert!(sub.is_at_end());
    assert_eq!(sub.get_str(ArgFlags::empty()), Err(ArgError::Missing));

    assert_eq!(ac.position(), 4);
    assert_eq!(ac.get_str(ArgFlags::empty()), Ok("d"));
}

#[test]
fn var_args_zero_count_is_empty_group() {
    let argv = raw(&["0", "next"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    let sub = ac.get_var_args().unwrap();
    assert!(sub.is_empty());
    assert_eq!(ac.current().unwrap().as_bytes(), b"next");
}

#[test]
fn var_args_bad_count_does_not_move() {
    let argv = raw(&["many", "a"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    assert!(matches!(ac.get_var_args(), Err(ArgError::Parse { .. })));
    assert_eq!(ac.position(), 0);

    let argv = raw(&["-1", "a"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    assert!(matches!(ac.get_var_args(), Err(ArgError::OutOfRange { .. })));
    assert_eq!(ac.position(), 0);
}

#[test]
fn nested_sub_cursors() {
    let argv = raw(&["4", "2", "x", "y", "z", "tail"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    let mut outer = ac.get_var_args().unwrap();
    let inner = outer.get_var_args().unwrap();
    let inner: Vec<&[u8]> = inner.into_iter().map(|t| t.as_bytes()).collect();
    assert_eq!(inner, vec![&b"x"[..], &b"y"[..]]);
    assert_eq!(outer.get_str(ArgFlags::empty()), Ok("z"));
    assert_eq!(ac.get_str(ArgFlags::empty()), Ok("tail"));
}

#[test]
fn sub_cursor_inherits_coalesce_defaults() {
    let argv = raw(&["1", "many"]);
    let mut ac = ArgsCursor::from_raw(&argv).with_coalesce(CoalesceDefaults::uniform(9));
    let mut sub = ac.get_var_args().unwrap();
    assert_eq!(sub.coalesce(), &CoalesceDefaults::uniform(9));
    assert_eq!(sub.get_i64(ArgFlags::COALESCE), Ok(9));
}
