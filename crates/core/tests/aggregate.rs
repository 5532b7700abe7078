//! Aggregate request grammar: options, pipeline steps and error reporting.

mod common;

use argcursor_core::{
    AggregateError, AggregateRequest, ArgError, ArgsCursor, Reducer, SortKey, SpecError, Status,
    Step, ValueType, codes, parse_aggregate,
};
use common::{assert_diag, host, raw};
use pretty_assertions::assert_eq;

fn parse(argv: &[&str]) -> Result<AggregateRequest, AggregateError> {
    let argv = host(argv);
    let mut ac = ArgsCursor::from_host(&argv);
    let result = parse_aggregate(&mut ac);
    if result.is_ok() {
        assert!(ac.is_at_end());
    }
    result
}

// ─── Successful requests ────────────────────────────────────────────────────

#[test]
fn full_pipeline() {
    let req = parse(&[
        "products", "@title:phone", "VERBATIM", "GROUPBY", "1", "@brand", "REDUCE", "COUNT", "0",
        "AS", "n", "REDUCE", "AVG", "1", "@price", "SORTBY", "2", "@n", "DESC", "LIMIT", "0",
        "10",
    ])
    .unwrap();

    assert_eq!(req.index, "products");
    assert_eq!(req.query, "@title:phone");
    assert!(req.verbatim);
    assert!(!req.with_cursor);
    assert_eq!(
        req.steps,
        vec![
            Step::GroupBy {
                properties: vec!["brand".into()],
                reducers: vec![
                    Reducer {
                        function: "COUNT".into(),
                        args: vec![],
                        alias: Some("n".into()),
                    },
                    Reducer {
                        function: "AVG".into(),
                        args: vec!["@price".into()],
                        alias: None,
                    },
                ],
            },
            Step::SortBy {
                keys: vec![SortKey {
                    property: "n".into(),
                    ascending: false,
                }],
                max: None,
            },
            Step::Limit {
                offset: 0,
                num: 10,
            },
        ]
    );
}

#[test]
fn options_and_steps_interleave() {
    let req = parse(&[
        "idx", "*", "load", "2", "@a", "b", "timeout", "500", "APPLY", "@a * 2", "AS", "twice",
        "WITHCURSOR", "FILTER", "@twice > 3",
    ])
    .unwrap();
    assert_eq!(req.timeout_ms, 500);
    assert!(req.with_cursor);
    assert_eq!(
        req.steps,
        vec![
            Step::Load {
                fields: vec!["a".into(), "b".into()],
            },
            Step::Apply {
                expr: "@a * 2".into(),
                alias: "twice".into(),
            },
            Step::Filter {
                expr: "@twice > 3".into(),
            },
        ]
    );
}

#[test]
fn raw_tokens_parse_too() {
    let argv = raw(&["idx", "*", "SORTBY", "1", "@x", "MAX", "5"]);
    let mut ac = ArgsCursor::from_raw(&argv);
    let req = parse_aggregate(&mut ac).unwrap();
    assert_eq!(
        req.steps,
        vec![Step::SortBy {
            keys: vec![SortKey {
                property: "x".into(),
                ascending: true,
            }],
            max: Some(5),
        }]
    );
}

#[test]
fn request_serializes_with_step_tags() {
    let req = parse(&["idx", "*", "GROUPBY", "1", "@g", "LIMIT", "5", "5"]).unwrap();
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["index"], "idx");
    assert_eq!(json["steps"][0]["step"], "groupby");
    assert_eq!(json["steps"][0]["properties"][0], "g");
    assert_eq!(json["steps"][1]["step"], "limit");
    assert_eq!(json["steps"][1]["offset"], 5);
}

// ─── Errors ─────────────────────────────────────────────────────────────────

#[test]
fn missing_query() {
    let err = parse(&["idx"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::Arg {
            context: "query",
            at: 1,
            source: ArgError::Missing,
        }
    );
    assert_eq!(err.status(), Some(Status::NoArg));
    assert_diag(&err.to_diagnostic(), codes::MISSING_ARGUMENT, (1, 1));
}

#[test]
fn limit_offset_must_be_non_negative() {
    let err = parse(&["idx", "*", "LIMIT", "-1", "10"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::Arg {
            context: "LIMIT offset",
            at: 3,
            source: ArgError::OutOfRange {
                token: "-1".into(),
                expected: ValueType::U64,
            },
        }
    );
    let diag = err.to_diagnostic();
    assert_diag(&diag, codes::OUT_OF_RANGE, (3, 4));
    assert_eq!(diag.context.unwrap()["arg"], "LIMIT offset");
}

#[test]
fn limit_num_must_be_positive() {
    let err = parse(&["idx", "*", "LIMIT", "0", "0"]).unwrap_err();
    assert!(matches!(
        err,
        AggregateError::Arg {
            context: "LIMIT num",
            at: 4,
            ..
        }
    ));
}

#[test]
fn bad_timeout_is_option_error() {
    let err = parse(&["idx", "*", "TIMEOUT", "soon"]).unwrap_err();
    let AggregateError::Spec(SpecError::Invalid { name, at, .. }) = &err else {
        panic!("expected option error, got {err:?}");
    };
    assert_eq!((name.as_str(), *at), ("TIMEOUT", 2));
    assert_eq!(err.status(), Some(Status::Parse));
    assert_diag(&err.to_diagnostic(), codes::PARSE_FAILURE, (2, 4));
}

#[test]
fn unknown_step() {
    let err = parse(&["idx", "*", "VERBATIM", "FROB", "1"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::UnknownStep {
            name: "FROB".into(),
            at: 3,
        }
    );
    assert_diag(&err.to_diagnostic(), codes::UNKNOWN_STEP, (3, 4));
}

#[test]
fn sortby_property_needs_at_sign() {
    let err = parse(&["idx", "*", "SORTBY", "2", "@a", "b"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::BadProperty {
            context: "SORTBY",
            name: "b".into(),
            at: 5,
        }
    );
    assert_diag(&err.to_diagnostic(), codes::BAD_PROPERTY, (5, 6));
}

#[test]
fn short_group_reports_count_position() {
    let err = parse(&["idx", "*", "LOAD", "3", "@a"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::Arg {
            context: "LOAD",
            at: 3,
            source: ArgError::Missing,
        }
    );
}

#[test]
fn apply_without_alias() {
    let err = parse(&["idx", "*", "APPLY", "@a", "LIMIT", "0", "1"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::MissingAlias {
            expr: "@a".into(),
            at: 4,
        }
    );
    assert_diag(&err.to_diagnostic(), codes::MISSING_ALIAS, (4, 4));
}

#[test]
fn reduce_argument_error_points_at_the_argument() {
    let mut argv = raw(&[
        "idx", "*", "GROUPBY", "1", "@g", "REDUCE", "MAX", "2", "@a", "LIMIT", "0", "1",
    ]);
    argv.insert(9, &[0xff]);
    let mut ac = ArgsCursor::from_raw(&argv);
    let err = parse_aggregate(&mut ac).unwrap_err();
    assert!(matches!(
        err,
        AggregateError::Arg {
            context: "REDUCE",
            at: 9,
            source: ArgError::Parse { .. },
        }
    ));
    assert_diag(&err.to_diagnostic(), codes::PARSE_FAILURE, (9, 10));
}

#[test]
fn sortby_error_index_after_direction() {
    let err = parse(&["idx", "*", "SORTBY", "3", "@a", "ASC", "c"]).unwrap_err();
    assert_eq!(
        err,
        AggregateError::BadProperty {
            context: "SORTBY",
            name: "c".into(),
            at: 6,
        }
    );
}
