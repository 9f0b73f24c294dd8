//! 제약/목표값 파서의 범위 규칙 회귀 테스트.
use std::collections::HashMap;

use dafd_toolbox::metadata::{ParamRange, ParameterTable};
use dafd_toolbox::validation::{
    parse_constraint, parse_desired, Constraint, RangeWarning, ValidationError, WarningKind,
};

fn table() -> ParameterTable {
    let mut ranges = HashMap::new();
    ranges.insert("Orifice Size".to_string(), ParamRange::new(50.0, 500.0));
    ranges.insert("Aspect Ratio".to_string(), ParamRange::new(1.0, 3.0));
    ranges.insert("Flow Rate".to_string(), ParamRange::new(0.1, 10.0));
    ParameterTable::new(
        vec!["Orifice Size".into(), "Aspect Ratio".into()],
        vec!["Flow Rate".into()],
        ranges,
    )
    .expect("valid table")
}

fn warning(parameter: &str, kind: WarningKind) -> RangeWarning {
    RangeWarning {
        parameter: parameter.to_string(),
        kind,
    }
}

#[test]
fn constraint_below_minimum_is_dropped_as_too_low() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let c = parse_constraint(&t, "Orifice Size", "40", &mut warnings).unwrap();
    assert_eq!(c, None);
    assert_eq!(warnings, vec![warning("Orifice Size", WarningKind::TooLow)]);
}

#[test]
fn constraint_touching_either_bound_is_rejected() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    assert_eq!(parse_constraint(&t, "Orifice Size", "50", &mut warnings).unwrap(), None);
    assert_eq!(parse_constraint(&t, "Orifice Size", "500", &mut warnings).unwrap(), None);
    assert_eq!(
        parse_constraint(&t, "Orifice Size", "100-500", &mut warnings).unwrap(),
        None
    );
    assert_eq!(
        warnings,
        vec![
            warning("Orifice Size", WarningKind::TooLow),
            warning("Orifice Size", WarningKind::TooHigh),
            warning("Orifice Size", WarningKind::TooHigh),
        ]
    );
}

#[test]
fn too_low_is_reported_before_too_high() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let c = parse_constraint(&t, "Orifice Size", "10-900", &mut warnings).unwrap();
    assert_eq!(c, None);
    assert_eq!(warnings, vec![warning("Orifice Size", WarningKind::TooLow)]);
}

#[test]
fn constraint_strictly_inside_is_accepted() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let c = parse_constraint(&t, "Orifice Size", "100-200", &mut warnings).unwrap();
    assert_eq!(
        c,
        Some(Constraint {
            low: 100.0,
            high: 200.0
        })
    );
    assert!(warnings.is_empty());
}

#[test]
fn single_value_equals_degenerate_range() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let single = parse_constraint(&t, "Aspect Ratio", "2", &mut warnings).unwrap();
    let range = parse_constraint(&t, "Aspect Ratio", "2-2", &mut warnings).unwrap();
    assert_eq!(single, Some(Constraint::point(2.0)));
    assert_eq!(single, range);
    assert!(single.unwrap().is_point());
}

#[test]
fn empty_text_contributes_nothing() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    assert_eq!(parse_constraint(&t, "Orifice Size", "", &mut warnings).unwrap(), None);
    assert_eq!(parse_constraint(&t, "Orifice Size", "   ", &mut warnings).unwrap(), None);
    assert_eq!(parse_desired(&t, "Flow Rate", "", &mut warnings).unwrap(), None);
    assert!(warnings.is_empty());
}

#[test]
fn inverted_constraint_is_dropped() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let c = parse_constraint(&t, "Orifice Size", "300-100", &mut warnings).unwrap();
    assert_eq!(c, None);
    assert_eq!(warnings, vec![warning("Orifice Size", WarningKind::Inverted)]);
}

#[test]
fn non_numeric_constraint_is_an_error() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let err = parse_constraint(&t, "Orifice Size", "100-abc", &mut warnings).unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidNumber {
            parameter: "Orifice Size".into(),
            text: "abc".into()
        }
    );
    assert!(parse_constraint(&t, "Orifice Size", "big", &mut warnings).is_err());
}

#[test]
fn constraint_with_more_than_two_parts_is_an_error() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    let err = parse_constraint(&t, "Orifice Size", "100-200-300", &mut warnings).unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidNumber {
            parameter: "Orifice Size".into(),
            text: "200-300".into()
        }
    );
    assert!(warnings.is_empty());
}

#[test]
fn desired_value_bounds_are_inclusive() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    assert_eq!(parse_desired(&t, "Flow Rate", "0.1", &mut warnings).unwrap(), Some(0.1));
    assert_eq!(parse_desired(&t, "Flow Rate", "10", &mut warnings).unwrap(), Some(10.0));
    assert!(warnings.is_empty());
}

#[test]
fn desired_value_outside_range_is_dropped() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    assert_eq!(parse_desired(&t, "Flow Rate", "15", &mut warnings).unwrap(), None);
    assert_eq!(parse_desired(&t, "Flow Rate", "0.05", &mut warnings).unwrap(), None);
    assert_eq!(
        warnings,
        vec![
            warning("Flow Rate", WarningKind::OutOfRange),
            warning("Flow Rate", WarningKind::OutOfRange),
        ]
    );
}

#[test]
fn unknown_parameter_is_an_error() {
    let t = table();
    let mut warnings: Vec<RangeWarning> = Vec::new();
    assert_eq!(
        parse_desired(&t, "Viscosity", "1", &mut warnings),
        Err(ValidationError::UnknownParameter("Viscosity".into()))
    );
}
