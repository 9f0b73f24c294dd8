//! 명령 처리기(역방향/순방향 실행) 시나리오 테스트. 예측기는 기록용 목(mock)을 쓴다.
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use dafd_toolbox::dispatch::{self, DispatchError, FormSnapshot};
use dafd_toolbox::metadata::{ParamRange, ParameterTable};
use dafd_toolbox::predict::{
    ForwardPredictor, InversePredictor, PredictError, ResultSet,
};
use dafd_toolbox::validation::{Constraint, RangeWarning, ValidationError, WarningKind};

fn table() -> ParameterTable {
    let mut ranges = HashMap::new();
    for (name, lo, hi) in [
        ("A", 0.0, 10.0),
        ("B", 0.0, 10.0),
        ("C", 0.0, 10.0),
        ("Generation Rate", 0.1, 10.0),
        ("Droplet Size", 5.0, 500.0),
    ] {
        ranges.insert(name.to_string(), ParamRange::new(lo, hi));
    }
    ParameterTable::new(
        vec!["A".into(), "B".into(), "C".into()],
        vec!["Generation Rate".into(), "Droplet Size".into()],
        ranges,
    )
    .expect("valid table")
}

/// 호출 인자를 기록하고 고정된 결과를 돌려주는 예측기.
#[derive(Default)]
struct Recorder {
    inverse_calls: RefCell<Vec<(BTreeMap<String, f64>, BTreeMap<String, Constraint>)>>,
    forward_calls: RefCell<Vec<Vec<f64>>>,
    response: ResultSet,
}

impl InversePredictor for Recorder {
    fn interpolate(
        &self,
        desired: &BTreeMap<String, f64>,
        constraints: &BTreeMap<String, Constraint>,
    ) -> Result<ResultSet, PredictError> {
        self.inverse_calls
            .borrow_mut()
            .push((desired.clone(), constraints.clone()));
        Ok(self.response.clone())
    }
}

impl ForwardPredictor for Recorder {
    fn predict(&self, inputs: &[f64]) -> Result<ResultSet, PredictError> {
        self.forward_calls.borrow_mut().push(inputs.to_vec());
        Ok(self.response.clone())
    }
}

struct Failing;

impl ForwardPredictor for Failing {
    fn predict(&self, _inputs: &[f64]) -> Result<ResultSet, PredictError> {
        Err(PredictError::Model("network weights missing".into()))
    }
}

fn inverse_response() -> ResultSet {
    [("C", 3.5), ("A", 1.25), ("B", 2.0)].into_iter().collect()
}

#[test]
fn empty_form_calls_inverse_with_two_empty_mappings() {
    let t = table();
    let rec = Recorder {
        response: inverse_response(),
        ..Recorder::default()
    };
    let mut warnings: Vec<RangeWarning> = Vec::new();
    dispatch::run_inverse(&t, &rec, &FormSnapshot::blank(&t), &mut warnings).unwrap();
    let calls = rec.inverse_calls.borrow();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.is_empty());
    assert!(calls[0].1.is_empty());
    assert!(warnings.is_empty());
}

#[test]
fn inverse_renders_in_declared_input_order() {
    let t = table();
    let rec = Recorder {
        response: inverse_response(),
        ..Recorder::default()
    };
    let form = FormSnapshot::blank(&t).with("B", "2").with("Droplet Size", "120");
    let text = dispatch::run_inverse(&t, &rec, &form, &mut Vec::<RangeWarning>::new()).unwrap();
    assert_eq!(text, "A : 1.25\nB : 2.0\nC : 3.5");

    let calls = rec.inverse_calls.borrow();
    assert_eq!(calls[0].0.get("Droplet Size"), Some(&120.0));
    assert_eq!(calls[0].1.get("B"), Some(&Constraint::point(2.0)));
}

#[test]
fn out_of_range_fields_are_dropped_and_the_rest_is_forwarded() {
    let t = table();
    let rec = Recorder {
        response: inverse_response(),
        ..Recorder::default()
    };
    let form = FormSnapshot::blank(&t)
        .with("A", "0")
        .with("B", "1-4")
        .with("Generation Rate", "15")
        .with("Droplet Size", "500");
    let mut warnings: Vec<RangeWarning> = Vec::new();
    dispatch::run_inverse(&t, &rec, &form, &mut warnings).unwrap();

    let calls = rec.inverse_calls.borrow();
    let (desired, constraints) = &calls[0];
    assert!(!constraints.contains_key("A"));
    assert_eq!(constraints.get("B"), Some(&Constraint { low: 1.0, high: 4.0 }));
    assert!(!desired.contains_key("Generation Rate"));
    assert_eq!(desired.get("Droplet Size"), Some(&500.0));
    let kinds: Vec<_> = warnings.iter().map(|w| (w.parameter.as_str(), w.kind)).collect();
    assert_eq!(
        kinds,
        vec![("A", WarningKind::TooLow), ("Generation Rate", WarningKind::OutOfRange)]
    );
}

#[test]
fn unparseable_text_aborts_inverse_without_calling_predictor() {
    let t = table();
    let rec = Recorder::default();
    let form = FormSnapshot::blank(&t).with("C", "wide");
    let err = dispatch::run_inverse(&t, &rec, &form, &mut Vec::<RangeWarning>::new()).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Validation(ValidationError::InvalidNumber { ref parameter, .. }) if parameter == "C"
    ));
    assert!(rec.inverse_calls.borrow().is_empty());
}

#[test]
fn inverse_result_missing_an_input_is_a_predictor_failure() {
    let t = table();
    let rec = Recorder {
        response: [("A", 1.0), ("B", 2.0)].into_iter().collect(),
        ..Recorder::default()
    };
    let err = dispatch::run_inverse(&t, &rec, &FormSnapshot::blank(&t), &mut Vec::<RangeWarning>::new())
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::Predict(PredictError::MissingResult("C".into()))
    );
}

#[test]
fn forward_passes_ordered_vector_and_renders_each_key() {
    let t = table();
    let rec = Recorder {
        response: [("Droplet Size", 84.5), ("Generation Rate", 3.0)]
            .into_iter()
            .collect(),
        ..Recorder::default()
    };
    // 스냅샷 순서와 무관하게 선언 순서로 벡터가 만들어진다.
    let form: FormSnapshot = [("C", "3.0"), ("A", "1.0"), ("B", "2.0")]
        .into_iter()
        .collect();
    let text = dispatch::run_forward(&t, &rec, &form).unwrap();
    assert_eq!(rec.forward_calls.borrow()[0], vec![1.0, 2.0, 3.0]);
    assert_eq!(text, "Droplet Size : 84.5\nGeneration Rate : 3.0");
}

#[test]
fn forward_skips_range_checks() {
    let t = table();
    let rec = Recorder::default();
    let form = FormSnapshot::new().with("A", "-5").with("B", "99").with("C", "0");
    dispatch::run_forward(&t, &rec, &form).unwrap();
    assert_eq!(rec.forward_calls.borrow()[0], vec![-5.0, 99.0, 0.0]);
}

#[test]
fn forward_with_missing_field_aborts() {
    let t = table();
    let rec = Recorder::default();
    let form = FormSnapshot::new().with("A", "1").with("C", "3");
    let err = dispatch::run_forward(&t, &rec, &form).unwrap_err();
    assert_eq!(
        err,
        DispatchError::Validation(ValidationError::InvalidNumber {
            parameter: "B".into(),
            text: String::new()
        })
    );
    assert!(rec.forward_calls.borrow().is_empty());
}

#[test]
fn forward_predictor_failure_propagates() {
    let t = table();
    let form = FormSnapshot::new().with("A", "1").with("B", "2").with("C", "3");
    let err = dispatch::run_forward(&t, &Failing, &form).unwrap_err();
    assert!(matches!(err, DispatchError::Predict(PredictError::Model(_))));
}

#[test]
fn repeated_actions_render_identically() {
    let t = table();
    let rec = Recorder {
        response: inverse_response(),
        ..Recorder::default()
    };
    let form = FormSnapshot::blank(&t).with("A", "2-8").with("Droplet Size", "50");
    let first = dispatch::run_inverse(&t, &rec, &form, &mut Vec::<RangeWarning>::new()).unwrap();
    let second = dispatch::run_inverse(&t, &rec, &form, &mut Vec::<RangeWarning>::new()).unwrap();
    assert_eq!(first, second);

    let fwd = FormSnapshot::new().with("A", "1").with("B", "2").with("C", "3");
    assert_eq!(
        dispatch::run_forward(&t, &rec, &fwd).unwrap(),
        dispatch::run_forward(&t, &rec, &fwd).unwrap()
    );
}
