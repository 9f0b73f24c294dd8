//! 제출 동작(역방향/순방향 실행)을 UI와 분리된 명령 처리기로 제공한다.
//!
//! 처리기는 제출 시점의 필드 스냅샷을 받아 렌더링된 결과 텍스트 또는 오류를 돌려준다.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::metadata::{format_value, ParameterTable};
use crate::predict::{ForwardPredictor, InversePredictor, PredictError, ResultSet};
use crate::validation::{
    parse_constraint, parse_desired, parse_number, Constraint, ValidationError, WarningSink,
};

/// 제출 동작을 중단시키는 오류. 부분 결과는 표시하지 않는다.
#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// 제출 시점의 (파라미터 이름, 입력 텍스트) 목록.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    fields: Vec<(String, String)>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 입력/출력 파라미터를 빈 값으로 채운 스냅샷.
    pub fn blank(table: &ParameterTable) -> Self {
        table
            .inputs()
            .iter()
            .chain(table.outputs())
            .map(|name| (name.clone(), String::new()))
            .collect()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(name, text);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        let text = text.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = text,
            None => self.fields.push((name, text)),
        }
    }

    /// 필드가 없으면 빈 문자열과 같이 취급한다.
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for FormSnapshot {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut form = FormSnapshot::new();
        for (name, text) in iter {
            form.set(name, text);
        }
        form
    }
}

/// 입력 파라미터 순서대로 제약을 모은다. 범위를 벗어난 값은 경고 후 제외된다.
pub fn collect_constraints(
    table: &ParameterTable,
    form: &FormSnapshot,
    sink: &mut dyn WarningSink,
) -> Result<BTreeMap<String, Constraint>, ValidationError> {
    let mut constraints = BTreeMap::new();
    for name in table.inputs() {
        if let Some(c) = parse_constraint(table, name, form.get(name), sink)? {
            constraints.insert(name.clone(), c);
        }
    }
    Ok(constraints)
}

/// 출력 파라미터 순서대로 목표값을 모은다. 빈 칸은 건너뛴다.
pub fn collect_desired(
    table: &ParameterTable,
    form: &FormSnapshot,
    sink: &mut dyn WarningSink,
) -> Result<BTreeMap<String, f64>, ValidationError> {
    let mut desired = BTreeMap::new();
    for name in table.outputs() {
        if let Some(v) = parse_desired(table, name, form.get(name), sink)? {
            desired.insert(name.clone(), v);
        }
    }
    Ok(desired)
}

/// 모든 입력 필드를 범위 검사 없이 숫자로 읽어 선언 순서의 벡터를 만든다.
pub fn forward_vector(
    table: &ParameterTable,
    form: &FormSnapshot,
) -> Result<Vec<f64>, ValidationError> {
    table
        .inputs()
        .iter()
        .map(|name| parse_number(name, form.get(name)))
        .collect()
}

/// "Run DAFD": 제약과 목표값을 모아 역방향 예측기를 호출하고
/// 입력 파라미터 선언 순서로 결과를 렌더링한다.
pub fn run_inverse<P: InversePredictor + ?Sized>(
    table: &ParameterTable,
    predictor: &P,
    form: &FormSnapshot,
    sink: &mut dyn WarningSink,
) -> Result<String, DispatchError> {
    let constraints = collect_constraints(table, form, sink)?;
    let desired = collect_desired(table, form, sink)?;
    tracing::info!(
        constraints = constraints.len(),
        desired = desired.len(),
        "running inverse prediction"
    );
    let results = predictor.interpolate(&desired, &constraints)?;
    render_inputs(table, &results)
}

/// "Run Forward Model": 입력 벡터로 순방향 예측기를 호출하고
/// 결과 매핑의 순서대로 렌더링한다.
pub fn run_forward<P: ForwardPredictor + ?Sized>(
    table: &ParameterTable,
    predictor: &P,
    form: &FormSnapshot,
) -> Result<String, DispatchError> {
    let features = forward_vector(table, form)?;
    tracing::info!(inputs = features.len(), "running forward prediction");
    let outputs = predictor.predict(&features)?;
    Ok(render_results(&outputs))
}

/// 선언된 입력 순서로 `"<name> : <value>"` 줄을 만든다.
/// 결과에 빠진 입력이 있으면 예측기 오류로 본다.
pub fn render_inputs(table: &ParameterTable, results: &ResultSet) -> Result<String, DispatchError> {
    let lines = table
        .inputs()
        .iter()
        .map(|name| {
            results
                .get(name)
                .map(|v| format!("{name} : {}", format_value(v)))
                .ok_or_else(|| PredictError::MissingResult(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// 결과 매핑 자체의 순서로 `"<name> : <value>"` 줄을 만든다.
pub fn render_results(results: &ResultSet) -> String {
    results
        .iter()
        .map(|(name, v)| format!("{name} : {}", format_value(v)))
        .collect::<Vec<_>>()
        .join("\n")
}
