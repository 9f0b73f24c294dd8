//! 순방향/역방향 예측기 인터페이스.
//!
//! 실제 모델 구현은 이 트레이트 뒤에 숨는다. 기본 제공 구현은 `dataset` 참고.

pub mod dataset;

use std::collections::BTreeMap;
use thiserror::Error;

use crate::validation::Constraint;

pub use dataset::DatasetModel;

/// 예측기 호출 실패. 현재 동작은 중단되며 재시도하지 않는다.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("입력 벡터 길이 불일치: 필요 {expected}, 입력 {found}")]
    InputLength { expected: usize, found: usize },
    #[error("데이터셋이 비어 있습니다")]
    EmptyDataset,
    #[error("모델이 알 수 없는 파라미터: {0}")]
    UnknownParameter(String),
    #[error("예측 결과에 {0} 값이 없습니다")]
    MissingResult(String),
    #[error("모델 오류: {0}")]
    Model(String),
}

/// 예측 결과. 이름-값 쌍을 삽입 순서대로 보존한다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    entries: Vec<(String, f64)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 같은 이름이 있으면 값을 덮어쓰고 순서는 유지한다.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// 목표 출력값과 입력 제약으로부터 모든 입력 파라미터 값을 추정한다.
pub trait InversePredictor {
    fn interpolate(
        &self,
        desired: &BTreeMap<String, f64>,
        constraints: &BTreeMap<String, Constraint>,
    ) -> Result<ResultSet, PredictError>;
}

/// 선언 순서의 입력 벡터로 출력값을 예측한다.
pub trait ForwardPredictor {
    fn predict(&self, inputs: &[f64]) -> Result<ResultSet, PredictError>;
}
