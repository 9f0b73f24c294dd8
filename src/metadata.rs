//! 파라미터 메타데이터(유효 범위, 입력/출력 순서)와 모델 파일 로딩.
//!
//! 전역 싱글턴 없이 시작 시 한 번 `ParameterTable`을 만들고 참조로 넘긴다.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 바이너리에 내장된 기본 모델 파일.
const BUILT_IN_MODEL: &str = include_str!("../assets/dafd_model.toml");

/// 파라미터 하나의 유효 범위(양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `min <= value <= max` 이면 true.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// 메타데이터/모델 파일 처리 중 발생 가능한 오류.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("모델 파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("모델 파일 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("중복된 파라미터 이름: {0}")]
    DuplicateName(String),
    #[error("범위가 뒤집혀 있습니다: {name} ({min} > {max})")]
    InvertedRange { name: String, min: f64, max: f64 },
    #[error("범위를 알 수 없는 파라미터: {0}")]
    MissingRange(String),
    #[error("선언되지 않은 파라미터의 범위: {0}")]
    UnknownRange(String),
    #[error("샘플 {row}의 값 개수가 {found}개입니다 (필요: {expected}개)")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// 이름별 유효 범위와 입력/출력 파라미터 순서를 담는 읽기 전용 테이블.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    ranges: HashMap<String, ParamRange>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl ParameterTable {
    /// 이름 중복, 입력/출력 겹침, 범위 누락을 검사해 테이블을 만든다.
    pub fn new(
        inputs: Vec<String>,
        outputs: Vec<String>,
        ranges: HashMap<String, ParamRange>,
    ) -> Result<Self, MetadataError> {
        let mut seen = HashSet::new();
        for name in inputs.iter().chain(outputs.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(MetadataError::DuplicateName(name.clone()));
            }
            let range = ranges
                .get(name)
                .ok_or_else(|| MetadataError::MissingRange(name.clone()))?;
            if range.min > range.max {
                return Err(MetadataError::InvertedRange {
                    name: name.clone(),
                    min: range.min,
                    max: range.max,
                });
            }
        }
        if let Some(extra) = ranges.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(MetadataError::UnknownRange(extra.clone()));
        }
        Ok(Self {
            ranges,
            inputs,
            outputs,
        })
    }

    pub fn range(&self, name: &str) -> Option<ParamRange> {
        self.ranges.get(name).copied()
    }

    /// 선언 순서대로의 입력 파라미터 이름.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// 선언 순서대로의 출력 파라미터 이름.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn is_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|n| n == name)
    }

    /// 입력 필드 라벨: `"<name> (<min>-<max>) : "`, 경계는 소수 둘째 자리 반올림.
    pub fn field_label(&self, name: &str) -> Option<String> {
        let r = self.range(name)?;
        Some(format!(
            "{name} ({}-{}) : ",
            format_value(round2(r.min)),
            format_value(round2(r.max))
        ))
    }
}

/// 소수 둘째 자리 반올림. 정확히 중간값이면 짝수 쪽으로 보낸다(0.125 → 0.12).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// 결과 표시용 숫자 포맷. 정수 값도 `3.0`처럼 소수점을 유지한다.
pub fn format_value(v: f64) -> String {
    format!("{v:?}")
}

/// TOML 모델 파일 구조. 샘플 한 줄은 입력 값들 다음에 출력 값들이 온다.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelFile {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    #[serde(default)]
    pub ranges: BTreeMap<String, [f64; 2]>,
    #[serde(default)]
    pub samples: Vec<SampleRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleRow {
    pub values: Vec<f64>,
}

impl ModelFile {
    pub fn parse(src: &str) -> Result<Self, MetadataError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// 내장 모델 파일을 읽는다.
    pub fn built_in() -> Result<Self, MetadataError> {
        Self::parse(BUILT_IN_MODEL)
    }

    /// 파라미터 테이블과 샘플 행을 분리한다.
    /// 명시된 범위가 없는 파라미터는 샘플 최소/최대값을 범위로 쓴다.
    pub fn into_parts(self) -> Result<(ParameterTable, Vec<Vec<f64>>), MetadataError> {
        let width = self.inputs.len() + self.outputs.len();
        let mut rows = Vec::with_capacity(self.samples.len());
        for (row, sample) in self.samples.into_iter().enumerate() {
            if sample.values.len() != width {
                return Err(MetadataError::RowWidth {
                    row,
                    expected: width,
                    found: sample.values.len(),
                });
            }
            rows.push(sample.values);
        }

        let mut ranges = HashMap::new();
        for (col, name) in self.inputs.iter().chain(self.outputs.iter()).enumerate() {
            let range = match self.ranges.get(name) {
                Some([min, max]) => ParamRange::new(*min, *max),
                None => column_range(&rows, col)
                    .ok_or_else(|| MetadataError::MissingRange(name.clone()))?,
            };
            ranges.insert(name.clone(), range);
        }
        for name in self.ranges.keys() {
            if !ranges.contains_key(name) {
                return Err(MetadataError::UnknownRange(name.clone()));
            }
        }

        let table = ParameterTable::new(self.inputs, self.outputs, ranges)?;
        Ok((table, rows))
    }
}

fn column_range(rows: &[Vec<f64>], col: usize) -> Option<ParamRange> {
    let mut iter = rows.iter().map(|r| r[col]);
    let first = iter.next()?;
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some(ParamRange::new(min, max))
}

/// 번들 리소스(로고 등)를 논리 이름으로 찾는다.
/// 작업 디렉터리의 assets/, 실행 파일 옆, 상위 디렉터리 순으로 탐색한다.
pub fn resource_path(name: &str) -> Option<PathBuf> {
    let mut candidates = vec![Path::new("assets").join(name), PathBuf::from(name)];
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join("assets").join(name));
        candidates.push(exe_dir.join(name));
        for up in exe_dir.ancestors().skip(1).take(2) {
            candidates.push(up.join("assets").join(name));
        }
    }
    candidates.into_iter().find(|p| p.is_file())
}
