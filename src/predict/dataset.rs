//! 샘플 데이터셋 기반 기본 예측기.
//!
//! - 순방향: 범위로 정규화한 입력 공간에서 역거리 가중(IDW, p=2) 보간
//! - 역방향: 제약 상자 안에서 목표에 가장 가까운 샘플을 시작점으로 잡고
//!   순방향 모델에 대해 경계 내 패턴 탐색으로 다듬는다.

use std::collections::BTreeMap;

use super::{ForwardPredictor, InversePredictor, PredictError, ResultSet};
use crate::metadata::{MetadataError, ModelFile, ParameterTable};
use crate::validation::Constraint;

const IDW_POWER: i32 = 2;
const EXACT_MATCH_EPS: f64 = 1e-12;
/// 패턴 탐색 초기 보폭(상자 폭 대비 비율)
const INITIAL_STEP: f64 = 0.25;
const MIN_STEP: f64 = 1e-4;
const MAX_ITERATIONS: usize = 400;

#[derive(Debug, Clone)]
struct Sample {
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

/// 파라미터 테이블 + 샘플 행으로 구성된 보간 모델.
#[derive(Debug, Clone)]
pub struct DatasetModel {
    table: ParameterTable,
    samples: Vec<Sample>,
}

impl DatasetModel {
    /// 각 행은 입력 값들 다음에 출력 값들이 온다.
    pub fn new(table: ParameterTable, rows: Vec<Vec<f64>>) -> Result<Self, MetadataError> {
        let n_in = table.inputs().len();
        let expected = n_in + table.outputs().len();
        let mut samples = Vec::with_capacity(rows.len());
        for (row, mut values) in rows.into_iter().enumerate() {
            if values.len() != expected {
                return Err(MetadataError::RowWidth {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            let outputs = values.split_off(n_in);
            samples.push(Sample {
                inputs: values,
                outputs,
            });
        }
        Ok(Self { table, samples })
    }

    pub fn from_model_file(file: ModelFile) -> Result<Self, MetadataError> {
        let (table, rows) = file.into_parts()?;
        Self::new(table, rows)
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn input_spans(&self) -> Vec<f64> {
        self.spans(self.table.inputs())
    }

    fn output_spans(&self) -> Vec<f64> {
        self.spans(self.table.outputs())
    }

    /// 정규화에 쓰는 범위 폭. 폭이 0인 파라미터는 1로 둔다.
    fn spans(&self, names: &[String]) -> Vec<f64> {
        names
            .iter()
            .map(|name| match self.table.range(name) {
                Some(r) if r.span() > 0.0 => r.span(),
                _ => 1.0,
            })
            .collect()
    }

    /// IDW 보간. 샘플과 정확히 일치하면 그 샘플의 출력을 그대로 쓴다.
    /// 거리가 넘쳐 가중치가 모두 0이 되면 가장 가까운 샘플의 출력을 쓴다.
    fn estimate(&self, x: &[f64], spans: &[f64]) -> Vec<f64> {
        let n_out = self.table.outputs().len();
        let mut weighted = vec![0.0; n_out];
        let mut total = 0.0;
        let mut nearest: Option<(f64, &Sample)> = None;
        for sample in &self.samples {
            let d2: f64 = sample
                .inputs
                .iter()
                .zip(x)
                .zip(spans)
                .map(|((a, b), s)| ((a - b) / s).powi(2))
                .sum();
            if d2 < EXACT_MATCH_EPS {
                return sample.outputs.clone();
            }
            if nearest.map_or(true, |(best, _)| d2 < best) {
                nearest = Some((d2, sample));
            }
            let w = 1.0 / d2.sqrt().powi(IDW_POWER);
            total += w;
            for (acc, y) in weighted.iter_mut().zip(&sample.outputs) {
                *acc += w * y;
            }
        }
        if total > 0.0 && total.is_finite() {
            return weighted.into_iter().map(|v| v / total).collect();
        }
        match nearest {
            Some((d2, sample)) => {
                tracing::debug!(distance2 = d2, "weights underflowed, using nearest sample");
                sample.outputs.clone()
            }
            // 빈 데이터셋은 호출 전에 걸러진다.
            None => vec![f64::NAN; n_out],
        }
    }

    /// 지정된 출력에 대한 정규화 제곱 오차 합.
    fn output_error(outputs: &[f64], desired: &[(usize, f64)], spans: &[f64]) -> f64 {
        desired
            .iter()
            .map(|&(i, target)| ((outputs[i] - target) / spans[i]).powi(2))
            .sum()
    }

    fn starting_point(
        &self,
        bounds: &[(f64, f64)],
        desired: &[(usize, f64)],
        out_spans: &[f64],
    ) -> Vec<f64> {
        let inside = |s: &&Sample| {
            s.inputs
                .iter()
                .zip(bounds)
                .all(|(v, (lo, hi))| v >= lo && v <= hi)
        };
        let by_error = |a: &&Sample, b: &&Sample| {
            Self::output_error(&a.outputs, desired, out_spans)
                .total_cmp(&Self::output_error(&b.outputs, desired, out_spans))
        };
        let best = self
            .samples
            .iter()
            .filter(inside)
            .min_by(by_error)
            .or_else(|| self.samples.iter().min_by(by_error));
        match best {
            Some(sample) => sample
                .inputs
                .iter()
                .zip(bounds)
                .map(|(v, (lo, hi))| v.clamp(*lo, *hi))
                .collect(),
            None => bounds.iter().map(|(lo, hi)| (lo + hi) / 2.0).collect(),
        }
    }

    /// 좌표별 ± 이동을 시도하고, 개선이 없으면 보폭을 절반으로 줄인다.
    fn pattern_search(
        &self,
        start: Vec<f64>,
        bounds: &[(f64, f64)],
        desired: &[(usize, f64)],
        in_spans: &[f64],
        out_spans: &[f64],
    ) -> Vec<f64> {
        let objective =
            |x: &[f64]| Self::output_error(&self.estimate(x, in_spans), desired, out_spans);
        let mut x = start;
        let mut best = objective(&x[..]);
        let mut step = INITIAL_STEP;
        for _ in 0..MAX_ITERATIONS {
            if step < MIN_STEP || best <= f64::EPSILON {
                break;
            }
            let mut improved = false;
            for i in 0..x.len() {
                let (lo, hi) = bounds[i];
                let width = hi - lo;
                if width <= 0.0 {
                    continue;
                }
                for dir in [1.0, -1.0] {
                    let moved = (x[i] + dir * step * width).clamp(lo, hi);
                    if moved == x[i] {
                        continue;
                    }
                    let mut cand = x.clone();
                    cand[i] = moved;
                    let err = objective(&cand[..]);
                    if err < best {
                        x = cand;
                        best = err;
                        improved = true;
                        break;
                    }
                }
            }
            if !improved {
                step *= 0.5;
            }
        }
        tracing::debug!(error = best, "pattern search finished");
        x
    }
}

impl ForwardPredictor for DatasetModel {
    fn predict(&self, inputs: &[f64]) -> Result<ResultSet, PredictError> {
        let expected = self.table.inputs().len();
        if inputs.len() != expected {
            return Err(PredictError::InputLength {
                expected,
                found: inputs.len(),
            });
        }
        if self.samples.is_empty() {
            return Err(PredictError::EmptyDataset);
        }
        let outputs = self.estimate(inputs, &self.input_spans());
        Ok(self
            .table
            .outputs()
            .iter()
            .cloned()
            .zip(outputs)
            .collect())
    }
}

impl InversePredictor for DatasetModel {
    fn interpolate(
        &self,
        desired: &BTreeMap<String, f64>,
        constraints: &BTreeMap<String, Constraint>,
    ) -> Result<ResultSet, PredictError> {
        if self.samples.is_empty() {
            return Err(PredictError::EmptyDataset);
        }
        if let Some(name) = constraints.keys().find(|k| !self.table.is_input(k)) {
            return Err(PredictError::UnknownParameter(name.clone()));
        }
        let targets = desired
            .iter()
            .map(|(name, value)| {
                self.table
                    .outputs()
                    .iter()
                    .position(|o| o == name)
                    .map(|i| (i, *value))
                    .ok_or_else(|| PredictError::UnknownParameter(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bounds: Vec<(f64, f64)> = self
            .table
            .inputs()
            .iter()
            .map(|name| match constraints.get(name) {
                Some(c) => Ok((c.low, c.high)),
                None => self
                    .table
                    .range(name)
                    .map(|r| (r.min, r.max))
                    .ok_or_else(|| PredictError::UnknownParameter(name.clone())),
            })
            .collect::<Result<_, _>>()?;

        let in_spans = self.input_spans();
        let out_spans = self.output_spans();
        let start = self.starting_point(&bounds, &targets, &out_spans);
        let solution = if targets.is_empty() {
            start
        } else {
            self.pattern_search(start, &bounds, &targets, &in_spans, &out_spans)
        };
        tracing::info!(
            constraints = constraints.len(),
            targets = targets.len(),
            "interpolation finished"
        );
        Ok(self
            .table
            .inputs()
            .iter()
            .cloned()
            .zip(solution)
            .collect())
    }
}
