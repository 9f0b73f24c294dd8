//! 자유 입력 텍스트를 제약 구간/목표값으로 변환하고 범위를 검증한다.
//!
//! 범위를 벗어난 값은 경고를 남기고 버린다(요청 전체를 중단하지 않는다).
//! 숫자로 읽을 수 없는 텍스트는 `ValidationError`로 현재 동작을 중단시킨다.

use thiserror::Error;

use crate::metadata::ParameterTable;

/// 입력 파라미터 하나에 대한 허용 구간. 항상 `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub low: f64,
    pub high: f64,
}

impl Constraint {
    /// 단일 값 `x`는 `(x, x)` 구간으로 취급한다.
    pub const fn point(value: f64) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    pub fn is_point(&self) -> bool {
        self.low == self.high
    }
}

/// 경고 종류. 사용자에게 위반 방향을 알려준다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// 제약 하한이 허용 최소값 이하
    TooLow,
    /// 제약 상한이 허용 최대값 이상
    TooHigh,
    /// 목표값이 허용 범위 밖
    OutOfRange,
    /// 제약 하한이 상한보다 큼
    Inverted,
}

/// 범위 검증에서 버려진 필드에 대한 경고.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWarning {
    pub parameter: String,
    pub kind: WarningKind,
}

impl RangeWarning {
    fn new(parameter: &str, kind: WarningKind) -> Self {
        Self {
            parameter: parameter.to_string(),
            kind,
        }
    }
}

/// 경고를 받는 쪽(모달 대화상자, 콘솔, 테스트용 Vec 등).
/// 경고는 필드 처리 순서대로 즉시 전달된다.
pub trait WarningSink {
    fn warn(&mut self, warning: RangeWarning);
}

impl WarningSink for Vec<RangeWarning> {
    fn warn(&mut self, warning: RangeWarning) {
        self.push(warning);
    }
}

/// 입력 검증 중 발생하는 치명적 오류.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{parameter}: 숫자로 읽을 수 없는 값입니다 ({text:?})")]
    InvalidNumber { parameter: String, text: String },
    #[error("알 수 없는 파라미터: {0}")]
    UnknownParameter(String),
}

/// 텍스트를 유한한 f64로 읽는다. 앞뒤 공백은 무시한다.
pub fn parse_number(parameter: &str, text: &str) -> Result<f64, ValidationError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            parameter: parameter.to_string(),
            text: text.to_string(),
        })
}

/// 범위 구분자 `-` 위치를 찾는다. 맨 앞의 부호와 지수 표기(`1e-3`)의 `-`는 제외한다.
fn split_range(text: &str) -> Option<(&str, &str)> {
    let mut prev: Option<char> = None;
    for (i, c) in text.char_indices() {
        if c == '-' && i > 0 && !matches!(prev, Some('e' | 'E')) {
            return Some((&text[..i], &text[i + 1..]));
        }
        prev = Some(c);
    }
    None
}

/// 제약 텍스트를 구간으로 변환하고 검증한다.
///
/// - 빈 텍스트: `Ok(None)`
/// - `"x-y"`: `(x, y)`, `"x"`: `(x, x)`
/// - 하한이 최소값 이하이거나 상한이 최대값 이상이면 경고 후 `Ok(None)`.
///   허용되는 구간은 양 끝 모두 선언 범위의 안쪽에 있어야 한다.
pub fn parse_constraint(
    table: &ParameterTable,
    parameter: &str,
    text: &str,
    sink: &mut dyn WarningSink,
) -> Result<Option<Constraint>, ValidationError> {
    let range = table
        .range(parameter)
        .ok_or_else(|| ValidationError::UnknownParameter(parameter.to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let wanted = match split_range(text) {
        Some((low, high)) => Constraint {
            low: parse_number(parameter, low)?,
            high: parse_number(parameter, high)?,
        },
        None => Constraint::point(parse_number(parameter, text)?),
    };

    let rejected = if wanted.low <= range.min {
        Some(WarningKind::TooLow)
    } else if wanted.high >= range.max {
        Some(WarningKind::TooHigh)
    } else if wanted.low > wanted.high {
        Some(WarningKind::Inverted)
    } else {
        None
    };
    if let Some(kind) = rejected {
        tracing::warn!(parameter, ?kind, low = wanted.low, high = wanted.high, "constraint ignored");
        sink.warn(RangeWarning::new(parameter, kind));
        return Ok(None);
    }
    tracing::debug!(parameter, low = wanted.low, high = wanted.high, "constraint accepted");
    Ok(Some(wanted))
}

/// 목표값 텍스트를 f64로 변환하고 `min <= v <= max`로 검증한다.
pub fn parse_desired(
    table: &ParameterTable,
    parameter: &str,
    text: &str,
    sink: &mut dyn WarningSink,
) -> Result<Option<f64>, ValidationError> {
    let range = table
        .range(parameter)
        .ok_or_else(|| ValidationError::UnknownParameter(parameter.to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let wanted = parse_number(parameter, text)?;
    if range.contains(wanted) {
        tracing::debug!(parameter, value = wanted, "desired value accepted");
        Ok(Some(wanted))
    } else {
        tracing::warn!(parameter, value = wanted, "desired value ignored");
        sink.warn(RangeWarning::new(parameter, WarningKind::OutOfRange));
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_skips_sign_and_exponent() {
        assert_eq!(split_range("1-2"), Some(("1", "2")));
        assert_eq!(split_range("-5"), None);
        assert_eq!(split_range("1e-3"), None);
        assert_eq!(split_range("1e-3-2E-2"), Some(("1e-3", "2E-2")));
        assert_eq!(split_range("-5--3"), Some(("-5", "-3")));
    }

    #[test]
    fn non_finite_is_not_a_number() {
        assert!(parse_number("A", "nan").is_err());
        assert!(parse_number("A", "inf").is_err());
        assert_eq!(parse_number("A", " 2.5 "), Ok(2.5));
    }
}
