//! ML 모듈 에러 타입.

use crate::ml::types::Quantile;
use hedge_core::{HedgeError, Position};
use thiserror::Error;

/// 예측 파이프라인에서 발생할 수 있는 에러.
///
/// 어떤 에러도 자동으로 재시도되지 않습니다.
#[derive(Debug, Error)]
pub enum MlError {
    /// 열거형 범위 밖의 포지션/방향/quantile 등 잘못된 호출 인자
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 학습된 모델이 없는 포지션-스탯 조합
    #[error("Unsupported combination {position}_{stat}. Available stats: {valid_stats:?}")]
    UnsupportedCombination {
        position: Position,
        stat: String,
        valid_stats: Vec<String>,
    },

    /// 아티팩트(모델 파일 또는 스키마 항목)를 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 사용 가능한 quantile 모델이 하나도 없음
    #[error("No quantile models available for {position}_{stat}")]
    ModelUnavailable { position: Position, stat: String },

    /// 모델 추론 실패 (실패한 quantile 포함)
    #[error("Prediction failed for quantile {quantile}: {reason}")]
    PredictionFailed { quantile: Quantile, reason: String },

    /// 아티팩트는 존재하지만 읽거나 해석할 수 없음
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// regressor 내부 추론 에러
    #[error("Inference error: {0}")]
    Inference(String),

    /// ONNX Runtime 에러
    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(String),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 호출자 입력으로 인한 에러인지 확인.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            MlError::InvalidArgument(_) | MlError::UnsupportedCombination { .. }
        )
    }

    /// 아티팩트 누락으로 인한 에러인지 확인.
    pub fn is_missing_artifact(&self) -> bool {
        matches!(self, MlError::NotFound(_) | MlError::ModelUnavailable { .. })
    }

    /// 호출자가 선택할 수 있는 대안 스탯 목록 (지원되지 않는 조합인 경우).
    pub fn remediation(&self) -> Option<&[String]> {
        match self {
            MlError::UnsupportedCombination { valid_stats, .. } => Some(valid_stats),
            _ => None,
        }
    }
}

impl From<HedgeError> for MlError {
    fn from(err: HedgeError) -> Self {
        match err {
            HedgeError::InvalidInput(msg) => MlError::InvalidArgument(msg),
            other => MlError::ModelLoad(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MlError {
    fn from(err: serde_json::Error) -> Self {
        MlError::ModelLoad(format!("Failed to parse artifact: {}", err))
    }
}

// ONNX Runtime 에러로부터 변환
#[cfg(feature = "onnx")]
impl From<ort::Error> for MlError {
    fn from(err: ort::Error) -> Self {
        MlError::OnnxRuntime(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MlError::NotFound("QB_passing_yards_q10".to_string());
        assert_eq!(err.to_string(), "Not found: QB_passing_yards_q10");

        let err = MlError::PredictionFailed {
            quantile: Quantile::Q90,
            reason: "shape mismatch".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Prediction failed for quantile q90: shape mismatch"
        );
    }

    #[test]
    fn test_remediation() {
        let err = MlError::UnsupportedCombination {
            position: Position::TE,
            stat: "targets".to_string(),
            valid_stats: Position::TE.supported_stat_names(),
        };
        assert!(err.is_caller_error());
        assert_eq!(err.remediation().map(|s| s.len()), Some(3));

        let err = MlError::ModelUnavailable {
            position: Position::QB,
            stat: "passing_yards".to_string(),
        };
        assert!(!err.is_caller_error());
        assert!(err.is_missing_artifact());
        assert!(err.remediation().is_none());
    }

    #[test]
    fn test_from_hedge_error() {
        let err: MlError = HedgeError::InvalidInput("bad position".to_string()).into();
        assert!(matches!(err, MlError::InvalidArgument(_)));
    }
}
