//! # Hedge Analytics
//!
//! 선수 프롭 베팅을 위한 분석 엔진입니다.
//!
//! # Re-exports
//!
//! - [`ml::features`]: 경기 기록 → feature vector
//! - [`ml::registry`]: 학습된 quantile 모델 로드 및 캐시
//! - [`ml::scoring`]: quantile 예측 → 승리 확률과 추천
//! - [`ml::service`]: 위 단계를 묶는 예측 서비스

pub mod ml;

// ML 모듈 re-exports
pub use ml::{
    BettingScenario, ConfidenceLevel, FeatureEngineer, FeatureVector, FileModelStore,
    InMemoryModelStore, MlError, MlResult, ModelRegistry, ModelStore, PredictionRequest,
    PredictionResult, PredictionService, Quantile, QuantileRegressor, Recommendation,
};
