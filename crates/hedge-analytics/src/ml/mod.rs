//! 선수 프롭 예측 엔진.
//!
//! 선수의 최근 경기 기록에서 다음 경기 스탯을 세 quantile(q10/q50/q90)로
//! 예측하고, 이를 베팅 기준값에 대한 승리 확률, 신뢰도, edge, 추천으로
//! 변환합니다.
//!
//! # 아키텍처
//!
//! ```text
//! Player History (GameRecord[])
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ Feature Engineer │ ← rolling 평균/표준편차, 시간, 팀 컨텍스트
//! └────────┬─────────┘
//!          │ FeatureVector
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │ Prediction       │◄────│ Model Registry   │ ← 지연 로드 + 캐시
//! │ Service          │     │ (ModelStore)     │
//! └────────┬─────────┘     └──────────────────┘
//!          │ q10 / q50 / q90
//!          ▼
//! ┌──────────────────┐
//! │ Scoring          │ ← 승리 확률, 신뢰도, edge, 추천
//! └────────┬─────────┘
//!          ▼
//!   PredictionResult
//! ```
//!
//! # 예제
//!
//! ```ignore
//! use hedge_analytics::ml::{PredictionRequest, PredictionService};
//! use hedge_core::{AppConfig, BetDirection, Position};
//!
//! let service = PredictionService::from_config(&AppConfig::load_default()?);
//! let request = PredictionRequest::new(
//!     Position::QB, "passing_yards", history, 2024, 10, 275.5, BetDirection::Over,
//! );
//! let result = service.predict(&request)?;
//! println!("{} ({})", result.recommendation, result.confidence_level);
//! ```

pub mod error;
pub mod features;
pub mod predictor;
pub mod registry;
pub mod scoring;
pub mod service;
pub mod store;
pub mod types;

pub use error::{MlError, MlResult};
pub use features::{FeatureEngineer, RollingStat, RollingWindow, UpcomingGame};
pub use predictor::{LinearQuantileModel, QuantileRegressor};
#[cfg(feature = "onnx")]
pub use predictor::{OnnxRegressor, OnnxRegressorConfig};
pub use registry::{CacheInfo, LoadedModel, ModelRegistry};
pub use scoring::{QuantileAnchors, ScoreBreakdown};
pub use service::{BettingScenario, PredictionRequest, PredictionService};
pub use store::{FileModelStore, InMemoryModelStore, ModelMetadata, ModelStore};
pub use types::{
    AlignedRow, ConfidenceLevel, FeatureVector, ModelKey, PredictionDetails, PredictionResult,
    Quantile, Recommendation,
};
