//! 학습된 quantile regressor.
//!
//! 모델은 별도로 학습되어 아티팩트로 제공됩니다. 엔진은 구체적인 런타임에
//! 의존하지 않고 [`QuantileRegressor`] trait("정렬된 숫자 행 입력, 스칼라
//! 하나 출력")만 사용합니다.
//!
//! 제공되는 구현:
//! - [`LinearQuantileModel`]: 절편 + 계수 JSON 아티팩트 (순수 Rust)
//! - `OnnxRegressor`: ONNX Runtime 기반 (`onnx` feature 필요)

use crate::ml::{MlError, MlResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 다형성을 가능하게 하는 regressor trait.
///
/// 로드된 모델은 읽기 전용이며 여러 요청에서 동시에 공유됩니다.
pub trait QuantileRegressor: Send + Sync {
    /// 스키마 순서로 정렬된 feature 행에서 스칼라 하나를 예측.
    fn predict(&self, row: &[f64]) -> MlResult<f64>;

    /// 모델 이름 반환.
    fn model_name(&self) -> &str;
}

/// 선형 quantile 모델.
///
/// `prediction = intercept + Σ coefficients[i] · row[i]`.
/// 계수는 feature 스키마와 같은 순서입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearQuantileModel {
    #[serde(default)]
    pub model_name: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearQuantileModel {
    pub fn new(model_name: impl Into<String>, intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            model_name: model_name.into(),
            intercept,
            coefficients,
        }
    }

    /// JSON 아티팩트 파일에서 로드.
    pub fn from_file(path: impl AsRef<Path>) -> MlResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                MlError::NotFound(format!("Model file not found: {}", path.display()))
            }
            _ => MlError::ModelLoad(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        let mut model: Self = serde_json::from_slice(&bytes)?;
        if model.model_name.is_empty() {
            model.model_name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        debug!(model = %model.model_name, coefficients = model.coefficients.len(), "Linear model parsed");
        Ok(model)
    }
}

impl QuantileRegressor for LinearQuantileModel {
    fn predict(&self, row: &[f64]) -> MlResult<f64> {
        if row.len() != self.coefficients.len() {
            return Err(MlError::Inference(format!(
                "Expected {} features, got {}",
                self.coefficients.len(),
                row.len()
            )));
        }

        let value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>();

        if value.is_finite() {
            Ok(value)
        } else {
            Err(MlError::Inference(format!(
                "Non-finite prediction from {}",
                self.model_name
            )))
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(feature = "onnx")]
pub use onnx::{OnnxRegressor, OnnxRegressorConfig};

#[cfg(feature = "onnx")]
mod onnx {
    use super::QuantileRegressor;
    use crate::ml::{MlError, MlResult};
    use ort::session::Session;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tracing::info;

    /// ONNX regressor 설정.
    #[derive(Debug, Clone)]
    pub struct OnnxRegressorConfig {
        /// ONNX 모델 파일 경로
        pub model_path: PathBuf,
        /// 입력 텐서 이름
        pub input_name: String,
        /// 로깅/식별을 위한 모델 이름
        pub model_name: String,
    }

    impl OnnxRegressorConfig {
        pub fn new(model_path: impl Into<PathBuf>) -> Self {
            let model_path = model_path.into();
            let model_name = model_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "onnx_regressor".to_string());
            Self {
                model_path,
                input_name: "input".to_string(),
                model_name,
            }
        }

        pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
            self.input_name = name.into();
            self
        }
    }

    /// ONNX 기반 quantile regressor.
    ///
    /// 모델은 다음을 가져야 합니다:
    /// - 입력: [1, n_features] 형태의 float32 텐서
    /// - 출력: 첫 번째 출력 텐서의 첫 원소가 예측값
    pub struct OnnxRegressor {
        // Session::run이 가변 차용을 요구하므로 공유를 위해 Mutex로 감쌈
        session: Mutex<Session>,
        config: OnnxRegressorConfig,
    }

    impl OnnxRegressor {
        /// 지정된 경로에서 ONNX 모델 로드.
        pub fn load(config: OnnxRegressorConfig) -> MlResult<Self> {
            let path = &config.model_path;

            if !path.exists() {
                return Err(MlError::NotFound(format!(
                    "Model file not found: {}",
                    path.display()
                )));
            }

            info!("Loading ONNX model from: {}", path.display());

            let session = Session::builder()
                .map_err(|e| MlError::ModelLoad(format!("Failed to create session builder: {}", e)))?
                .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
                .map_err(|e| MlError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
                .commit_from_file(path)
                .map_err(|e| MlError::ModelLoad(format!("Failed to load model: {}", e)))?;

            Ok(Self {
                session: Mutex::new(session),
                config,
            })
        }
    }

    impl QuantileRegressor for OnnxRegressor {
        fn predict(&self, row: &[f64]) -> MlResult<f64> {
            let input_data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
            let input_shape = [1i64, row.len() as i64];

            let input_tensor =
                ort::value::Tensor::from_array((input_shape, input_data.into_boxed_slice()))
                    .map_err(|e| MlError::Inference(format!("Failed to create input tensor: {}", e)))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| MlError::Inference("ONNX session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![self.config.input_name.as_str() => input_tensor])
                .map_err(|e| MlError::Inference(format!("Inference failed: {}", e)))?;

            let output_name = outputs
                .iter()
                .next()
                .map(|(name, _)| name.to_string())
                .ok_or_else(|| MlError::Inference("No output tensor found".to_string()))?;

            let output = outputs
                .get(&output_name)
                .ok_or_else(|| MlError::Inference("Failed to get output by name".to_string()))?;

            let (_, output_slice) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| MlError::Inference(format!("Failed to extract output tensor: {}", e)))?;

            output_slice
                .first()
                .map(|v| f64::from(*v))
                .ok_or_else(|| MlError::Inference("Empty output tensor".to_string()))
        }

        fn model_name(&self) -> &str {
            &self.config.model_name
        }
    }
}
