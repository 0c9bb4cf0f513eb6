//! 모델 아티팩트 저장소.
//!
//! 아티팩트는 결정적인 이름으로 조회되는 읽기 전용 blob입니다:
//!
//! ```text
//! {dir}/QB_passing_yards_q10.onnx   (또는 .json 선형 모델)
//! {dir}/QB_passing_yards_q50.onnx
//! {dir}/QB_passing_yards_q90.onnx
//! {dir}/feature_columns.json        {"QB_passing_yards": ["season", ...]}
//! {dir}/model_metadata.json         (선택)
//! ```

use crate::ml::predictor::{LinearQuantileModel, QuantileRegressor};
use crate::ml::types::ModelKey;
use crate::ml::{MlError, MlResult};
use chrono::{DateTime, Utc};
use hedge_core::ModelStoreConfig;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// feature 스키마 아티팩트 파일 이름.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
/// 학습 메타데이터 아티팩트 파일 이름.
pub const MODEL_METADATA_FILE: &str = "model_metadata.json";

/// 포지션-스탯 키 → 정렬된 feature 이름 목록.
pub type FeatureSchemas = HashMap<String, Vec<String>>;

/// 학습 메타데이터.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// 학습 시각
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    /// 학습 데이터 범위 설명 (예: "2020-2024 player and team stats")
    #[serde(default)]
    pub data_range: Option<String>,
    /// 모델별 평가 지표 등 자유 형식 정보
    #[serde(default)]
    pub models: BTreeMap<String, serde_json::Value>,
}

/// 아티팩트 저장소 trait.
///
/// 레지스트리는 이 trait에만 의존합니다.
pub trait ModelStore: Send + Sync {
    /// 모델을 로드하지 않고 아티팩트 존재 여부만 확인.
    fn contains(&self, key: &ModelKey) -> bool;

    /// 모델 아티팩트 로드. 없으면 `NotFound`.
    fn load(&self, key: &ModelKey) -> MlResult<Arc<dyn QuantileRegressor>>;

    /// feature 스키마 아티팩트 로드. 없으면 `NotFound`.
    fn load_feature_schemas(&self) -> MlResult<FeatureSchemas>;

    /// 학습 메타데이터 로드. 없으면 `Ok(None)`.
    fn load_metadata(&self) -> MlResult<Option<ModelMetadata>>;

    /// 로깅용 설명.
    fn describe(&self) -> String;
}

/// 디렉토리 기반 아티팩트 저장소.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
    onnx_input_name: String,
}

impl FileModelStore {
    /// 주어진 디렉토리를 사용하는 저장소 생성.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            onnx_input_name: "input".to_string(),
        }
    }

    /// 설정에서 생성.
    pub fn from_config(config: &ModelStoreConfig) -> Self {
        Self::new(config.dir.clone()).with_onnx_input_name(config.onnx_input_name.clone())
    }

    /// ONNX 입력 텐서 이름 설정.
    pub fn with_onnx_input_name(mut self, name: impl Into<String>) -> Self {
        self.onnx_input_name = name.into();
        self
    }

    /// 아티팩트 디렉토리.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 키에 해당하는 아티팩트 경로 (.onnx 우선, 다음 .json).
    pub fn artifact_path(&self, key: &ModelKey) -> Option<PathBuf> {
        let stem = key.stem();
        ["onnx", "json"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", stem, ext)))
            .find(|path| path.is_file())
    }

    fn read_artifact(&self, file_name: &str) -> MlResult<Option<Vec<u8>>> {
        let path = self.dir.join(file_name);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MlError::ModelLoad(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path) -> MlResult<Arc<dyn QuantileRegressor>> {
        use crate::ml::predictor::{OnnxRegressor, OnnxRegressorConfig};

        let config = OnnxRegressorConfig::new(path).with_input_name(self.onnx_input_name.clone());
        Ok(Arc::new(OnnxRegressor::load(config)?))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path) -> MlResult<Arc<dyn QuantileRegressor>> {
        Err(MlError::ModelLoad(format!(
            "ONNX Runtime not available for {} (build with 'onnx' feature, input '{}')",
            path.display(),
            self.onnx_input_name
        )))
    }
}

impl ModelStore for FileModelStore {
    fn contains(&self, key: &ModelKey) -> bool {
        self.artifact_path(key).is_some()
    }

    fn load(&self, key: &ModelKey) -> MlResult<Arc<dyn QuantileRegressor>> {
        let path = self.artifact_path(key).ok_or_else(|| {
            MlError::NotFound(format!(
                "Model file not found: {}. Position '{}' may not have a model for stat '{}'.",
                self.dir.join(key.stem()).display(),
                key.position,
                key.stat
            ))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("onnx") => self.load_onnx(&path),
            // 존재 확인과 읽기 사이에 삭제되면 from_file이 NotFound를 반환
            _ => Ok(Arc::new(LinearQuantileModel::from_file(&path)?)),
        }
    }

    fn load_feature_schemas(&self) -> MlResult<FeatureSchemas> {
        let bytes = self.read_artifact(FEATURE_COLUMNS_FILE)?.ok_or_else(|| {
            MlError::NotFound(format!(
                "Feature columns file not found: {}",
                self.dir.join(FEATURE_COLUMNS_FILE).display()
            ))
        })?;

        let schemas: FeatureSchemas = serde_json::from_slice(&bytes)?;
        info!(entries = schemas.len(), "Feature columns loaded");
        Ok(schemas)
    }

    fn load_metadata(&self) -> MlResult<Option<ModelMetadata>> {
        match self.read_artifact(MODEL_METADATA_FILE)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("file:{}", self.dir.display())
    }
}

/// 메모리 기반 아티팩트 저장소.
///
/// 모델을 바이너리에 내장하거나 테스트에서 사용합니다.
#[derive(Default)]
pub struct InMemoryModelStore {
    models: RwLock<HashMap<ModelKey, Arc<dyn QuantileRegressor>>>,
    schemas: RwLock<FeatureSchemas>,
    metadata: RwLock<Option<ModelMetadata>>,
}

impl InMemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모델 아티팩트 등록.
    pub fn insert_model(&self, key: ModelKey, model: Arc<dyn QuantileRegressor>) {
        write_lock(&self.models).insert(key, model);
    }

    /// 모델 아티팩트 제거. 제거되었으면 true.
    pub fn remove_model(&self, key: &ModelKey) -> bool {
        write_lock(&self.models).remove(key).is_some()
    }

    /// 포지션-스탯 키에 feature 스키마 등록.
    pub fn insert_schema(&self, schema_key: impl Into<String>, columns: Vec<String>) {
        write_lock(&self.schemas).insert(schema_key.into(), columns);
    }

    /// 학습 메타데이터 설정.
    pub fn set_metadata(&self, metadata: ModelMetadata) {
        *write_lock(&self.metadata) = Some(metadata);
    }
}

impl ModelStore for InMemoryModelStore {
    fn contains(&self, key: &ModelKey) -> bool {
        read_lock(&self.models).contains_key(key)
    }

    fn load(&self, key: &ModelKey) -> MlResult<Arc<dyn QuantileRegressor>> {
        read_lock(&self.models)
            .get(key)
            .cloned()
            .ok_or_else(|| MlError::NotFound(format!("Model artifact not found: {}", key)))
    }

    fn load_feature_schemas(&self) -> MlResult<FeatureSchemas> {
        let schemas = read_lock(&self.schemas);
        if schemas.is_empty() {
            return Err(MlError::NotFound("Feature columns not registered".to_string()));
        }
        debug!(entries = schemas.len(), "Feature columns read from memory");
        Ok(schemas.clone())
    }

    fn load_metadata(&self) -> MlResult<Option<ModelMetadata>> {
        Ok(read_lock(&self.metadata).clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} models", read_lock(&self.models).len())
    }
}

// 저장된 값은 불변이므로 poison된 락도 그대로 사용
fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
