//! 모델 레지스트리.
//!
//! 학습된 quantile regressor와 feature 스키마를 지연 로드하고 캐시합니다.
//! 같은 [`ModelKey`]에 대해 동시에 처음 로드하면 양쪽 모두 로드할 수
//! 있지만, 캐시에는 먼저 삽입된 인스턴스만 남고 모든 호출자가 그
//! 인스턴스를 받습니다.

use crate::ml::predictor::QuantileRegressor;
use crate::ml::store::{FeatureSchemas, FileModelStore, ModelMetadata, ModelStore};
use crate::ml::types::{schema_key, ModelKey, Quantile};
use crate::ml::{MlError, MlResult};
use hedge_core::{ModelStoreConfig, Position};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// 레지스트리가 반환하는 (모델, 정렬된 feature 이름) 쌍.
pub type LoadedModel = (Arc<dyn QuantileRegressor>, Vec<String>);

/// 캐시 상태 요약.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    /// 캐시된 모델 키 (정렬됨)
    pub cached_models: Vec<ModelKey>,
    /// 캐시된 모델 수
    pub cache_size: usize,
    /// 스키마 로드 여부
    pub schemas_loaded: bool,
}

/// 모델 레지스트리.
pub struct ModelRegistry {
    store: Arc<dyn ModelStore>,
    cache: RwLock<HashMap<ModelKey, Arc<dyn QuantileRegressor>>>,
    schemas: RwLock<Option<Arc<FeatureSchemas>>>,
}

impl ModelRegistry {
    /// 저장소를 사용하는 레지스트리 생성.
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        info!(store = %store.describe(), "Model registry initialized");
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            schemas: RwLock::new(None),
        }
    }

    /// 설정된 디렉토리의 파일 저장소로 생성.
    pub fn from_config(config: &ModelStoreConfig) -> Self {
        Self::new(Arc::new(FileModelStore::from_config(config)))
    }

    /// 세 quantile 중 하나라도 아티팩트가 있으면 true. 모델을 로드하지 않음.
    pub fn model_exists(&self, position: Position, stat: &str) -> bool {
        Quantile::ALL
            .iter()
            .any(|&q| self.store.contains(&ModelKey::new(position, stat, q)))
    }

    /// 모델과 필요한 feature 이름 반환.
    ///
    /// 캐시에 없으면 로드해서 캐시에 넣습니다. 아티팩트가 없으면 `NotFound`.
    pub fn get_model(
        &self,
        position: Position,
        stat: &str,
        quantile: Quantile,
    ) -> MlResult<LoadedModel> {
        let key = ModelKey::new(position, stat, quantile);

        let cached = self.read_cache().get(&key).cloned();
        let model = match cached {
            Some(model) => {
                debug!(model = %key, "Model cache hit");
                model
            }
            None => self.load_and_cache(key)?,
        };

        let feature_names = self.get_feature_schema(position, stat)?;
        Ok((model, feature_names))
    }

    fn load_and_cache(&self, key: ModelKey) -> MlResult<Arc<dyn QuantileRegressor>> {
        info!(model = %key, "Loading model");
        let loaded = self.store.load(&key)?;

        let mut cache = self.write_cache();
        // 먼저 삽입된 인스턴스 유지
        let model = cache.entry(key).or_insert(loaded).clone();
        debug!(cache_size = cache.len(), "Model cached");
        Ok(model)
    }

    /// 포지션-스탯 조합의 정렬된 feature 이름 목록.
    ///
    /// 세 quantile이 같은 스키마를 공유합니다. 스키마 아티팩트는 처음 한
    /// 번만 읽습니다.
    pub fn get_feature_schema(&self, position: Position, stat: &str) -> MlResult<Vec<String>> {
        let schemas = self.schemas()?;
        let key = schema_key(position, stat);
        schemas.get(&key).cloned().ok_or_else(|| {
            MlError::NotFound(format!("Feature columns not found for {}", key))
        })
    }

    fn schemas(&self) -> MlResult<Arc<FeatureSchemas>> {
        if let Some(schemas) = self.read_schemas().as_ref() {
            return Ok(Arc::clone(schemas));
        }

        let loaded = Arc::new(self.store.load_feature_schemas()?);
        let mut slot = self.write_schemas();
        Ok(Arc::clone(slot.get_or_insert(loaded)))
    }

    /// 포지션-스탯 조합의 모든 quantile 모델.
    ///
    /// 아티팩트가 없는 quantile은 경고 후 생략합니다. 아티팩트는 있지만
    /// 로드할 수 없으면 에러를 반환합니다.
    pub fn get_all_quantile_models(
        &self,
        position: Position,
        stat: &str,
    ) -> MlResult<BTreeMap<Quantile, LoadedModel>> {
        let mut models = BTreeMap::new();

        for quantile in Quantile::ALL {
            match self.get_model(position, stat, quantile) {
                Ok(loaded) => {
                    models.insert(quantile, loaded);
                }
                Err(MlError::NotFound(reason)) => {
                    warn!(%position, stat, %quantile, %reason, "Quantile model not available");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(models)
    }

    /// 캐시된 모든 모델 제거.
    pub fn clear_cache(&self) {
        let mut cache = self.write_cache();
        let cleared = cache.len();
        cache.clear();
        info!(cleared, "Model cache cleared");
    }

    /// 현재 캐시 상태.
    pub fn cache_info(&self) -> CacheInfo {
        let mut cached_models: Vec<ModelKey> = self.read_cache().keys().cloned().collect();
        cached_models.sort();
        CacheInfo {
            cache_size: cached_models.len(),
            cached_models,
            schemas_loaded: self.read_schemas().is_some(),
        }
    }

    /// 학습 메타데이터. 없거나 읽을 수 없으면 경고 후 빈 기본값.
    pub fn metadata(&self) -> ModelMetadata {
        match self.store.load_metadata() {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                warn!("Model metadata not found");
                ModelMetadata::default()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load model metadata");
                ModelMetadata::default()
            }
        }
    }

    /// 스키마에 등록된 포지션-스탯 키 목록 (정렬됨).
    pub fn schema_keys(&self) -> MlResult<Vec<String>> {
        let mut keys: Vec<String> = self.schemas()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    // 캐시 값은 로드 후 변경되지 않으므로 poison된 락도 계속 사용
    fn read_cache(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ModelKey, Arc<dyn QuantileRegressor>>> {
        self.cache.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_cache(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<ModelKey, Arc<dyn QuantileRegressor>>> {
        self.cache.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_schemas(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<FeatureSchemas>>> {
        self.schemas.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_schemas(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<FeatureSchemas>>> {
        self.schemas.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("store", &self.store.describe())
            .field("cache_size", &self.read_cache().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::predictor::LinearQuantileModel;
    use crate::ml::store::{InMemoryModelStore, MODEL_METADATA_FILE};

    fn store_with(quantiles: &[Quantile]) -> Arc<InMemoryModelStore> {
        let store = Arc::new(InMemoryModelStore::new());
        for &q in quantiles {
            store.insert_model(
                ModelKey::new(Position::RB, "rushing_yards", q),
                Arc::new(LinearQuantileModel::new(q.as_str(), q.level() * 100.0, vec![0.0])),
            );
        }
        store.insert_schema("RB_rushing_yards", vec!["rushing_yards_avg_3".to_string()]);
        store
    }

    #[test]
    fn test_model_exists_without_loading() {
        let registry = ModelRegistry::new(store_with(&[Quantile::Q50]));
        assert!(registry.model_exists(Position::RB, "rushing_yards"));
        assert!(!registry.model_exists(Position::RB, "receptions"));
        assert_eq!(registry.cache_info().cache_size, 0);
        assert!(!registry.cache_info().schemas_loaded);
    }

    #[test]
    fn test_get_model_caches() {
        let registry = ModelRegistry::new(store_with(&Quantile::ALL));

        let (first, names) = registry
            .get_model(Position::RB, "rushing_yards", Quantile::Q90)
            .unwrap();
        let (second, _) = registry
            .get_model(Position::RB, "rushing_yards", Quantile::Q90)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(names, vec!["rushing_yards_avg_3".to_string()]);
        assert_eq!(registry.cache_info().cache_size, 1);

        registry.clear_cache();
        assert_eq!(registry.cache_info().cache_size, 0);
    }

    #[test]
    fn test_get_model_not_found() {
        let registry = ModelRegistry::new(store_with(&[Quantile::Q50]));
        let result = registry.get_model(Position::RB, "rushing_yards", Quantile::Q10);
        assert!(matches!(result, Err(MlError::NotFound(_))));
    }

    #[test]
    fn test_artifact_removed_after_exists_check() {
        let store = store_with(&[Quantile::Q10]);
        let registry = ModelRegistry::new(store.clone());

        assert!(registry.model_exists(Position::RB, "rushing_yards"));
        store.remove_model(&ModelKey::new(Position::RB, "rushing_yards", Quantile::Q10));

        let result = registry.get_model(Position::RB, "rushing_yards", Quantile::Q10);
        assert!(matches!(result, Err(MlError::NotFound(_))));
    }

    #[test]
    fn test_missing_schema_entry() {
        let store = store_with(&Quantile::ALL);
        store.insert_model(
            ModelKey::new(Position::WR, "targets", Quantile::Q50),
            Arc::new(LinearQuantileModel::new("wr", 5.0, vec![])),
        );
        let registry = ModelRegistry::new(store);

        let result = registry.get_feature_schema(Position::WR, "targets");
        assert!(matches!(result, Err(MlError::NotFound(_))));
    }

    #[test]
    fn test_partial_quantile_set() {
        let registry = ModelRegistry::new(store_with(&[Quantile::Q10, Quantile::Q90]));
        let models = registry
            .get_all_quantile_models(Position::RB, "rushing_yards")
            .unwrap();

        assert_eq!(models.len(), 2);
        assert!(models.contains_key(&Quantile::Q10));
        assert!(!models.contains_key(&Quantile::Q50));
    }

    #[test]
    fn test_concurrent_loads_converge() {
        let registry = Arc::new(ModelRegistry::new(store_with(&Quantile::ALL)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .get_model(Position::RB, "rushing_yards", Quantile::Q50)
                        .unwrap()
                        .0
                })
            })
            .collect();

        let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = registry
            .get_model(Position::RB, "rushing_yards", Quantile::Q50)
            .unwrap()
            .0;

        assert!(models.iter().all(|m| Arc::ptr_eq(m, &cached)));
        assert_eq!(registry.cache_info().cache_size, 1);
    }

    #[test]
    fn test_metadata_default_when_absent() {
        let registry = ModelRegistry::new(store_with(&[]));
        assert_eq!(registry.metadata(), ModelMetadata::default());
    }

    #[test]
    fn test_metadata_default_when_corrupt() {
        let dir = std::env::temp_dir().join(format!("hedge-registry-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MODEL_METADATA_FILE), "{ not json").unwrap();

        let store = Arc::new(FileModelStore::new(dir.clone()));
        assert!(store.load_metadata().is_err());

        let registry = ModelRegistry::new(store);
        assert_eq!(registry.metadata(), ModelMetadata::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
