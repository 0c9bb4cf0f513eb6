//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use crate::domain::TeamContext;
use crate::error::{HedgeError, HedgeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 모델 아티팩트 저장소 설정
    #[serde(default)]
    pub models: ModelStoreConfig,
    /// feature engineering 설정
    #[serde(default)]
    pub features: FeatureConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 모델 아티팩트 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelStoreConfig {
    /// 모델 파일 디렉토리
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    /// ONNX 모델의 입력 텐서 이름
    #[serde(default = "default_onnx_input_name")]
    pub onnx_input_name: String,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_onnx_input_name() -> String {
    "input".to_string()
}

impl Default for ModelStoreConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            onnx_input_name: default_onnx_input_name(),
        }
    }
}

/// feature engineering 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// rolling 평균/표준편차 윈도우 크기 (경기 수)
    #[serde(default = "default_windows")]
    pub windows: Vec<usize>,
    /// 시즌 진행도 계산에 사용하는 정규 시즌 주 수
    #[serde(default = "default_season_length_weeks")]
    pub season_length_weeks: f64,
    /// 팀 컨텍스트가 없을 때 사용하는 기본값
    #[serde(default)]
    pub default_team_context: TeamContext,
}

fn default_windows() -> Vec<usize> {
    vec![3, 5]
}

fn default_season_length_weeks() -> f64 {
    18.0
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            season_length_weeks: default_season_length_weeks(),
            default_team_context: TeamContext::league_average(),
        }
    }
}

impl FeatureConfig {
    /// 가장 큰 윈도우 크기. 상위 계층이 넘겨야 할 최소 히스토리 길이.
    pub fn max_window(&self) -> usize {
        self.windows.iter().max().copied().unwrap_or(0)
    }

    /// 윈도우는 하나 이상이고 모두 양수, 시즌 길이와 팀 기본값은 유한한 양수여야 합니다.
    pub fn validate(&self) -> HedgeResult<()> {
        if self.windows.is_empty() {
            return Err(HedgeError::Config(
                "features.windows must contain at least one window".to_string(),
            ));
        }
        if self.windows.contains(&0) {
            return Err(HedgeError::Config(format!(
                "features.windows must be positive, got {:?}",
                self.windows
            )));
        }
        if !self.season_length_weeks.is_finite() || self.season_length_weeks <= 0.0 {
            return Err(HedgeError::Config(format!(
                "features.season_length_weeks must be a positive number, got {}",
                self.season_length_weeks
            )));
        }
        for (name, value) in self.default_team_context.features() {
            if !value.is_finite() || value < 0.0 {
                return Err(HedgeError::Config(format!(
                    "features.default_team_context.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// feature 설정이 유효하지 않으면 `ConfigError::Message`를 반환합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("HEDGE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config
            .features
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_config_default() {
        let config = FeatureConfig::default();
        assert_eq!(config.windows, vec![3, 5]);
        assert_eq!(config.season_length_weeks, 18.0);
        assert_eq!(config.max_window(), 5);
        assert_eq!(config.default_team_context, TeamContext::league_average());
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [models]
            dir = "/srv/models"

            [features]
            windows = [3, 5, 8]
            "#,
        )
        .unwrap();

        assert_eq!(config.models.dir, PathBuf::from("/srv/models"));
        assert_eq!(config.models.onnx_input_name, "input");
        assert_eq!(config.features.max_window(), 8);
        assert_eq!(config.features.season_length_weeks, 18.0);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.models.dir, PathBuf::from("models"));
        assert_eq!(config.features.windows, vec![3, 5]);
    }

    #[test]
    fn test_validate_rejects_bad_features() {
        assert!(FeatureConfig::default().validate().is_ok());

        let cases = [
            FeatureConfig { windows: vec![], ..Default::default() },
            FeatureConfig { windows: vec![3, 0], ..Default::default() },
            FeatureConfig { season_length_weeks: 0.0, ..Default::default() },
            FeatureConfig { season_length_weeks: -18.0, ..Default::default() },
            FeatureConfig { season_length_weeks: f64::NAN, ..Default::default() },
            FeatureConfig {
                default_team_context: TeamContext {
                    team_targets: f64::INFINITY,
                    ..TeamContext::league_average()
                },
                ..Default::default()
            },
        ];
        for config in cases {
            match config.validate() {
                Err(HedgeError::Config(msg)) => assert!(msg.starts_with("features.")),
                other => panic!("Expected Config error for {:?}, got {:?}", config, other),
            }
        }
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "hedge-core-config-{}-invalid.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[features]\nseason_length_weeks = 0.0\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("season_length_weeks"));

        std::fs::write(&path, "[features]\nwindows = [0]\n").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("windows"));

        std::fs::remove_file(&path).unwrap();
    }
}
