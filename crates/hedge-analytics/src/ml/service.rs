//! 예측 서비스 - feature 생성, 모델 레지스트리, 점수 계산을 통합하는 서비스.
//!
//! 한 요청의 흐름:
//! 1. 포지션-스탯 조합 검증 (스탯 표 확인 후 아티팩트 존재 확인)
//! 2. 포지션 스탯 표를 기준으로 feature 생성
//! 3. quantile별 모델 조회, 스키마 정렬, 추론
//! 4. 점수 계산 및 결과 조립

use crate::ml::features::{FeatureEngineer, UpcomingGame};
use crate::ml::registry::ModelRegistry;
use crate::ml::scoring::{self, QuantileAnchors};
use crate::ml::types::{FeatureVector, PredictionDetails, PredictionResult};
use crate::ml::{MlError, MlResult};
use hedge_core::{
    prediction_span, stat_display_name, stat_for_action, stat_unit, AppConfig, BetDirection,
    PlayerHistory, Position, TeamContext, ACTION_TO_STAT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// 한 경기, 한 스탯에 대한 예측 요청.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub position: Position,
    pub stat: String,
    /// 선수의 최근 경기 기록
    pub history: PlayerHistory,
    pub season: i32,
    pub week: u32,
    /// 베팅 기준값 (예: 275.5 yards)
    pub threshold: f64,
    pub direction: BetDirection,
    #[serde(default)]
    pub is_playoff: bool,
    #[serde(default)]
    pub team_context: Option<TeamContext>,
}

impl PredictionRequest {
    pub fn new(
        position: Position,
        stat: impl Into<String>,
        history: PlayerHistory,
        season: i32,
        week: u32,
        threshold: f64,
        direction: BetDirection,
    ) -> Self {
        Self {
            position,
            stat: stat.into(),
            history,
            season,
            week,
            threshold,
            direction,
            is_playoff: false,
            team_context: None,
        }
    }

    pub fn with_playoff(mut self, is_playoff: bool) -> Self {
        self.is_playoff = is_playoff;
        self
    }

    pub fn with_team_context(mut self, team_context: TeamContext) -> Self {
        self.team_context = Some(team_context);
        self
    }

    fn upcoming(&self) -> UpcomingGame {
        UpcomingGame::new(self.season, self.week)
            .with_playoff(self.is_playoff)
            .with_team_context(self.team_context)
    }
}

/// 화면에서 제출되는 형태의 베팅 시나리오.
///
/// 문자열 필드는 서비스에서 파싱합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BettingScenario {
    pub player_name: String,
    pub position: String,
    #[serde(default)]
    pub team: String,
    /// 액션 표시 이름 (예: "Passing Yards")
    pub action: String,
    /// "over" 또는 "under"
    pub bet_type: String,
    /// 기준값
    pub action_amount: f64,
    pub history: PlayerHistory,
    #[serde(default = "default_season")]
    pub season: i32,
    #[serde(default = "default_week")]
    pub week: u32,
    #[serde(default)]
    pub is_playoff: bool,
    #[serde(default)]
    pub team_context: Option<TeamContext>,
}

fn default_season() -> i32 {
    2025
}

fn default_week() -> u32 {
    1
}

/// 예측 서비스.
///
/// `Send + Sync`이며 여러 스레드에서 공유할 수 있습니다.
#[derive(Debug)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    engineer: FeatureEngineer,
}

impl PredictionService {
    /// 레지스트리와 feature engineer로 서비스 생성.
    pub fn new(registry: Arc<ModelRegistry>, engineer: FeatureEngineer) -> Self {
        info!("Prediction service initialized");
        Self { registry, engineer }
    }

    /// 애플리케이션 설정으로 생성.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(ModelRegistry::from_config(&config.models)),
            FeatureEngineer::new(config.features.clone()),
        )
    }

    /// 모델 레지스트리 참조.
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// feature engineer 참조.
    pub fn engineer(&self) -> &FeatureEngineer {
        &self.engineer
    }

    /// 포지션-스탯 조합 검증.
    ///
    /// 스탯 표에 없는 조합은 레지스트리를 건드리지 않고 거부합니다.
    pub fn validate_combination(&self, position: Position, stat: &str) -> MlResult<()> {
        let unsupported = || MlError::UnsupportedCombination {
            position,
            stat: stat.to_string(),
            valid_stats: position.supported_stat_names(),
        };

        if !position.supports(stat) {
            return Err(unsupported());
        }
        if !self.registry.model_exists(position, stat) {
            return Err(unsupported());
        }
        Ok(())
    }

    /// 요청에 대한 feature vector 생성 (포지션 스탯 표 기준).
    pub fn features(&self, request: &PredictionRequest) -> FeatureVector {
        self.engineer.prepare(
            &request.history,
            request.position.supported_stats(),
            &request.upcoming(),
        )
    }

    /// 선수 프롭 베팅 예측.
    pub fn predict(&self, request: &PredictionRequest) -> MlResult<PredictionResult> {
        let position = request.position;
        let stat = request.stat.as_str();
        let span = prediction_span!("predict", position, stat, request.direction);
        let _guard = span.enter();

        self.validate_combination(position, stat)?;

        info!(
            threshold = request.threshold,
            games = request.history.len(),
            "Making prediction"
        );

        let features = self.features(request);

        let models = self.registry.get_all_quantile_models(position, stat)?;
        if models.is_empty() {
            return Err(MlError::ModelUnavailable {
                position,
                stat: stat.to_string(),
            });
        }

        let mut predictions = BTreeMap::new();
        for (quantile, (model, required)) in &models {
            let row = self.engineer.align(&features, required);
            let value = model
                .predict(row.as_slice())
                .map_err(|e| MlError::PredictionFailed {
                    quantile: *quantile,
                    reason: e.to_string(),
                })?;
            debug!(%quantile, value, model = model.model_name(), "Quantile prediction");
            predictions.insert(*quantile, value);
        }

        let anchors = QuantileAnchors::from_predictions(&predictions);
        let breakdown = scoring::score(&anchors, request.threshold, request.direction);

        info!(
            win_probability = breakdown.win_probability,
            confidence = %breakdown.confidence_level,
            recommendation = %breakdown.recommendation,
            "Prediction scored"
        );

        Ok(PredictionResult {
            position,
            stat_name: stat.to_string(),
            stat_display_name: stat_display_name(stat),
            predictions,
            threshold: request.threshold,
            bet_type: request.direction,
            win_probability: breakdown.win_probability,
            confidence_level: breakdown.confidence_level,
            edge: breakdown.edge,
            recommendation: breakdown.recommendation,
            details: PredictionDetails {
                player_games_analyzed: request.history.len(),
                current_season: request.season,
                current_week: request.week,
                is_playoff: request.is_playoff,
                stat_unit: stat_unit(stat).to_string(),
                prediction_spread: breakdown.prediction_spread,
                relative_spread: breakdown.relative_spread,
                distance_from_median: breakdown.distance_from_median,
            },
        })
    }

    /// 베팅 시나리오로 예측.
    ///
    /// 액션 표시 이름을 스탯 이름으로 변환하고 포지션과 베팅 방향 문자열을
    /// 파싱한 뒤 [`predict`](Self::predict)에 위임합니다.
    pub fn predict_scenario(&self, scenario: BettingScenario) -> MlResult<PredictionResult> {
        let stat = stat_for_action(&scenario.action).ok_or_else(|| {
            let valid: Vec<&str> = ACTION_TO_STAT.iter().map(|(action, _)| *action).collect();
            MlError::InvalidArgument(format!(
                "Unknown action '{}'. Valid actions: {:?}",
                scenario.action, valid
            ))
        })?;

        let position: Position = scenario.position.parse()?;
        let direction: BetDirection = scenario.bet_type.parse()?;

        info!(
            player = %scenario.player_name,
            team = %scenario.team,
            action = %scenario.action,
            stat,
            "Predicting betting scenario"
        );

        let mut request = PredictionRequest::new(
            position,
            stat,
            scenario.history,
            scenario.season,
            scenario.week,
            scenario.action_amount,
            direction,
        )
        .with_playoff(scenario.is_playoff);
        request.team_context = scenario.team_context;

        self.predict(&request)
    }
}
