//! 예측 실행 명령.

use crate::commands::input::{load_history, load_team_context};
use anyhow::{bail, Result};
use hedge_analytics::ml::{
    BettingScenario, PredictionRequest, PredictionResult, PredictionService, Quantile,
};
use hedge_core::{BetDirection, Position};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// 예측 명령 설정.
#[derive(Debug, Clone)]
pub struct PredictConfig {
    /// 포지션 (QB, RB, WR, TE)
    pub position: String,
    /// 내부 스탯 이름 (예: passing_yards)
    pub stat: Option<String>,
    /// 액션 표시 이름 (예: "Passing Yards")
    pub action: Option<String>,
    /// 로그용 선수 이름
    pub player: Option<String>,
    /// 경기 기록 JSON 파일
    pub history: PathBuf,
    pub season: i32,
    pub week: u32,
    pub threshold: f64,
    /// over 또는 under
    pub direction: String,
    pub playoff: bool,
    /// 팀 컨텍스트 JSON 파일
    pub team_context: Option<PathBuf>,
    /// JSON 출력
    pub json: bool,
}

/// 예측 실행 후 결과 출력.
pub fn run_predict(service: &PredictionService, config: PredictConfig) -> Result<()> {
    let result = predict(service, config.clone())?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_prediction(&result));
    }
    Ok(())
}

/// 설정으로 예측 실행.
///
/// 액션 이름이 주어지면 베팅 시나리오 경로를, 아니면 스탯 이름으로 직접
/// 예측합니다.
pub fn predict(service: &PredictionService, config: PredictConfig) -> Result<PredictionResult> {
    let history = load_history(&config.history)?;
    let team_context = config
        .team_context
        .as_deref()
        .map(load_team_context)
        .transpose()?;

    let result = match (config.action, config.stat) {
        (Some(action), _) => {
            let scenario = BettingScenario {
                player_name: config.player.unwrap_or_default(),
                position: config.position,
                team: String::new(),
                action,
                bet_type: config.direction,
                action_amount: config.threshold,
                history,
                season: config.season,
                week: config.week,
                is_playoff: config.playoff,
                team_context,
            };
            service.predict_scenario(scenario)?
        }
        (None, Some(stat)) => {
            let position: Position = config.position.parse()?;
            let direction: BetDirection = config.direction.parse()?;
            let mut request = PredictionRequest::new(
                position,
                stat,
                history,
                config.season,
                config.week,
                config.threshold,
                direction,
            )
            .with_playoff(config.playoff);
            request.team_context = team_context;
            service.predict(&request)?
        }
        (None, None) => bail!("Either --stat or --action is required"),
    };

    info!(
        win_probability = result.win_probability,
        recommendation = %result.recommendation,
        "Prediction complete"
    );
    Ok(result)
}

/// 사람이 읽는 형식의 예측 결과.
pub struct PredictionReport<'a>(pub &'a PredictionResult);

impl fmt::Display for PredictionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let unit = &result.details.stat_unit;

        writeln!(
            f,
            "{} {} - {} {} {}",
            result.position,
            result.stat_display_name,
            result.bet_type.as_str().to_uppercase(),
            result.threshold,
            unit
        )?;
        for quantile in Quantile::ALL {
            match result.prediction(quantile) {
                Some(value) => writeln!(f, "  {}: {:>8.2} {}", quantile, value, unit)?,
                None => writeln!(f, "  {}: {:>8}", quantile, "n/a")?,
            }
        }
        writeln!(f, "  win probability: {:.1}%", result.win_probability * 100.0)?;
        writeln!(f, "  edge:            {:+.3}", result.edge)?;
        writeln!(f, "  confidence:      {}", result.confidence_level)?;
        writeln!(f, "  recommendation:  {}", result.recommendation)?;
        writeln!(
            f,
            "  spread: {:.2} (relative {:.3}), {:.2} from median, {} games analyzed",
            result.details.prediction_spread,
            result.details.relative_spread,
            result.details.distance_from_median,
            result.details.player_games_analyzed
        )
    }
}

/// 사람이 읽는 형식으로 결과 렌더링.
pub fn render_prediction(result: &PredictionResult) -> String {
    PredictionReport(result).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hedge_analytics::ml::{
        FeatureEngineer, InMemoryModelStore, LinearQuantileModel, ModelKey, ModelRegistry,
    };
    use std::sync::Arc;

    fn te_service() -> PredictionService {
        let store = Arc::new(InMemoryModelStore::new());
        for (q, value) in [(Quantile::Q10, 2.0), (Quantile::Q50, 4.0), (Quantile::Q90, 7.0)] {
            store.insert_model(
                ModelKey::new(Position::TE, "receptions", q),
                Arc::new(LinearQuantileModel::new(q.as_str(), value, vec![])),
            );
        }
        store.insert_schema("TE_receptions", Vec::new());
        PredictionService::new(
            Arc::new(ModelRegistry::new(store)),
            FeatureEngineer::with_defaults(),
        )
    }

    fn config(history: PathBuf) -> PredictConfig {
        PredictConfig {
            position: "TE".to_string(),
            stat: None,
            action: Some("Receptions".to_string()),
            player: Some("Test End".to_string()),
            history,
            season: 2024,
            week: 12,
            threshold: 4.5,
            direction: "under".to_string(),
            playoff: false,
            team_context: None,
            json: false,
        }
    }

    fn history_file() -> PathBuf {
        let path = std::env::temp_dir().join(format!("hedge-cli-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"player_id": "te-1", "season": 2024, "week": 11, "receptions": 5.0}]"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_predict_by_action_and_stat() {
        let path = history_file();
        let service = te_service();

        let by_action = predict(&service, config(path.clone())).unwrap();
        let by_stat = predict(
            &service,
            PredictConfig {
                stat: Some("receptions".to_string()),
                action: None,
                ..config(path.clone())
            },
        )
        .unwrap();

        assert_eq!(by_action, by_stat);
        assert_eq!(by_action.prediction(Quantile::Q90), Some(7.0));

        let rendered = render_prediction(&by_action);
        assert!(rendered.starts_with("TE Receptions - UNDER 4.5 receptions"));
        assert!(rendered.contains("recommendation:"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_predict_requires_stat_or_action() {
        let path = history_file();
        let err = predict(
            &te_service(),
            PredictConfig {
                action: None,
                ..config(path.clone())
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("--stat or --action"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_marks_missing_quantile() {
        let path = history_file();
        let mut result = predict(&te_service(), config(path.clone())).unwrap();
        result.predictions.remove(&Quantile::Q10);

        let rendered = PredictionReport(&result).to_string();
        assert_eq!(rendered.lines().count(), 9);
        assert!(rendered.lines().nth(1).unwrap().ends_with("n/a"));
        assert!(rendered.trim_end().ends_with("1 games analyzed"));

        std::fs::remove_file(&path).unwrap();
    }
}
