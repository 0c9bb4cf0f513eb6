//! ML 모듈의 공통 타입.

use crate::ml::error::MlError;
use hedge_core::{BetDirection, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 예측 quantile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantile {
    /// 비관적 예측 (10th percentile)
    Q10,
    /// 중앙값 (50th percentile)
    Q50,
    /// 낙관적 예측 (90th percentile)
    Q90,
}

impl Quantile {
    /// 모든 quantile (낮은 것부터).
    pub const ALL: [Quantile; 3] = [Quantile::Q10, Quantile::Q50, Quantile::Q90];

    /// 식별자 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantile::Q10 => "q10",
            Quantile::Q50 => "q50",
            Quantile::Q90 => "q90",
        }
    }

    /// 확률 수준.
    pub fn level(&self) -> f64 {
        match self {
            Quantile::Q10 => 0.10,
            Quantile::Q50 => 0.50,
            Quantile::Q90 => 0.90,
        }
    }
}

impl fmt::Display for Quantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quantile {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "q10" => Ok(Quantile::Q10),
            "q50" => Ok(Quantile::Q50),
            "q90" => Ok(Quantile::Q90),
            _ => Err(MlError::InvalidArgument(format!(
                "Invalid quantile '{}'. Must be one of [q10, q50, q90]",
                s
            ))),
        }
    }
}

/// 학습된 regressor 하나를 식별하는 키.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelKey {
    pub position: Position,
    pub stat: String,
    pub quantile: Quantile,
}

impl ModelKey {
    pub fn new(position: Position, stat: impl Into<String>, quantile: Quantile) -> Self {
        Self {
            position,
            stat: stat.into(),
            quantile,
        }
    }

    /// 아티팩트 파일 이름의 stem (예: `QB_passing_yards_q50`).
    pub fn stem(&self) -> String {
        format!("{}_{}_{}", self.position, self.stat, self.quantile)
    }

    /// feature 스키마 키 (예: `QB_passing_yards`). 세 quantile이 공유.
    pub fn schema_key(&self) -> String {
        schema_key(self.position, &self.stat)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}

/// 포지션-스탯 조합의 feature 스키마 키.
pub fn schema_key(position: Position, stat: &str) -> String {
    format!("{}_{}", position, stat)
}

/// 다가오는 한 경기를 설명하는 이름 있는 feature 모음.
///
/// 삽입 순서를 유지하므로 같은 입력에 대해 항상 같은 순서로 순회됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// 빈 feature vector 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// feature 값 설정. 이미 있는 이름이면 값을 덮어씀.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.names.iter().position(|n| *n == name) {
            Some(idx) => self.values[idx] = value,
            None => {
                self.names.push(name);
                self.values.push(value);
            }
        }
    }

    /// 이름으로 값 조회.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    /// 해당 이름의 feature가 있는지 확인.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// feature 이름 목록 (삽입 순서).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// feature 값 목록 (삽입 순서).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// (이름, 값) 쌍 순회.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// feature 개수.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 특정 모델의 스키마 순서에 맞춘 입력 행.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    /// 스키마 순서의 컬럼 이름
    pub columns: Vec<String>,
    /// 컬럼 순서의 값
    pub values: Vec<f64>,
    /// 계산된 feature에 없어 0.0으로 채운 컬럼
    pub filled: Vec<String>,
}

impl AlignedRow {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// 예측 신뢰도 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// 결합 점수(0.0 ~ 2.0)에서 변환.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 1.33 => ConfidenceLevel::High,
            s if s >= 0.67 => ConfidenceLevel::Medium,
            _ => ConfidenceLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 베팅 추천.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Poor Bet")]
    PoorBet,
    #[serde(rename = "Risky Bet")]
    RiskyBet,
    #[serde(rename = "Fair Bet")]
    FairBet,
    #[serde(rename = "Good Bet")]
    GoodBet,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::PoorBet => "Poor Bet",
            Recommendation::RiskyBet => "Risky Bet",
            Recommendation::FairBet => "Fair Bet",
            Recommendation::GoodBet => "Good Bet",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 예측 부가 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDetails {
    /// 분석에 사용된 경기 수
    pub player_games_analyzed: usize,
    pub current_season: i32,
    pub current_week: u32,
    pub is_playoff: bool,
    /// 스탯 단위 (yards, TDs 등)
    pub stat_unit: String,
    /// q90 - q10 (소수점 2자리)
    pub prediction_spread: f64,
    /// (q90 - q10) / (q50 + 1) (소수점 3자리)
    pub relative_spread: f64,
    /// |threshold - q50| (소수점 2자리)
    pub distance_from_median: f64,
}

/// 한 베팅 시나리오에 대한 예측 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub position: Position,
    pub stat_name: String,
    pub stat_display_name: String,
    /// quantile → 예측값
    pub predictions: BTreeMap<Quantile, f64>,
    pub threshold: f64,
    pub bet_type: BetDirection,
    /// 승리 확률 (소수점 3자리, 0.05 ~ 0.95)
    pub win_probability: f64,
    pub confidence_level: ConfidenceLevel,
    /// 2 × win_probability − 1 (금전적 기대값이 아님)
    pub edge: f64,
    pub recommendation: Recommendation,
    pub details: PredictionDetails,
}

impl PredictionResult {
    /// 해당 quantile의 예측값.
    pub fn prediction(&self, quantile: Quantile) -> Option<f64> {
        self.predictions.get(&quantile).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_parse() {
        assert_eq!("q50".parse::<Quantile>().unwrap(), Quantile::Q50);
        assert!(matches!(
            "q75".parse::<Quantile>(),
            Err(MlError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_model_key_naming() {
        let key = ModelKey::new(Position::QB, "passing_yards", Quantile::Q90);
        assert_eq!(key.stem(), "QB_passing_yards_q90");
        assert_eq!(key.schema_key(), "QB_passing_yards");
        assert_eq!(key.to_string(), "QB_passing_yards_q90");
    }

    #[test]
    fn test_feature_vector_insert_order() {
        let mut features = FeatureVector::new();
        features.insert("week", 6.0);
        features.insert("season", 2024.0);
        features.insert("week", 7.0);

        assert_eq!(features.len(), 2);
        assert_eq!(features.names(), &["week".to_string(), "season".to_string()]);
        assert_eq!(features.get("week"), Some(7.0));
        assert_eq!(features.get("missing"), None);
        assert!(features.contains("season"));
    }

    #[test]
    fn test_confidence_from_score() {
        assert_eq!(ConfidenceLevel::from_score(1.4), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(1.33), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_score(1.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_score(0.66), ConfidenceLevel::Low);
        assert!(ConfidenceLevel::High > ConfidenceLevel::Low);
    }

    #[test]
    fn test_recommendation_serde() {
        let json = serde_json::to_string(&Recommendation::GoodBet).unwrap();
        assert_eq!(json, "\"Good Bet\"");
        assert_eq!(Recommendation::RiskyBet.to_string(), "Risky Bet");
    }
}
