//! 경기 기록과 선수 히스토리.

use crate::domain::position::StatKind;
use crate::error::HedgeError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 시즌 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeasonType {
    /// 정규 시즌
    #[default]
    #[serde(rename = "REG")]
    Regular,
    /// 포스트시즌 (플레이오프)
    #[serde(rename = "POST")]
    Post,
}

impl SeasonType {
    /// 플레이오프 여부.
    pub fn is_playoff(&self) -> bool {
        matches!(self, SeasonType::Post)
    }
}

impl FromStr for SeasonType {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REG" => Ok(SeasonType::Regular),
            "POST" => Ok(SeasonType::Post),
            _ => Err(HedgeError::InvalidInput(format!(
                "Invalid season type '{}'. Must be REG or POST",
                s
            ))),
        }
    }
}

/// 선수 한 경기 기록.
///
/// 스탯 필드는 모두 선택적입니다. `None`은 원천 데이터에서 값이 기록되지
/// 않았음을 의미하며 집계 시 0으로 취급됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub player_id: String,
    pub season: i32,
    pub week: u32,
    #[serde(default)]
    pub season_type: SeasonType,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub opponent: String,

    #[serde(default)]
    pub completions: Option<f64>,
    #[serde(default)]
    pub attempts: Option<f64>,
    #[serde(default)]
    pub passing_yards: Option<f64>,
    #[serde(default)]
    pub passing_tds: Option<f64>,
    #[serde(default)]
    pub passing_interceptions: Option<f64>,
    #[serde(default)]
    pub carries: Option<f64>,
    #[serde(default)]
    pub rushing_yards: Option<f64>,
    #[serde(default)]
    pub rushing_tds: Option<f64>,
    #[serde(default)]
    pub receptions: Option<f64>,
    #[serde(default)]
    pub targets: Option<f64>,
    #[serde(default)]
    pub receiving_yards: Option<f64>,
    #[serde(default)]
    pub receiving_tds: Option<f64>,
}

impl GameRecord {
    /// 식별자만 채운 새 기록 생성.
    pub fn new(player_id: impl Into<String>, season: i32, week: u32) -> Self {
        Self {
            player_id: player_id.into(),
            season,
            week,
            ..Default::default()
        }
    }

    /// 스탯 값 설정 (빌더).
    pub fn with_stat(mut self, stat: StatKind, value: f64) -> Self {
        *self.stat_slot(stat) = Some(value);
        self
    }

    /// 시즌 유형 설정 (빌더).
    pub fn with_season_type(mut self, season_type: SeasonType) -> Self {
        self.season_type = season_type;
        self
    }

    /// 기록된 스탯 값. 기록되지 않았으면 `None`.
    pub fn stat(&self, stat: StatKind) -> Option<f64> {
        match stat {
            StatKind::Completions => self.completions,
            StatKind::Attempts => self.attempts,
            StatKind::PassingYards => self.passing_yards,
            StatKind::PassingTds => self.passing_tds,
            StatKind::PassingInterceptions => self.passing_interceptions,
            StatKind::Carries => self.carries,
            StatKind::RushingYards => self.rushing_yards,
            StatKind::RushingTds => self.rushing_tds,
            StatKind::Receptions => self.receptions,
            StatKind::Targets => self.targets,
            StatKind::ReceivingYards => self.receiving_yards,
            StatKind::ReceivingTds => self.receiving_tds,
        }
    }

    /// 집계용 스탯 값. 기록되지 않았거나 유한하지 않은 값은 0.0.
    pub fn stat_or_zero(&self, stat: StatKind) -> f64 {
        match self.stat(stat) {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }

    fn stat_slot(&mut self, stat: StatKind) -> &mut Option<f64> {
        match stat {
            StatKind::Completions => &mut self.completions,
            StatKind::Attempts => &mut self.attempts,
            StatKind::PassingYards => &mut self.passing_yards,
            StatKind::PassingTds => &mut self.passing_tds,
            StatKind::PassingInterceptions => &mut self.passing_interceptions,
            StatKind::Carries => &mut self.carries,
            StatKind::RushingYards => &mut self.rushing_yards,
            StatKind::RushingTds => &mut self.rushing_tds,
            StatKind::Receptions => &mut self.receptions,
            StatKind::Targets => &mut self.targets,
            StatKind::ReceivingYards => &mut self.receiving_yards,
            StatKind::ReceivingTds => &mut self.receiving_tds,
        }
    }
}

/// 한 선수의 시간순 경기 기록.
///
/// 생성 시 (season, week) 오름차순으로 정렬됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<GameRecord>", into = "Vec<GameRecord>")]
pub struct PlayerHistory {
    games: Vec<GameRecord>,
}

impl PlayerHistory {
    /// 기록 목록으로 히스토리 생성 (시간순 정렬).
    pub fn new(mut games: Vec<GameRecord>) -> Self {
        games.sort_by_key(|g| (g.season, g.week));
        Self { games }
    }

    /// 빈 히스토리.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 경기 기록 슬라이스 (오래된 것부터).
    pub fn games(&self) -> &[GameRecord] {
        &self.games
    }

    /// 경기 수.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// 비어있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// 가장 최근 경기.
    pub fn latest(&self) -> Option<&GameRecord> {
        self.games.last()
    }
}

impl From<Vec<GameRecord>> for PlayerHistory {
    fn from(games: Vec<GameRecord>) -> Self {
        Self::new(games)
    }
}

impl From<PlayerHistory> for Vec<GameRecord> {
    fn from(history: PlayerHistory) -> Self {
        history.games
    }
}
