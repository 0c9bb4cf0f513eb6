//! 베팅 방향과 팀 컨텍스트.

use crate::error::HedgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 오버/언더 베팅 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetDirection {
    /// 기준값 초과에 베팅
    Over,
    /// 기준값 미만에 베팅
    Under,
}

impl BetDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetDirection::Over => "over",
            BetDirection::Under => "under",
        }
    }
}

impl fmt::Display for BetDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetDirection {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "over" => Ok(BetDirection::Over),
            "under" => Ok(BetDirection::Under),
            _ => Err(HedgeError::InvalidInput(format!(
                "Invalid bet_type '{}'. Must be 'over' or 'under'",
                s
            ))),
        }
    }
}

/// 다가오는 경기의 팀 단위 집계 스탯.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub team_passing_yards: f64,
    pub team_rushing_yards: f64,
    pub team_receptions: f64,
    pub team_targets: f64,
}

impl TeamContext {
    /// feature 이름 목록 (고정 순서).
    pub const FEATURE_NAMES: [&'static str; 4] = [
        "team_passing_yards",
        "team_rushing_yards",
        "team_receptions",
        "team_targets",
    ];

    /// 리그 평균 근사값.
    pub fn league_average() -> Self {
        Self {
            team_passing_yards: 230.0,
            team_rushing_yards: 120.0,
            team_receptions: 22.0,
            team_targets: 34.0,
        }
    }

    /// (feature 이름, 값) 쌍을 고정 순서로 반환.
    pub fn features(&self) -> [(&'static str, f64); 4] {
        [
            (Self::FEATURE_NAMES[0], self.team_passing_yards),
            (Self::FEATURE_NAMES[1], self.team_rushing_yards),
            (Self::FEATURE_NAMES[2], self.team_receptions),
            (Self::FEATURE_NAMES[3], self.team_targets),
        ]
    }
}

impl Default for TeamContext {
    fn default() -> Self {
        Self::league_average()
    }
}
