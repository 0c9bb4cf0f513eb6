//! 포지션과 스탯 정의.
//!
//! 포지션별로 지원하는 스탯 목록, 프론트엔드 액션 이름과 내부 스탯 이름 간
//! 매핑, 표시 이름과 단위를 제공합니다.

use crate::error::HedgeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 선수 포지션.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    /// 쿼터백
    QB,
    /// 러닝백
    RB,
    /// 와이드 리시버
    WR,
    /// 타이트 엔드
    TE,
}

impl Position {
    /// 모든 포지션.
    pub const ALL: [Position; 4] = [Position::QB, Position::RB, Position::WR, Position::TE];

    /// 포지션 코드 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
        }
    }

    /// 이 포지션이 지원하는 스탯 목록.
    ///
    /// rolling feature 계산의 기준 스탯 목록이기도 합니다.
    pub fn supported_stats(&self) -> &'static [StatKind] {
        match self {
            Position::QB => &[
                StatKind::PassingYards,
                StatKind::PassingTds,
                StatKind::Completions,
                StatKind::PassingInterceptions,
                StatKind::RushingYards,
            ],
            Position::RB => &[
                StatKind::RushingYards,
                StatKind::RushingTds,
                StatKind::Receptions,
                StatKind::ReceivingYards,
                StatKind::ReceivingTds,
            ],
            Position::WR => &[
                StatKind::ReceivingYards,
                StatKind::Receptions,
                StatKind::ReceivingTds,
                StatKind::Targets,
            ],
            Position::TE => &[
                StatKind::ReceivingYards,
                StatKind::Receptions,
                StatKind::ReceivingTds,
            ],
        }
    }

    /// 스탯 이름이 이 포지션에서 지원되는지 확인.
    pub fn supports(&self, stat: &str) -> bool {
        self.supported_stats().iter().any(|s| s.as_str() == stat)
    }

    /// 지원 스탯 이름 목록 (에러 메시지 및 안내용).
    pub fn supported_stat_names(&self) -> Vec<String> {
        self.supported_stats()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            _ => Err(HedgeError::InvalidInput(format!(
                "Invalid position '{}'. Must be one of [QB, RB, WR, TE]",
                s
            ))),
        }
    }
}

/// 경기 기록에서 추적하는 스탯 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Completions,
    Attempts,
    PassingYards,
    PassingTds,
    PassingInterceptions,
    Carries,
    RushingYards,
    RushingTds,
    Receptions,
    Targets,
    ReceivingYards,
    ReceivingTds,
}

impl StatKind {
    /// 모든 스탯 종류.
    pub const ALL: [StatKind; 12] = [
        StatKind::Completions,
        StatKind::Attempts,
        StatKind::PassingYards,
        StatKind::PassingTds,
        StatKind::PassingInterceptions,
        StatKind::Carries,
        StatKind::RushingYards,
        StatKind::RushingTds,
        StatKind::Receptions,
        StatKind::Targets,
        StatKind::ReceivingYards,
        StatKind::ReceivingTds,
    ];

    /// 내부 스탯 이름 (모델 아티팩트 및 feature 이름에 사용).
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Completions => "completions",
            StatKind::Attempts => "attempts",
            StatKind::PassingYards => "passing_yards",
            StatKind::PassingTds => "passing_tds",
            StatKind::PassingInterceptions => "passing_interceptions",
            StatKind::Carries => "carries",
            StatKind::RushingYards => "rushing_yards",
            StatKind::RushingTds => "rushing_tds",
            StatKind::Receptions => "receptions",
            StatKind::Targets => "targets",
            StatKind::ReceivingYards => "receiving_yards",
            StatKind::ReceivingTds => "receiving_tds",
        }
    }

    /// 사용자에게 보여줄 표시 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            StatKind::Completions => "Completions",
            StatKind::Attempts => "Attempts",
            StatKind::PassingYards => "Passing Yards",
            StatKind::PassingTds => "Passing Touchdowns",
            StatKind::PassingInterceptions => "Interceptions",
            StatKind::Carries => "Carries",
            StatKind::RushingYards => "Rushing Yards",
            StatKind::RushingTds => "Rushing Touchdowns",
            StatKind::Receptions => "Receptions",
            StatKind::Targets => "Targets",
            StatKind::ReceivingYards => "Receiving Yards",
            StatKind::ReceivingTds => "Receiving Touchdowns",
        }
    }

    /// 표시 단위.
    pub fn unit(&self) -> &'static str {
        match self {
            StatKind::Completions => "completions",
            StatKind::Attempts => "attempts",
            StatKind::PassingYards | StatKind::RushingYards | StatKind::ReceivingYards => "yards",
            StatKind::PassingTds | StatKind::RushingTds | StatKind::ReceivingTds => "TDs",
            StatKind::PassingInterceptions => "INTs",
            StatKind::Carries => "carries",
            StatKind::Receptions => "receptions",
            StatKind::Targets => "targets",
        }
    }

    /// 내부 스탯 이름으로 조회.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 프론트엔드 액션 표시 이름 → 내부 스탯 이름.
///
/// "Touchdowns"는 어떤 포지션도 지원하지 않는 이름으로 매핑됩니다.
pub const ACTION_TO_STAT: &[(&str, &str)] = &[
    ("Passing Yards", "passing_yards"),
    ("Passing Touchdowns", "passing_tds"),
    ("Completions", "completions"),
    ("Attempts", "attempts"),
    ("Interceptions", "passing_interceptions"),
    ("Rushing Yards", "rushing_yards"),
    ("Rushing Touchdowns", "rushing_tds"),
    ("Receiving Yards", "receiving_yards"),
    ("Receiving Touchdowns", "receiving_tds"),
    ("Receptions", "receptions"),
    ("Targets", "targets"),
    ("Touchdowns", "touchdowns"),
];

/// 액션 표시 이름을 내부 스탯 이름으로 변환.
pub fn stat_for_action(action: &str) -> Option<&'static str> {
    ACTION_TO_STAT
        .iter()
        .find(|(a, _)| *a == action)
        .map(|(_, stat)| *stat)
}

/// 스탯 이름의 표시 이름. 알 수 없는 스탯은 이름 그대로 반환.
pub fn stat_display_name(stat: &str) -> String {
    StatKind::from_name(stat)
        .map(|s| s.display_name().to_string())
        .unwrap_or_else(|| stat.to_string())
}

/// 스탯 이름의 단위. 알 수 없는 스탯은 빈 문자열.
pub fn stat_unit(stat: &str) -> &'static str {
    StatKind::from_name(stat).map(|s| s.unit()).unwrap_or("")
}
