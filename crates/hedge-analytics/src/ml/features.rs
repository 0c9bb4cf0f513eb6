//! 예측 모델을 위한 feature engineering.
//!
//! 선수의 시간순 경기 기록을 다음 경기를 설명하는 하나의 feature 행으로
//! 변환합니다:
//!
//! - rolling 평균/표준편차 (윈도우 3, 5경기)
//! - 시간 feature (시즌 진행도, 플레이오프, 홈 경기)
//! - 팀 컨텍스트 feature
//!
//! 계산은 결정적입니다. 난수나 현재 시각을 사용하지 않습니다.

use crate::ml::types::{AlignedRow, FeatureVector};
use hedge_core::{FeatureConfig, GameRecord, PlayerHistory, StatKind, TeamContext};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// rolling 윈도우 하나의 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStat {
    /// 윈도우 내 평균
    pub mean: f64,
    /// 윈도우 내 표본 표준편차 (관측 1개면 0.0)
    pub std: f64,
}

/// 고정 크기 슬라이딩 윈도우.
///
/// 최근 `size`개 관측값을 버퍼에 유지하며 합계를 증분 갱신합니다.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    size: usize,
    buffer: VecDeque<f64>,
    sum: f64,
}

impl RollingWindow {
    /// 새 윈도우 생성. 크기 0은 1로 취급.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            buffer: VecDeque::with_capacity(size),
            sum: 0.0,
        }
    }

    /// 관측값을 추가하고 이 시점까지의 윈도우 통계를 반환.
    pub fn push(&mut self, value: f64) -> RollingStat {
        if self.buffer.len() == self.size {
            if let Some(oldest) = self.buffer.pop_front() {
                self.sum -= oldest;
            }
        }
        self.buffer.push_back(value);
        self.sum += value;
        self.current()
    }

    /// 현재 윈도우 통계. 비어있으면 평균과 표준편차 모두 0.0.
    pub fn current(&self) -> RollingStat {
        let n = self.buffer.len();
        if n == 0 {
            return RollingStat { mean: 0.0, std: 0.0 };
        }

        let mean = self.sum / n as f64;
        if n == 1 {
            return RollingStat { mean, std: 0.0 };
        }

        // 표본 분산 (ddof = 1). 윈도우가 작아 버퍼를 직접 순회
        let sq_dev: f64 = self.buffer.iter().map(|v| (v - mean).powi(2)).sum();
        let std = (sq_dev / (n - 1) as f64).sqrt();

        RollingStat { mean, std }
    }
}

/// 값 시퀀스의 각 위치에서 끝나는 rolling 통계 (최소 관측 1개).
pub fn rolling_series(values: &[f64], window: usize) -> Vec<RollingStat> {
    let mut rolling = RollingWindow::new(window);
    values.iter().map(|v| rolling.push(*v)).collect()
}

/// rolling 평균 feature 이름.
pub fn avg_feature_name(stat: StatKind, window: usize) -> String {
    format!("{}_avg_{}", stat.as_str(), window)
}

/// rolling 표준편차 feature 이름.
pub fn std_feature_name(stat: StatKind, window: usize) -> String {
    format!("{}_std_{}", stat.as_str(), window)
}

/// 예측 대상 경기 정보.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub season: i32,
    pub week: u32,
    pub is_playoff: bool,
    /// 팀 컨텍스트. 없으면 리그 평균 기본값 사용
    pub team_context: Option<TeamContext>,
}

impl UpcomingGame {
    pub fn new(season: i32, week: u32) -> Self {
        Self {
            season,
            week,
            is_playoff: false,
            team_context: None,
        }
    }

    pub fn with_playoff(mut self, is_playoff: bool) -> Self {
        self.is_playoff = is_playoff;
        self
    }

    pub fn with_team_context(mut self, team_context: Option<TeamContext>) -> Self {
        self.team_context = team_context;
        self
    }
}

/// 선수 히스토리를 feature vector로 변환하는 feature engineer.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    /// 주어진 설정으로 새 feature engineer 생성.
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// 기본 설정(윈도우 3, 5)으로 생성.
    pub fn with_defaults() -> Self {
        Self::new(FeatureConfig::default())
    }

    /// 설정 반환.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// 주어진 기준 스탯 목록에 대해 생성되는 feature 이름 (생성 순서).
    pub fn feature_names(&self, stats: &[StatKind]) -> Vec<String> {
        let mut names: Vec<String> = TEMPORAL_FEATURES.iter().map(|s| s.to_string()).collect();
        for &window in &self.config.windows {
            for &stat in stats {
                names.push(avg_feature_name(stat, window));
                names.push(std_feature_name(stat, window));
            }
        }
        names.extend(TeamContext::FEATURE_NAMES.iter().map(|s| s.to_string()));
        names
    }

    /// 다음 경기를 위한 feature vector 생성.
    ///
    /// rolling feature는 전체 히스토리에 대해 계산한 뒤 마지막 행만 사용하므로
    /// "다음 경기에 들어가는 폼"을 나타냅니다. 히스토리 길이는 호출자가
    /// 정합니다. 히스토리가 비어있으면 rolling feature를 모두 0.0으로 채운
    /// 동일한 키 집합의 vector를 반환합니다.
    pub fn prepare(
        &self,
        history: &PlayerHistory,
        stats: &[StatKind],
        upcoming: &UpcomingGame,
    ) -> FeatureVector {
        let mut features = FeatureVector::new();

        match history.latest() {
            Some(latest) => {
                // 마지막 과거 경기의 시간 feature로 시작한 뒤 다음 경기 값으로 덮어씀
                self.add_temporal_features(
                    &mut features,
                    latest.season,
                    latest.week,
                    latest.season_type.is_playoff(),
                );
                self.add_temporal_features(
                    &mut features,
                    upcoming.season,
                    upcoming.week,
                    upcoming.is_playoff,
                );
                self.add_rolling_features(&mut features, history.games(), stats);
            }
            None => {
                warn!("No player history available, using default features");
                self.add_temporal_features(
                    &mut features,
                    upcoming.season,
                    upcoming.week,
                    upcoming.is_playoff,
                );
                for &window in &self.config.windows {
                    for &stat in stats {
                        features.insert(avg_feature_name(stat, window), 0.0);
                        features.insert(std_feature_name(stat, window), 0.0);
                    }
                }
            }
        }

        self.add_team_context_features(&mut features, upcoming.team_context.as_ref());

        debug!(
            games = history.len(),
            max_window = self.config.max_window(),
            short_history = history.len() < self.config.max_window(),
            feature_count = features.len(),
            "Prepared inference features"
        );

        features
    }

    /// 필요한 feature 중 계산되지 않은 이름 목록.
    pub fn validate(&self, features: &FeatureVector, required: &[String]) -> Vec<String> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !features.contains(name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            warn!(?missing, "Missing features");
        }

        missing
    }

    /// feature vector를 모델 스키마 순서로 정렬.
    ///
    /// 없는 컬럼은 0.0으로 채우고(모델/feature 불일치 신호이므로 경고 로그),
    /// 스키마에 없는 컬럼은 버립니다.
    pub fn align(&self, features: &FeatureVector, required: &[String]) -> AlignedRow {
        let mut values = Vec::with_capacity(required.len());
        let mut filled = Vec::new();

        for name in required {
            match features.get(name) {
                Some(value) => values.push(value),
                None => {
                    warn!(feature = %name, "Adding missing feature with default value 0");
                    values.push(0.0);
                    filled.push(name.clone());
                }
            }
        }

        AlignedRow {
            columns: required.to_vec(),
            values,
            filled,
        }
    }

    fn add_temporal_features(
        &self,
        features: &mut FeatureVector,
        season: i32,
        week: u32,
        is_playoff: bool,
    ) {
        features.insert("season", f64::from(season));
        features.insert("week", f64::from(week));
        // 18주 초과(플레이오프)는 1.0을 넘도록 그대로 둔다
        features.insert(
            "season_progression",
            f64::from(week) / self.config.season_length_weeks,
        );
        features.insert("is_playoff", if is_playoff { 1.0 } else { 0.0 });
        // 일정 데이터가 없어 항상 원정으로 취급
        features.insert("is_home", 0.0);
    }

    fn add_rolling_features(
        &self,
        features: &mut FeatureVector,
        games: &[GameRecord],
        stats: &[StatKind],
    ) {
        for &window in &self.config.windows {
            for &stat in stats {
                let mut rolling = RollingWindow::new(window);
                let mut last = RollingStat { mean: 0.0, std: 0.0 };
                for game in games {
                    last = rolling.push(game.stat_or_zero(stat));
                }
                features.insert(avg_feature_name(stat, window), last.mean);
                features.insert(std_feature_name(stat, window), last.std);
            }
        }
    }

    fn add_team_context_features(
        &self,
        features: &mut FeatureVector,
        team_context: Option<&TeamContext>,
    ) {
        let context = team_context.unwrap_or(&self.config.default_team_context);
        for (name, value) in context.features() {
            features.insert(name, value);
        }
    }
}

const TEMPORAL_FEATURES: [&str; 5] = ["season", "week", "season_progression", "is_playoff", "is_home"];
