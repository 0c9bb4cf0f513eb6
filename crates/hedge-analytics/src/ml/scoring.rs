//! 베팅 점수 계산.
//!
//! 세 quantile 예측과 기준값으로부터 승리 확률, 신뢰도, edge, 추천을
//! 계산하는 순수 함수 모음입니다. 입출력 외의 상태는 없습니다.
//!
//! 승리 확률은 보정된 확률이 아니라 quantile 앵커 사이의 구간별 선형
//! 휴리스틱입니다.

use crate::ml::types::{ConfidenceLevel, Quantile, Recommendation};
use hedge_core::BetDirection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 스프레드가 0인 경우의 분모 보호값.
pub const SPREAD_EPSILON: f64 = 0.001;
/// 승리 확률 하한.
pub const MIN_WIN_PROBABILITY: f64 = 0.05;
/// 승리 확률 상한.
pub const MAX_WIN_PROBABILITY: f64 = 0.95;

/// 점수 계산에 사용하는 세 quantile 앵커.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileAnchors {
    pub q10: f64,
    pub q50: f64,
    pub q90: f64,
}

impl QuantileAnchors {
    pub fn new(q10: f64, q50: f64, q90: f64) -> Self {
        Self { q10, q50, q90 }
    }

    /// 예측 맵에서 생성. 없는 quantile은 0.0.
    pub fn from_predictions(predictions: &BTreeMap<Quantile, f64>) -> Self {
        let get = |q| predictions.get(&q).copied().unwrap_or(0.0);
        Self::new(get(Quantile::Q10), get(Quantile::Q50), get(Quantile::Q90))
    }

    /// q90 - q10.
    pub fn spread(&self) -> f64 {
        self.q90 - self.q10
    }

    /// (q90 - q10) / (q50 + 1).
    pub fn relative_spread(&self) -> f64 {
        self.spread() / (self.q50 + 1.0)
    }
}

/// 점수 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 소수점 3자리로 반올림된 승리 확률
    pub win_probability: f64,
    pub confidence_level: ConfidenceLevel,
    /// 결합 신뢰도 점수 (0.0 ~ 2.0)
    pub confidence_score: f64,
    /// 2 × win_probability − 1
    pub edge: f64,
    pub recommendation: Recommendation,
    pub prediction_spread: f64,
    pub relative_spread: f64,
    pub distance_from_median: f64,
}

/// 앵커와 기준값으로부터 전체 점수 계산.
///
/// 신뢰도와 추천은 반올림 전 확률로 계산하고, edge는 반올림된 확률에서
/// 계산합니다.
pub fn score(anchors: &QuantileAnchors, threshold: f64, direction: BetDirection) -> ScoreBreakdown {
    let raw_probability = win_probability(anchors, threshold, direction);
    let spread = spread_score(anchors.relative_spread());
    let confidence_score = combined_score(spread, raw_probability);
    let confidence_level = ConfidenceLevel::from_score(confidence_score);
    let win_probability = round_to(raw_probability, 3);

    ScoreBreakdown {
        win_probability,
        confidence_level,
        confidence_score,
        edge: edge(win_probability),
        recommendation: recommendation(raw_probability, confidence_level),
        prediction_spread: round_to(anchors.spread(), 2),
        relative_spread: round_to(anchors.relative_spread(), 3),
        distance_from_median: round_to((threshold - anchors.q50).abs(), 2),
    }
}

/// 구간별 선형 승리 확률. 항상 [0.05, 0.95].
///
/// over는 `[q50, q90]`, under는 `[q10, q50)`을 낮은 쪽 구간으로 씁니다.
/// 기준값이 q50과 정확히 같으면 over는 0.50이고, under는 위쪽 구간
/// (`0.90 − …`)을 쓰므로 q50 == q90이면 0.90입니다.
pub fn win_probability(anchors: &QuantileAnchors, threshold: f64, direction: BetDirection) -> f64 {
    let QuantileAnchors { q10, q50, q90 } = *anchors;
    let t = threshold;

    let probability = match direction {
        BetDirection::Over => {
            if t < q10 {
                MAX_WIN_PROBABILITY
            } else if t > q90 {
                MIN_WIN_PROBABILITY
            } else if t >= q50 {
                0.50 - ((t - q50) / (q90 - q50 + SPREAD_EPSILON)) * 0.40
            } else {
                0.90 - ((t - q10) / (q50 - q10 + SPREAD_EPSILON)) * 0.40
            }
        }
        BetDirection::Under => {
            if t > q90 {
                MAX_WIN_PROBABILITY
            } else if t < q10 {
                MIN_WIN_PROBABILITY
            } else if t < q50 {
                0.50 - ((q50 - t) / (q50 - q10 + SPREAD_EPSILON)) * 0.40
            } else {
                0.90 - ((q90 - t) / (q90 - q50 + SPREAD_EPSILON)) * 0.40
            }
        }
    };

    // 교차한 quantile로 분모가 0이 되면 중립값
    if probability.is_nan() {
        return 0.50;
    }
    probability.clamp(MIN_WIN_PROBABILITY, MAX_WIN_PROBABILITY)
}

/// 상대 스프레드에서 모델 확신 점수 (0, 1, 2).
pub fn spread_score(relative_spread: f64) -> f64 {
    if relative_spread < 0.3 {
        2.0
    } else if relative_spread < 0.6 {
        1.0
    } else {
        0.0
    }
}

/// 승리 확률이 0.5에서 떨어진 정도 (0.0 ~ 2.0).
pub fn probability_score(win_probability: f64) -> f64 {
    (win_probability - 0.5).abs() * 4.0
}

/// 스프레드 점수와 확률 점수를 확률 구간에 따라 결합.
///
/// 극단 구간에서는 확률을, 중간 구간에서는 스프레드를 더 가중합니다.
pub fn combined_score(spread_score: f64, win_probability: f64) -> f64 {
    let p = probability_score(win_probability);

    if win_probability >= 0.90 || win_probability <= 0.10 {
        (0.2 * spread_score + 0.8 * p).max(1.4)
    } else if win_probability >= 0.80 || win_probability <= 0.20 {
        0.5 * spread_score + 0.5 * p
    } else {
        0.7 * spread_score + 0.3 * p
    }
}

/// 신뢰도 수준.
pub fn confidence(anchors: &QuantileAnchors, win_probability: f64) -> ConfidenceLevel {
    let spread = spread_score(anchors.relative_spread());
    ConfidenceLevel::from_score(combined_score(spread, win_probability))
}

/// 2p − 1. 금전적 기대값이 아님.
pub fn edge(win_probability: f64) -> f64 {
    2.0 * win_probability - 1.0
}

/// 신뢰도별 기준으로 추천 결정. 신뢰도가 낮을수록 높은 확률을 요구.
pub fn recommendation(win_probability: f64, confidence: ConfidenceLevel) -> Recommendation {
    let (good, fair, risky) = match confidence {
        ConfidenceLevel::Low => (0.75, 0.65, 0.55),
        ConfidenceLevel::Medium => (0.60, 0.50, 0.40),
        ConfidenceLevel::High => (0.55, 0.45, 0.35),
    };

    if win_probability >= good {
        Recommendation::GoodBet
    } else if win_probability >= fair {
        Recommendation::FairBet
    } else if win_probability >= risky {
        Recommendation::RiskyBet
    } else {
        Recommendation::PoorBet
    }
}

/// 소수점 `decimals`자리 반올림.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anchors() -> QuantileAnchors {
        QuantileAnchors::new(250.0, 300.0, 350.0)
    }

    #[test]
    fn test_threshold_at_median() {
        assert_eq!(win_probability(&anchors(), 300.0, BetDirection::Over), 0.50);

        // under는 q50에서 위쪽 구간: 0.90 − 50/50.001·0.40
        let under = win_probability(&anchors(), 300.0, BetDirection::Under);
        assert!(under > 0.50);
        assert!((under - 0.50).abs() < 1e-4);
    }

    #[test]
    fn test_under_boundaries() {
        let under = |a: &QuantileAnchors, t: f64| win_probability(a, t, BetDirection::Under);

        let q10 = under(&anchors(), 250.0);
        assert!((q10 - 0.10).abs() < 1e-4);
        assert!((under(&anchors(), 300.0) - 0.50).abs() < 1e-4);
        assert_eq!(under(&anchors(), 350.0), 0.90);

        // q50 == q90
        let upper_flat = QuantileAnchors::new(200.0, 300.0, 300.0);
        assert!((under(&upper_flat, 200.0) - 0.10).abs() < 1e-4);
        assert_eq!(under(&upper_flat, 300.0), 0.90);

        // q10 == q50
        let lower_flat = QuantileAnchors::new(300.0, 300.0, 400.0);
        assert!((under(&lower_flat, 300.0) - 0.50).abs() < 1e-4);
        assert_eq!(under(&lower_flat, 400.0), 0.90);

        let flat = QuantileAnchors::new(1.0, 1.0, 1.0);
        assert_eq!(under(&flat, 1.0), 0.90);
        assert_eq!(under(&flat, 0.5), 0.05);
        assert_eq!(under(&flat, 1.5), 0.95);
    }

    #[test]
    fn test_under_at_collapsed_upper_half() {
        let anchors = QuantileAnchors::new(200.0, 300.0, 300.0);
        let breakdown = score(&anchors, 300.0, BetDirection::Under);

        assert_eq!(breakdown.win_probability, 0.90);
        assert_eq!(breakdown.confidence_level, ConfidenceLevel::High);
        assert_eq!(breakdown.recommendation, Recommendation::GoodBet);
        assert!((breakdown.confidence_score - 1.48).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_at_outer_anchors() {
        let over_q10 = win_probability(&anchors(), 250.0, BetDirection::Over);
        assert!((over_q10 - 0.90).abs() < 1e-9);

        let over_q90 = win_probability(&anchors(), 350.0, BetDirection::Over);
        assert!((over_q90 - 0.10).abs() < 1e-4);

        let under_q90 = win_probability(&anchors(), 350.0, BetDirection::Under);
        assert!((under_q90 - 0.90).abs() < 1e-9);
    }

    #[test]
    fn test_outside_range() {
        assert_eq!(win_probability(&anchors(), 100.0, BetDirection::Over), 0.95);
        assert_eq!(win_probability(&anchors(), 400.0, BetDirection::Over), 0.05);
        assert_eq!(win_probability(&anchors(), 400.0, BetDirection::Under), 0.95);
        assert_eq!(win_probability(&anchors(), 100.0, BetDirection::Under), 0.05);
    }

    #[test]
    fn test_zero_spread() {
        let flat = QuantileAnchors::new(1.0, 1.0, 1.0);
        let p = win_probability(&flat, 1.0, BetDirection::Over);
        assert!(p.is_finite());
        assert_eq!(p, 0.50);
    }

    #[test]
    fn test_spread_score_bands() {
        assert_eq!(spread_score(0.1), 2.0);
        assert_eq!(spread_score(0.3), 1.0);
        assert_eq!(spread_score(0.59), 1.0);
        assert_eq!(spread_score(0.6), 0.0);
    }

    #[test]
    fn test_extreme_probability_floor() {
        // 스프레드가 커도 극단 확률은 High
        assert_eq!(combined_score(0.0, 0.90), 1.4);
        assert_eq!(
            ConfidenceLevel::from_score(combined_score(0.0, 0.05)),
            ConfidenceLevel::High
        );
    }

    #[test]
    fn test_confidence_from_anchors() {
        // 상대 스프레드 100/301 ≈ 0.33 → 스프레드 점수 1
        assert_eq!(confidence(&anchors(), 0.5), ConfidenceLevel::Medium);
        let wide = QuantileAnchors::new(0.0, 10.0, 50.0);
        assert_eq!(confidence(&wide, 0.6), ConfidenceLevel::Low);
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(recommendation(0.75, ConfidenceLevel::Low), Recommendation::GoodBet);
        assert_eq!(recommendation(0.70, ConfidenceLevel::Low), Recommendation::FairBet);
        assert_eq!(recommendation(0.55, ConfidenceLevel::Low), Recommendation::RiskyBet);
        assert_eq!(recommendation(0.50, ConfidenceLevel::Low), Recommendation::PoorBet);
        assert_eq!(recommendation(0.50, ConfidenceLevel::Medium), Recommendation::FairBet);
        assert_eq!(recommendation(0.35, ConfidenceLevel::High), Recommendation::RiskyBet);
        assert_eq!(recommendation(0.30, ConfidenceLevel::High), Recommendation::PoorBet);
    }

    #[test]
    fn test_missing_quantile_defaults_to_zero() {
        let mut predictions = BTreeMap::new();
        predictions.insert(Quantile::Q50, 42.0);
        let anchors = QuantileAnchors::from_predictions(&predictions);
        assert_eq!(anchors, QuantileAnchors::new(0.0, 42.0, 0.0));
    }

    #[test]
    fn test_score_rounding() {
        let breakdown = score(&QuantileAnchors::new(10.123, 20.456, 30.789), 21.0, BetDirection::Over);
        assert_eq!(breakdown.prediction_spread, 20.67);
        assert_eq!(breakdown.relative_spread, 0.963);
        assert_eq!(breakdown.distance_from_median, 0.54);
        assert_eq!(breakdown.win_probability, round_to(breakdown.win_probability, 3));
    }

    fn ordered_anchors() -> impl Strategy<Value = QuantileAnchors> {
        (0.0f64..500.0, 0.0f64..200.0, 0.0f64..200.0)
            .prop_map(|(q10, d1, d2)| QuantileAnchors::new(q10, q10 + d1, q10 + d1 + d2))
    }

    fn direction() -> impl Strategy<Value = BetDirection> {
        prop_oneof![Just(BetDirection::Over), Just(BetDirection::Under)]
    }

    proptest! {
        #[test]
        fn prop_win_probability_clamped(
            anchors in ordered_anchors(),
            threshold in -1000.0f64..2000.0,
            direction in direction(),
        ) {
            let p = win_probability(&anchors, threshold, direction);
            prop_assert!((MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY).contains(&p));
        }

        #[test]
        fn prop_win_probability_clamped_unordered(
            q10 in -100.0f64..100.0,
            q50 in -100.0f64..100.0,
            q90 in -100.0f64..100.0,
            threshold in -200.0f64..200.0,
            direction in direction(),
        ) {
            let p = win_probability(&QuantileAnchors::new(q10, q50, q90), threshold, direction);
            prop_assert!((MIN_WIN_PROBABILITY..=MAX_WIN_PROBABILITY).contains(&p));
        }

        #[test]
        fn prop_edge_identity(
            anchors in ordered_anchors(),
            threshold in 0.0f64..1000.0,
            direction in direction(),
        ) {
            let breakdown = score(&anchors, threshold, direction);
            prop_assert_eq!(breakdown.edge, 2.0 * breakdown.win_probability - 1.0);
        }

        #[test]
        fn prop_confidence_monotonic_above_half(
            spread in prop_oneof![Just(0.0), Just(1.0), Just(2.0)],
            p in 0.5f64..=0.95,
            delta in 0.0f64..0.45,
        ) {
            let farther = (p + delta).min(MAX_WIN_PROBABILITY);
            let near = ConfidenceLevel::from_score(combined_score(spread, p));
            let far = ConfidenceLevel::from_score(combined_score(spread, farther));
            prop_assert!(far >= near);
        }

        #[test]
        fn prop_confidence_monotonic_below_half(
            spread in prop_oneof![Just(0.0), Just(1.0), Just(2.0)],
            p in 0.05f64..=0.5,
            delta in 0.0f64..0.45,
        ) {
            let farther = (p - delta).max(MIN_WIN_PROBABILITY);
            let near = ConfidenceLevel::from_score(combined_score(spread, p));
            let far = ConfidenceLevel::from_score(combined_score(spread, farther));
            prop_assert!(far >= near);
        }
    }
}
