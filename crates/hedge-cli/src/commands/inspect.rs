//! 모델 아티팩트와 feature 점검 명령.

use crate::commands::input::load_history;
use anyhow::Result;
use hedge_analytics::ml::{FeatureVector, PredictionRequest, PredictionService};
use hedge_core::{BetDirection, Position};
use serde::Serialize;
use std::path::Path;

/// 포지션별 지원 스탯과 모델 존재 여부.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatAvailability {
    pub position: Position,
    pub stat: String,
    pub display_name: String,
    pub model_available: bool,
}

/// 모든 포지션의 스탯 가용성 조회.
pub fn stat_availability(service: &PredictionService) -> Vec<StatAvailability> {
    Position::ALL
        .iter()
        .flat_map(|&position| {
            position.supported_stats().iter().map(move |stat| StatAvailability {
                position,
                stat: stat.as_str().to_string(),
                display_name: stat.display_name().to_string(),
                model_available: service.registry().model_exists(position, stat.as_str()),
            })
        })
        .collect()
}

/// 스탯 목록 출력.
pub fn run_stats(service: &PredictionService, json: bool) -> Result<()> {
    let rows = stat_availability(service);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<4} {:<24} {:<22} {}", "POS", "STAT", "ACTION", "MODEL");
    for row in &rows {
        println!(
            "{:<4} {:<24} {:<22} {}",
            row.position,
            row.stat,
            row.display_name,
            if row.model_available { "yes" } else { "-" }
        );
    }
    Ok(())
}

/// 히스토리에서 만든 feature vector.
pub fn features_for(
    service: &PredictionService,
    position: Position,
    history: &Path,
    season: i32,
    week: u32,
    playoff: bool,
) -> Result<FeatureVector> {
    // feature는 스탯과 방향에 의존하지 않음
    let request = PredictionRequest::new(
        position,
        String::new(),
        load_history(history)?,
        season,
        week,
        0.0,
        BetDirection::Over,
    )
    .with_playoff(playoff);
    Ok(service.features(&request))
}

/// feature vector 출력.
pub fn run_features(
    service: &PredictionService,
    position: Position,
    history: &Path,
    season: i32,
    week: u32,
    playoff: bool,
    json: bool,
) -> Result<()> {
    let features = features_for(service, position, history, season, week, playoff)?;

    if json {
        let map: serde_json::Map<String, serde_json::Value> = features
            .iter()
            .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (name, value) in features.iter() {
            println!("{:<32} {:>12.4}", name, value);
        }
    }
    Ok(())
}

/// 학습 메타데이터와 스키마 항목 출력.
pub fn run_models(service: &PredictionService) -> Result<()> {
    let registry = service.registry();
    let metadata = registry.metadata();

    match metadata.trained_at {
        Some(trained_at) => println!("trained at: {}", trained_at.to_rfc3339()),
        None => println!("trained at: unknown"),
    }
    if let Some(range) = &metadata.data_range {
        println!("data range: {}", range);
    }
    for (name, info) in &metadata.models {
        println!("  {}: {}", name, info);
    }

    let keys = registry.schema_keys()?;
    println!("feature schemas ({}):", keys.len());
    for key in keys {
        println!("  {}", key);
    }
    Ok(())
}
