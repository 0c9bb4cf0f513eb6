//! JSON 입력 파일 읽기.

use anyhow::{Context, Result};
use hedge_core::{GameRecord, PlayerHistory, TeamContext};
use std::path::Path;
use tracing::info;

/// 경기 기록 JSON 배열 파일에서 선수 히스토리 로드.
///
/// 기록은 (season, week) 순으로 정렬됩니다.
pub fn load_history(path: &Path) -> Result<PlayerHistory> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))?;
    let games: Vec<GameRecord> = serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid game records in {}", path.display()))?;

    info!(games = games.len(), path = %path.display(), "Player history loaded");
    Ok(PlayerHistory::new(games))
}

/// 팀 컨텍스트 JSON 파일 로드.
pub fn load_team_context(path: &Path) -> Result<TeamContext> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read team context file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Invalid team context in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hedge-cli-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_history_sorts_games() {
        let path = temp_file(
            r#"[
                {"player_id": "p1", "season": 2024, "week": 3, "passing_yards": 250.0},
                {"player_id": "p1", "season": 2023, "week": 17, "season_type": "REG"},
                {"player_id": "p1", "season": 2024, "week": 1, "passing_yards": null}
            ]"#,
        );

        let history = load_history(&path).unwrap();
        let weeks: Vec<(i32, u32)> = history.games().iter().map(|g| (g.season, g.week)).collect();
        assert_eq!(weeks, vec![(2023, 17), (2024, 1), (2024, 3)]);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_history_errors() {
        assert!(load_history(Path::new("missing/history.json")).is_err());

        let path = temp_file("{\"not\": \"an array\"}");
        let err = load_history(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid game records"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_team_context() {
        let path = temp_file(
            r#"{"team_passing_yards": 260.0, "team_rushing_yards": 95.5,
                "team_receptions": 24.0, "team_targets": 36.0}"#,
        );
        let context = load_team_context(&path).unwrap();
        assert_eq!(context.team_rushing_yards, 95.5);
        std::fs::remove_file(&path).unwrap();
    }
}
