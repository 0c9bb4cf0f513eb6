//! 선수 프롭 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 스탯 이름으로 예측
//! hedge predict -p QB -s passing_yards --history mahomes.json \
//!     --season 2024 --week 10 --threshold 275.5 --direction over
//!
//! # 액션 표시 이름으로 예측 (JSON 출력)
//! hedge predict -p WR -a "Receptions" --history jefferson.json \
//!     --season 2024 --week 10 --threshold 6.5 --direction under --json
//!
//! # feature vector 확인
//! hedge features -p RB --history henry.json --season 2024 --week 10
//!
//! # 지원 스탯과 모델 확인
//! hedge stats
//! hedge models
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use hedge_analytics::ml::PredictionService;
use hedge_cli::commands::inspect::{run_features, run_models, run_stats};
use hedge_cli::commands::predict::{run_predict, PredictConfig};
use hedge_core::{init_logging, AppConfig, LogConfig, Position};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "hedge")]
#[command(about = "Player prop prediction CLI - quantile 예측 기반 베팅 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, global = true, default_value = "config/default.toml", env = "HEDGE_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 선수 프롭 베팅 예측
    Predict {
        /// 포지션 (QB, RB, WR, TE)
        #[arg(short, long)]
        position: String,

        /// 스탯 이름 (예: passing_yards)
        #[arg(short, long, conflicts_with = "action")]
        stat: Option<String>,

        /// 액션 표시 이름 (예: "Passing Yards")
        #[arg(short, long)]
        action: Option<String>,

        /// 선수 이름 (로그용)
        #[arg(long)]
        player: Option<String>,

        /// 경기 기록 JSON 파일
        #[arg(long)]
        history: PathBuf,

        /// 예측할 경기의 시즌
        #[arg(long)]
        season: i32,

        /// 예측할 경기의 주차
        #[arg(long)]
        week: u32,

        /// 베팅 기준값
        #[arg(short, long)]
        threshold: f64,

        /// 베팅 방향 (over, under)
        #[arg(short, long, default_value = "over")]
        direction: String,

        /// 플레이오프 경기 여부
        #[arg(long, default_value = "false")]
        playoff: bool,

        /// 팀 컨텍스트 JSON 파일
        #[arg(long)]
        team_context: Option<PathBuf>,

        /// JSON으로 출력
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 경기 기록에서 만든 feature vector 출력
    Features {
        /// 포지션 (QB, RB, WR, TE)
        #[arg(short, long)]
        position: String,

        /// 경기 기록 JSON 파일
        #[arg(long)]
        history: PathBuf,

        #[arg(long)]
        season: i32,

        #[arg(long)]
        week: u32,

        #[arg(long, default_value = "false")]
        playoff: bool,

        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 포지션별 지원 스탯과 모델 존재 여부
    Stats {
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// 학습 메타데이터와 feature 스키마 목록
    Models,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    if let Err(e) = init_logging(LogConfig::from(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    info!(models = %config.models.dir.display(), "Configuration loaded");
    let service = PredictionService::from_config(&config);

    let result = match cli.command {
        Commands::Predict {
            position,
            stat,
            action,
            player,
            history,
            season,
            week,
            threshold,
            direction,
            playoff,
            team_context,
            json,
        } => run_predict(
            &service,
            PredictConfig {
                position,
                stat,
                action,
                player,
                history,
                season,
                week,
                threshold,
                direction,
                playoff,
                team_context,
                json,
            },
        ),
        Commands::Features {
            position,
            history,
            season,
            week,
            playoff,
            json,
        } => {
            let position: Position = position.parse()?;
            run_features(&service, position, &history, season, week, playoff, json)
        }
        Commands::Stats { json } => run_stats(&service, json),
        Commands::Models => run_models(&service),
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
