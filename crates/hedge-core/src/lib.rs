//! # Hedge Core
//!
//! 선수 프롭 베팅 예측 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 포지션 및 스탯 정의, 액션 이름 매핑
//! - 경기 기록과 선수 히스토리
//! - 베팅 방향과 팀 컨텍스트
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
