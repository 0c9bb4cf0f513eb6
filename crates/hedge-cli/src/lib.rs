//! 예측 엔진 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - JSON 경기 기록으로 예측 실행
//! - feature vector 확인
//! - 지원 스탯과 모델 아티팩트 점검

pub mod commands;
