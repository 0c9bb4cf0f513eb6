//! 도메인 공통 에러 타입.
//!
//! 이 모듈은 도메인 타입 파싱과 설정 로드에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum HedgeError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력 (포지션, 방향, 시즌 유형 등 열거형 범위 밖의 값)
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 도메인 작업을 위한 Result 타입.
pub type HedgeResult<T> = Result<T, HedgeError>;

impl HedgeError {
    /// 호출자 입력 문제로 발생한 에러인지 확인합니다.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, HedgeError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for HedgeError {
    fn from(err: serde_json::Error) -> Self {
        HedgeError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for HedgeError {
    fn from(err: config::ConfigError) -> Self {
        HedgeError::Config(err.to_string())
    }
}
