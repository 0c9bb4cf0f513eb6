//! tracing 기반 로깅 초기화.
//!
//! 로그는 항상 stderr로 출력되어 CLI의 예측 결과(stdout)와 섞이지 않습니다.
//! 출력 형식은 `pretty`, `json`, `compact` 중 하나입니다.

use crate::config::LoggingConfig;
use crate::error::{HedgeError, HedgeResult};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// ONNX Runtime 내부 로그는 경고 이상만 출력
const QUIET_DIRECTIVES: &[&str] = &["ort=warn"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 개발용 여러 줄 형식
    #[default]
    Pretty,
    /// 로그 수집기용 JSON
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = HedgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(HedgeError::Config(format!(
                "Unknown log format '{}'. Must be one of [pretty, json, compact]",
                other
            ))),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 기본 필터 지시문 (예: "info", "hedge_analytics=debug")
    pub level: String,
    pub format: LogFormat,
    /// span 진입/종료 이벤트 출력. 예측 한 건의 소요 시간 확인용
    pub with_span_events: bool,
    /// 소스 파일과 줄 번호 출력
    pub with_file: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_span_events: false,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// `RUST_LOG`와 `LOG_FORMAT` 환경 변수에서 생성.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            config.format = format;
        }
        config
    }

    /// 필터 지시문 문자열. `ort`가 이미 지정되어 있지 않으면 조용히 만든다.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for quiet in QUIET_DIRECTIVES {
            let target = quiet.split('=').next().unwrap_or(quiet);
            if !self.level.contains(target) {
                directives.push(',');
                directives.push_str(quiet);
            }
        }
        directives
    }

    fn env_filter(&self) -> HedgeResult<EnvFilter> {
        // RUST_LOG가 있으면 설정 파일보다 우선
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(self.directives())
            .map_err(|e| HedgeError::Config(format!("Invalid log filter '{}': {}", self.level, e)))
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        // 알 수 없는 형식은 pretty
        let format = config.format.parse().unwrap_or_default();
        Self::new(config.level.clone()).with_format(format)
    }
}

/// 전역 subscriber 설치.
///
/// 이미 설치되어 있으면 `HedgeError::Config`를 반환합니다.
///
/// ```no_run
/// use hedge_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("hedge_analytics=debug").with_format(LogFormat::Json))?;
/// # Ok::<(), hedge_core::HedgeError>(())
/// ```
pub fn init_logging(config: LogConfig) -> HedgeResult<()> {
    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(config.env_filter()?);
    let installed = match config.format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
    installed.map_err(|e| HedgeError::Config(format!("Logging already initialized: {}", e)))?;

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}

/// `RUST_LOG`/`LOG_FORMAT`으로 초기화.
pub fn init_logging_from_env() -> HedgeResult<()> {
    init_logging(LogConfig::from_env())
}

/// 예측 요청 필드(포지션, 스탯, 방향)를 담은 span.
#[macro_export]
macro_rules! prediction_span {
    ($name:expr, $position:expr, $stat:expr) => {
        tracing::info_span!($name, position = %$position, stat = %$stat)
    };
    ($name:expr, $position:expr, $stat:expr, $direction:expr) => {
        tracing::info_span!(
            $name,
            position = %$position,
            stat = %$stat,
            direction = %$direction
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(" Json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        match "xml".parse::<LogFormat>() {
            Err(HedgeError::Config(msg)) => assert!(msg.contains("xml")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_directives_quiet_ort() {
        let config = LogConfig::new("hedge_analytics=debug");
        assert_eq!(config.directives(), "hedge_analytics=debug,ort=warn");

        let explicit = LogConfig::new("info,ort=trace");
        assert_eq!(explicit.directives(), "info,ort=trace");
    }

    #[test]
    fn test_from_logging_config_falls_back_to_pretty() {
        let settings = LoggingConfig {
            level: "warn".to_string(),
            format: "nonsense".to_string(),
        };
        let config = LogConfig::from(&settings).with_span_events(true);
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.with_span_events);
        assert!(!config.with_file);
    }
}
