//! 엔진 설정 구조체.
//!
//! 게이트웨이 URL, 갱신 주기, 실패 정책, 활동 로그 용량, 시각 표시 오프셋 등
//! 런타임 설정을 정의한다. [`crate::config_manager::ConfigManager`]를 통해 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 게이트웨이 연결 설정
    pub gateway: GatewayConfig,
    /// 자동 갱신 설정
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 활동 로그 설정
    #[serde(default)]
    pub activity_log: ActivityLogConfig,
    /// 시각 표시 설정
    #[serde(default)]
    pub display: DisplayConfig,
}

// ============================================================
// 게이트웨이 설정
// ============================================================

/// 원격 데스크톱 게이트웨이 REST API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 게이트웨이 기본 URL (예: "https://gw.example.com/guacamole")
    pub base_url: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 연결 그룹 트리의 루트 식별자
    #[serde(default = "default_root_group_identifier")]
    pub root_group_identifier: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
            root_group_identifier: default_root_group_identifier(),
        }
    }
}

// ============================================================
// 갱신 설정
// ============================================================

/// 트리 조회 자체가 실패했을 때의 스냅샷 처리 정책 (활성 세션 실패는 빈 세션으로 대체)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 빈 스냅샷을 발행 (명시적 "데이터 없음" 상태)
    #[default]
    ClearSnapshot,
    /// 직전 스냅샷을 유지하고 stale로 표시
    KeepPrevious,
}

/// 자동 갱신 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// 갱신 주기 (밀리초, fixed-period)
    #[serde(default = "default_refresh_interval_ms")]
    pub interval_ms: u64,
    /// 서비스 생성 직후 자동 갱신 시작 여부
    #[serde(default = "default_true")]
    pub auto_start: bool,
    /// 스냅샷 빌드 실패 시 정책
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_refresh_interval_ms(),
            auto_start: true,
            failure_policy: FailurePolicy::default(),
        }
    }
}

// ============================================================
// 활동 로그 / 표시 설정
// ============================================================

/// 활동 로그(진단 링 버퍼) 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogConfig {
    /// 최대 보관 항목 수 (초과 시 가장 오래된 항목 제거)
    #[serde(default = "default_activity_log_capacity")]
    pub capacity: usize,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_activity_log_capacity(),
        }
    }
}

/// 시각 표시 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// 절대 시각 표시용 UTC 오프셋 (분). None이면 호스트 로컬 시간대
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            refresh: RefreshConfig::default(),
            activity_log: ActivityLogConfig::default(),
            display: DisplayConfig::default(),
        }
    }

    /// 요청 타임아웃을 Duration으로 반환
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway.request_timeout_ms)
    }

    /// 갱신 주기를 Duration으로 반환
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh.interval_ms)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:8080/guacamole".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_root_group_identifier() -> String {
    "ROOT".to_string()
}
fn default_refresh_interval_ms() -> u64 {
    10_000
}
fn default_activity_log_capacity() -> usize {
    100
}
