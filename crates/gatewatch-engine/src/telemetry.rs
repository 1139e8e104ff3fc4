//! tracing 초기화.
//!
//! 호스트가 자체 subscriber를 설치하지 않을 때 사용한다.
//! `RUST_LOG`가 있으면 우선하고, 없으면 crate별 필터 문자열을 쓴다.

use tracing_subscriber::EnvFilter;

/// gatewatch crate 필터 문자열 (예: "gatewatch_core=debug,...")
pub fn default_filter(level: &str) -> String {
    ["gatewatch_core", "gatewatch_network", "gatewatch_engine"]
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// 전역 subscriber 설치
///
/// 이미 설치되어 있으면 false.
pub fn init_tracing(level: &str) -> bool {
    let log_filter = default_filter(level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .try_init()
        .is_ok()
}
