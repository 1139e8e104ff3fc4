//! 연결 상태 판정.
//!
//! 두 가지 판정을 독립적으로 계산한다.
//! - 세션 활동: 지금 누가 쓰고 있는가 (활성 세션 + 최근 이력)
//! - 머신 상태: 대상 호스트가 도달 가능해 보이는가 (주소 + 세션 + 이력 나이 + 파라미터)

use chrono::{DateTime, Utc};
use gatewatch_core::models::connection::ConnectionParameters;
use gatewatch_core::models::history::HistoryEntry;
use gatewatch_core::models::session::ActiveSession;
use gatewatch_core::models::status::{
    MachineStatus, ResolvedAddress, SessionActivity, Verdict, NO_CONNECTED_HOSTS,
};

use crate::address::has_host_parameter;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// "최근 활동"으로 보는 구간
pub const RECENT_ACTIVITY_MS: i64 = 5 * MINUTE_MS;

/// 세션 활동 판정
pub fn classify_session_activity(
    sessions: &[&ActiveSession],
    history: &[HistoryEntry],
    now: DateTime<Utc>,
) -> Verdict<SessionActivity> {
    if !sessions.is_empty() {
        return Verdict::new(SessionActivity::Active, format!("{} Active", sessions.len()));
    }

    match HistoryEntry::most_recent_start(history) {
        Some(start) if elapsed_since(now, start) <= RECENT_ACTIVITY_MS => {
            Verdict::new(SessionActivity::Recent, "Recently Active")
        }
        _ => Verdict::new(SessionActivity::Inactive, "Inactive"),
    }
}

/// 머신 상태 판정 (우선순위 순, 처음 해당하는 단계)
pub fn classify_machine_status(
    address: &ResolvedAddress,
    session_count: usize,
    history: &[HistoryEntry],
    parameters: &ConnectionParameters,
    now: DateTime<Utc>,
) -> Verdict<MachineStatus> {
    if !address.is_available() {
        return Verdict::new(MachineStatus::Unknown, "Unknown");
    }

    if session_count > 0 {
        let noun = if session_count == 1 { "user" } else { "users" };
        return Verdict::new(
            MachineStatus::Active,
            format!("{session_count} {noun} online"),
        );
    }

    if let Some(start) = HistoryEntry::most_recent_start(history) {
        return classify_history_age(elapsed_since(now, start));
    }

    if has_host_parameter(parameters) {
        return Verdict::new(MachineStatus::Connectable, "Connectable");
    }

    Verdict::new(MachineStatus::Unknown, "Unknown")
}

/// 시작 시각 이후 경과 밀리초 (범위 밖 값은 포화)
fn elapsed_since(now: DateTime<Utc>, start: i64) -> i64 {
    now.timestamp_millis().saturating_sub(start)
}

/// 마지막 세션 시작 이후 경과 시간으로 단계 결정 (경계 포함)
fn classify_history_age(elapsed_ms: i64) -> Verdict<MachineStatus> {
    if elapsed_ms <= RECENT_ACTIVITY_MS {
        Verdict::new(MachineStatus::Active, "Recently Active")
    } else if elapsed_ms <= HOUR_MS {
        Verdict::new(MachineStatus::Recent, "Recent (1h)")
    } else if elapsed_ms <= DAY_MS {
        Verdict::new(MachineStatus::Recent, "Recent (24h)")
    } else {
        let days = elapsed_ms / DAY_MS;
        if days < 7 {
            Verdict::new(MachineStatus::NoRecent, format!("{days}d ago"))
        } else {
            Verdict::new(MachineStatus::NoRecent, "Inactive")
        }
    }
}

/// 현재 접속 중인 원격 호스트 목록
///
/// 빈 값과 "null"/"undefined" 문자열은 버리고, 처음 나온 순서대로 중복 제거.
pub fn connected_hosts(sessions: &[&ActiveSession]) -> String {
    let mut hosts: Vec<&str> = Vec::new();
    for host in sessions.iter().filter_map(|s| s.remote_host.as_deref()) {
        let host = host.trim();
        if host.is_empty() || host == "null" || host == "undefined" {
            continue;
        }
        if !hosts.contains(&host) {
            hosts.push(host);
        }
    }

    if hosts.is_empty() {
        NO_CONNECTED_HOSTS.to_string()
    } else {
        hosts.join(", ")
    }
}
