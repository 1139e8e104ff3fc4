//! 마지막 접속 시각 표시.
//!
//! 절대 시각("Oct 19, 2026, 02:05 PM")과 상대 문구("3 hours ago")를 만든다.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use gatewatch_core::config::DisplayConfig;
use gatewatch_core::models::history::HistoryEntry;
use gatewatch_core::models::status::LastConnection;
use tracing::warn;

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// 절대 시각 포맷
pub const ABSOLUTE_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// 절대 시각을 표시할 시간대
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    /// 호스트 로컬 시간대
    #[default]
    Local,
    /// 고정 UTC 오프셋
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// 설정에서 생성 (범위를 벗어난 오프셋은 로컬 시간대로 대체)
    pub fn from_config(display: &DisplayConfig) -> Self {
        match display.utc_offset_minutes {
            None => Self::Local,
            Some(minutes) => match minutes.checked_mul(60).and_then(FixedOffset::east_opt) {
                Some(offset) => Self::Fixed(offset),
                None => {
                    warn!("잘못된 UTC 오프셋 {minutes}분, 로컬 시간대 사용");
                    Self::Local
                }
            },
        }
    }

    /// 절대 시각 문자열
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        self.format_with(instant, ABSOLUTE_FORMAT)
    }

    /// 임의 strftime 포맷으로 표시
    pub fn format_with(&self, instant: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            Self::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
        }
    }
}

/// 마지막 접속 시각 계산
///
/// 이력의 최근 시작 시각과 연결의 `lastActive` 중 늦은 쪽을 쓴다.
pub fn format_last_connection(
    history: &[HistoryEntry],
    last_active: Option<i64>,
    now: DateTime<Utc>,
    zone: &DisplayZone,
) -> LastConnection {
    let Some(timestamp) = HistoryEntry::most_recent_start(history).max(last_active) else {
        return LastConnection::never();
    };

    let Some(instant) = Utc.timestamp_millis_opt(timestamp).single() else {
        warn!(timestamp, "표시할 수 없는 시각");
        return LastConnection::never();
    };

    LastConnection {
        formatted: zone.format(instant),
        relative: relative_phrase(now.timestamp_millis() - timestamp),
        timestamp: Some(timestamp),
    }
}

/// 경과 시간 → 상대 문구 (시간/일/주 단위 반올림)
pub fn relative_phrase(elapsed_ms: i64) -> String {
    let elapsed = elapsed_ms as f64;
    let hours_ago = (elapsed / HOUR_MS).round() as i64;
    let days_ago = (elapsed / DAY_MS).round() as i64;

    if hours_ago < 1 {
        "Just now".to_string()
    } else if hours_ago < 24 {
        plural(hours_ago, "hour")
    } else if days_ago < 7 {
        plural(days_ago, "day")
    } else {
        let weeks_ago = (days_ago as f64 / 7.0).round() as i64;
        plural(weeks_ago, "week")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}
