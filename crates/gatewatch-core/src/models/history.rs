//! 연결 이력 모델.

use serde::{Deserialize, Serialize};

/// 종료되었거나 아직 열린 과거 세션 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// 시작 시각 (epoch millis)
    pub start_date: i64,
    /// 종료 시각 (None이면 진행 중)
    #[serde(default)]
    pub end_date: Option<i64>,
    /// 사용자
    #[serde(default)]
    pub username: Option<String>,
    /// 원격 호스트
    #[serde(default)]
    pub remote_host: Option<String>,
}

impl HistoryEntry {
    pub fn new(start_date: i64) -> Self {
        Self {
            start_date,
            end_date: None,
            username: None,
            remote_host: None,
        }
    }

    /// 임의 JSON 응답에서 이력 목록 추출
    ///
    /// 배열이 아니면 빈 목록, `startDate`가 숫자가 아닌 항목은 버린다.
    pub fn parse_list(value: serde_json::Value) -> Vec<HistoryEntry> {
        match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// 입력 순서와 무관하게 가장 최근 시작 시각
    pub fn most_recent_start(history: &[HistoryEntry]) -> Option<i64> {
        history.iter().map(|h| h.start_date).max()
    }
}
