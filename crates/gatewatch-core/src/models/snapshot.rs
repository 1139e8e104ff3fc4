//! 스냅샷 모델.
//!
//! 한 갱신 주기의 전체 연결 상태 레코드. 엔진이 발행하는 유일한 가변 상태.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::status::ConnectionStatusRecord;

/// 한 주기의 정렬된 연결 상태 레코드 집합
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// 발행 주기 번호 (0은 아직 한 번도 발행되지 않음)
    pub cycle: u64,
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 직전 스냅샷을 유지한 경우 true (트리 조회 실패)
    pub stale: bool,
    /// 주소 오름차순, "N/A" 마지막
    pub records: Vec<ConnectionStatusRecord>,
}

impl Snapshot {
    /// 초기 빈 스냅샷
    pub fn initial() -> Self {
        Self {
            cycle: 0,
            generated_at: Utc::now(),
            stale: false,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 식별자로 레코드 조회
    pub fn find(&self, data_source: &str, identifier: &str) -> Option<&ConnectionStatusRecord> {
        self.records
            .iter()
            .find(|r| r.data_source == data_source && r.identifier == identifier)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::initial()
    }
}
