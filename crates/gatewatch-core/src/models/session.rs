//! 활성 세션 모델.
//!
//! 현재 열려 있는 원격 세션과 데이터 소스별 세션 인덱스를 표현.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 현재 살아 있는 원격 세션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// 세션(활성 연결) 식별자
    #[serde(default)]
    pub identifier: Option<String>,
    /// 이 세션이 속한 연결 식별자
    #[serde(default)]
    pub connection_identifier: Option<String>,
    /// 접속한 원격 호스트 주소
    #[serde(default)]
    pub remote_host: Option<String>,
    /// 접속 사용자
    #[serde(default)]
    pub username: Option<String>,
    /// 세션 시작 시각 (epoch millis)
    #[serde(default)]
    pub start_date: Option<i64>,
}

impl ActiveSession {
    /// 이 세션이 주어진 연결에 귀속되는지
    pub fn belongs_to(&self, connection_id: &str) -> bool {
        self.connection_identifier.as_deref() == Some(connection_id)
    }

    /// `activeConnectionId → ActiveConnection` 응답에서 세션 목록 추출
    ///
    /// 객체가 아니면 빈 목록, 형식이 맞지 않는 항목은 버린다.
    /// 세션 식별자가 없으면 맵 키로 채운다.
    pub fn parse_map(value: serde_json::Value) -> Vec<ActiveSession> {
        let serde_json::Value::Object(entries) = value else {
            return Vec::new();
        };

        entries
            .into_iter()
            .filter_map(|(active_id, item)| {
                let mut session: ActiveSession = serde_json::from_value(item).ok()?;
                if session.identifier.is_none() {
                    session.identifier = Some(active_id);
                }
                Some(session)
            })
            .collect()
    }
}

/// 데이터 소스 → 연결 식별자 → 활성 세션 목록
///
/// 귀속 판단은 맵 키가 아니라 세션의 `connection_identifier` 필드로 한다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveSessionIndex(HashMap<String, HashMap<String, Vec<ActiveSession>>>);

impl ActiveSessionIndex {
    /// 빈 인덱스
    pub fn new() -> Self {
        Self::default()
    }

    /// 데이터 소스의 세션 그룹 전체를 설정
    pub fn insert_data_source(
        &mut self,
        data_source: impl Into<String>,
        by_connection: HashMap<String, Vec<ActiveSession>>,
    ) {
        self.0.insert(data_source.into(), by_connection);
    }

    /// 세션 하나를 `connection_identifier` 기준으로 추가
    pub fn push(&mut self, data_source: &str, session: ActiveSession) {
        let key = session.connection_identifier.clone().unwrap_or_default();
        self.0
            .entry(data_source.to_string())
            .or_default()
            .entry(key)
            .or_default()
            .push(session);
    }

    /// 주어진 연결에 귀속된 세션 (데이터 소스 내 전체 스캔)
    pub fn sessions_for(&self, data_source: &str, connection_id: &str) -> Vec<&ActiveSession> {
        self.0
            .get(data_source)
            .into_iter()
            .flat_map(|by_conn| by_conn.values())
            .flatten()
            .filter(|s| s.belongs_to(connection_id))
            .collect()
    }

    /// 세션 정보가 있는 데이터 소스 목록
    pub fn data_sources(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// 전체 세션 수
    pub fn total_sessions(&self) -> usize {
        self.0
            .values()
            .flat_map(|by_conn| by_conn.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_sessions() == 0
    }
}
