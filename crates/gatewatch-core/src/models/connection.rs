//! 연결 및 연결 그룹 모델.
//!
//! 게이트웨이의 연결 그룹 트리 응답과 연결별 파라미터 맵을 표현.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// 식별자가 없을 때 사용할 표시 이름
pub const UNNAMED_CONNECTION: &str = "Unnamed Connection";

/// 프로토콜 태그가 없을 때 사용할 값
pub const UNKNOWN_PROTOCOL: &str = "Unknown";

/// 원격 데스크톱 연결 정의
///
/// 한 갱신 주기 동안 불변. `data_source`는 트리 평탄화 시 채워진다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// 데이터 소스 내 고유 식별자
    #[serde(default, deserialize_with = "string_or_number")]
    pub identifier: Option<String>,
    /// 구형 응답의 대체 식별자 필드
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// 표시 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 프로토콜 태그 (rdp, vnc, ssh, telnet, ...)
    #[serde(default)]
    pub protocol: Option<String>,
    /// 상위 그룹 식별자
    #[serde(default, deserialize_with = "string_or_number")]
    pub parent_identifier: Option<String>,
    /// 게이트웨이가 기록한 마지막 활성 시각 (epoch millis)
    #[serde(default)]
    pub last_active: Option<i64>,
    /// 소속 데이터 소스 식별자
    #[serde(default)]
    pub data_source: String,
    /// 선언된 파라미터 (미조회 시 비어 있음)
    #[serde(default)]
    pub parameters: ConnectionParameters,
}

impl Connection {
    /// 유효 식별자. `identifier` 우선, 없으면 `id`. 빈 문자열은 없는 것으로 취급
    pub fn resolved_identifier(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_deref().filter(|s| !s.is_empty()))
    }

    /// 표시 이름 (없으면 "Unnamed Connection")
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNNAMED_CONNECTION)
    }

    /// 프로토콜 태그 (없으면 "Unknown")
    pub fn protocol_tag(&self) -> &str {
        self.protocol
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_PROTOCOL)
    }
}

/// 연결 그룹 트리 노드
///
/// 하위 컬렉션이 없거나 `null`이어도 빈 것으로 취급한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionGroupNode {
    /// 그룹 이름
    #[serde(default)]
    pub name: Option<String>,
    /// 그룹 식별자 (루트는 보통 "ROOT")
    #[serde(default, deserialize_with = "string_or_number")]
    pub identifier: Option<String>,
    /// 그룹 타입 (ORGANIZATIONAL, BALANCING)
    #[serde(default, rename = "type")]
    pub group_type: Option<String>,
    /// 이 그룹에 직접 속한 연결
    #[serde(default)]
    pub child_connections: Option<Vec<Connection>>,
    /// 하위 그룹
    #[serde(default)]
    pub child_connection_groups: Option<Vec<ConnectionGroupNode>>,
}

impl ConnectionGroupNode {
    /// 직접 속한 연결 (없으면 빈 슬라이스)
    pub fn connections(&self) -> &[Connection] {
        self.child_connections.as_deref().unwrap_or_default()
    }

    /// 하위 그룹 (없으면 빈 슬라이스)
    pub fn groups(&self) -> &[ConnectionGroupNode] {
        self.child_connection_groups.as_deref().unwrap_or_default()
    }
}

/// 연결별 선언 파라미터 (문자열 키 → 문자열 값)
///
/// 키 순서로 순회한다. 문자열이 아닌 JSON 값은 경계에서 버린다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct ConnectionParameters(BTreeMap<String, String>);

impl ConnectionParameters {
    /// 빈 파라미터 맵
    pub fn new() -> Self {
        Self::default()
    }

    /// 키 조회
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// 공백 제거 후 비어 있지 않은 값 조회
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// 키 순서대로 (키, 값) 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 키 목록 (로그용)
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}

impl From<BTreeMap<String, serde_json::Value>> for ConnectionParameters {
    fn from(raw: BTreeMap<String, serde_json::Value>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
        )
    }
}

impl From<ConnectionParameters> for BTreeMap<String, String> {
    fn from(params: ConnectionParameters) -> Self {
        params.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConnectionParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// 문자열 또는 숫자로 온 식별자를 문자열로 수용
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
