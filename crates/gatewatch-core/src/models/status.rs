//! 연결 상태 판정 및 출력 레코드 모델.
//!
//! 매 주기 새로 계산되며 저장되지 않는다.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

/// 주소를 확정할 수 없을 때의 표시 값
pub const ADDRESS_UNAVAILABLE: &str = "N/A";

/// 활성 세션이 없을 때의 접속 호스트 표시 값
pub const NO_CONNECTED_HOSTS: &str = "None";

/// 머신 상태 (도달 가능성 추정)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    /// 사용자 접속 중 또는 5분 이내 활동
    Active,
    /// 24시간 이내 활동
    Recent,
    /// 24시간 이전 활동
    NoRecent,
    /// 이력은 없으나 호스트 파라미터가 있음
    Connectable,
    /// 판단 근거 없음
    Unknown,
}

/// 세션 활동 상태 (지금 누가 쓰고 있는가)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionActivity {
    Active,
    Recent,
    Inactive,
}

/// 상태 종류 + 사람이 읽는 라벨
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict<K> {
    /// 상태 종류
    pub kind: K,
    /// 표시 라벨
    pub label: String,
}

impl<K> Verdict<K> {
    pub fn new(kind: K, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

/// 확정된 연결 주소
///
/// 점 표기 IPv4 이거나 "N/A" 둘 중 하나만 존재한다.
/// 정렬 시 IPv4는 옥텟 오름차순, "N/A"는 항상 마지막.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolvedAddress {
    Ipv4(Ipv4Addr),
    Unavailable,
}

impl ResolvedAddress {
    /// 엄격한 점 표기 IPv4만 수용 (옥텟 0-255, 앞자리 0과 앞뒤 공백 불허)
    pub fn parse_strict(value: &str) -> Option<Self> {
        value.parse::<Ipv4Addr>().ok().map(Self::Ipv4)
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Ipv4(_))
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4(addr) => write!(f, "{addr}"),
            Self::Unavailable => f.write_str(ADDRESS_UNAVAILABLE),
        }
    }
}

impl Serialize for ResolvedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResolvedAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_strict(&raw).unwrap_or(Self::Unavailable))
    }
}

/// 마지막 접속 시각 표시
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastConnection {
    /// 절대 시각 문자열 (예: "Oct 19, 2026, 02:05 PM")
    pub formatted: String,
    /// 상대 시각 문구 (예: "3 hours ago")
    pub relative: String,
    /// 원본 시각 (epoch millis), 없으면 None
    pub timestamp: Option<i64>,
}

impl LastConnection {
    /// 접속 기록이 전혀 없는 경우
    pub fn never() -> Self {
        Self {
            formatted: "Never".to_string(),
            relative: "Never connected".to_string(),
            timestamp: None,
        }
    }
}

/// 연결 실행 링크 (검증된 URL을 그대로 사용)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    /// 클라이언트 실행 URL
    pub href: String,
    /// 버튼 라벨
    pub label: String,
}

/// 연결 하나의 상태 레코드 (스냅샷의 단위)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusRecord {
    /// 연결 식별자
    pub identifier: String,
    /// 데이터 소스
    pub data_source: String,
    /// 표시 이름
    pub connection_name: String,
    /// 확정 주소 또는 "N/A"
    pub ip_address: ResolvedAddress,
    /// 머신 상태
    pub machine_status: Verdict<MachineStatus>,
    /// 세션 활동 상태
    pub session_status: Verdict<SessionActivity>,
    /// 현재 접속 중인 원격 호스트 (쉼표 구분, 없으면 "None")
    pub connected_ips: String,
    /// 프로토콜
    pub protocol: String,
    /// 마지막 접속 시각
    pub last_connection: LastConnection,
    /// 실행 링크
    pub action: ActionLink,
}
