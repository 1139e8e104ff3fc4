//! 연결 주소 추출.
//!
//! 표시 이름 → 프로토콜별 후보 파라미터 → 전체 파라미터 스캔 순으로
//! 처음 찾은 IPv4 주소를 사용한다. 찾지 못하면 [`ResolvedAddress::Unavailable`].

use gatewatch_core::models::connection::ConnectionParameters;
use gatewatch_core::models::status::ResolvedAddress;

/// 프로토콜 → 후보 파라미터 키 목록
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKeys {
    /// rdp, vnc, ssh, telnet
    Standard,
    /// 그 외 모든 프로토콜
    Fallback,
}

impl CandidateKeys {
    /// 프로토콜 태그로 후보 목록 선택 (대소문자 무시)
    pub fn for_protocol(protocol: &str) -> Self {
        match protocol.to_ascii_lowercase().as_str() {
            "rdp" | "vnc" | "ssh" | "telnet" => Self::Standard,
            _ => Self::Fallback,
        }
    }

    /// 우선순위 순 키 목록
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["hostname", "host"],
            Self::Fallback => &["hostname", "host", "server", "address", "ip"],
        }
    }
}

/// 연결 주소 확정
pub fn resolve_address(
    connection_name: &str,
    parameters: &ConnectionParameters,
    protocol: &str,
) -> ResolvedAddress {
    if let Some(addr) = ResolvedAddress::parse_strict(connection_name) {
        return addr;
    }

    let by_key = CandidateKeys::for_protocol(protocol)
        .keys()
        .iter()
        .filter_map(|key| parameters.non_blank(key))
        .find_map(ResolvedAddress::parse_strict);
    if let Some(addr) = by_key {
        return addr;
    }

    parameters
        .iter()
        .find_map(|(_, value)| ResolvedAddress::parse_strict(value.trim()))
        .unwrap_or(ResolvedAddress::Unavailable)
}

/// 호스트로 쓸 수 있는 파라미터 존재 여부 (`hostname` 또는 `host`)
pub fn has_host_parameter(parameters: &ConnectionParameters) -> bool {
    parameters.non_blank("hostname").is_some() || parameters.non_blank("host").is_some()
}
