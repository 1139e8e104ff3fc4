//! 연결 실행 링크.
//!
//! 게이트웨이 웹 클라이언트의 연결 화면 URL을 만든다.
//! 클라이언트 식별자는 `식별자 NUL "c" NUL 데이터소스`의 base64 인코딩.

use base64::Engine;
use gatewatch_core::models::connection::Connection;
use gatewatch_core::models::status::ActionLink;
use gatewatch_core::ports::action::ActionResolver;

/// 실행 버튼 라벨
pub const CONNECT_LABEL: &str = "Connect";

/// 클라이언트 식별자 타입 (연결)
const CLIENT_TYPE_CONNECTION: &str = "c";

/// 웹 클라이언트 URL 기반 실행 링크 생성기
#[derive(Debug, Clone)]
pub struct ClientUrlResolver {
    base_url: String,
}

impl ClientUrlResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// 클라이언트 식별자 인코딩
    pub fn client_identifier(connection_id: &str, data_source: &str) -> String {
        let raw = format!("{connection_id}\0{CLIENT_TYPE_CONNECTION}\0{data_source}");
        base64::engine::general_purpose::STANDARD.encode(raw.as_bytes())
    }
}

impl ActionResolver for ClientUrlResolver {
    fn resolve(&self, data_source: &str, connection: &Connection) -> ActionLink {
        let id = connection.resolved_identifier().unwrap_or_default();
        ActionLink {
            href: format!(
                "{}/#/client/{}",
                self.base_url,
                Self::client_identifier(id, data_source)
            ),
            label: CONNECT_LABEL.to_string(),
        }
    }
}
