//! 실행 링크 포트.
//!
//! 구현: `gatewatch-engine::action::ClientUrlResolver`

use crate::models::connection::Connection;
use crate::models::status::ActionLink;

/// 연결 실행 링크 생성기
///
/// 반환된 링크는 검증/정제가 끝난 것으로 보고 레코드에 그대로 싣는다.
pub trait ActionResolver: Send + Sync {
    /// 데이터 소스 + 연결에 대한 실행 링크
    fn resolve(&self, data_source: &str, connection: &Connection) -> ActionLink;
}
