//! Gatewatch 도메인 모델.
//!
//! 게이트웨이 REST 응답을 명시적 타입으로 고정하고,
//! 엔진이 발행하는 연결 상태 레코드/스냅샷을 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod connection;
pub mod history;
pub mod session;
pub mod snapshot;
pub mod status;
