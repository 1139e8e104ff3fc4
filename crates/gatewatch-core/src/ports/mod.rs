//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! `gatewatch-network`가 게이트웨이 포트를, `gatewatch-engine`이 실행 링크 포트를 구현하며
//! 엔진은 `Arc<dyn T>`로 와이어링한다.
//!
//! 모든 async trait은 `async_trait` 매크로를 사용하여 object safety를 보장한다.

pub mod action;
pub mod gateway;
