//! # gatewatch-engine
//!
//! 원격 데스크톱 게이트웨이 연결 상태 집계 엔진.
//! 연결 그룹 트리, 활성 세션, 연결별 파라미터/이력을 합쳐
//! 연결마다 하나의 상태 레코드를 만들고, 주소순 스냅샷으로 발행한다.
//!
//! ## 구조
//!
//! - [`tree`] — 연결 그룹 트리 평탄화
//! - [`address`] — 연결 주소 추출
//! - [`status`] — 세션 활동 / 머신 상태 판정
//! - [`time_format`] — 마지막 접속 시각 표시
//! - [`fetcher`] — 연결별 상세 조회 (실패 시 빈 결과)
//! - [`aggregator`] — 갱신 주기 오케스트레이션 + 스냅샷 발행
//! - [`scheduler`] — 고정 주기 자동 갱신
//! - [`service`] — UI 레이어 진입점
//! - [`activity_log`] — 진단 메시지 링 버퍼
//! - [`action`] — 웹 클라이언트 실행 링크
//! - [`telemetry`] — tracing 초기화
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! let ports = GatewayPorts { auth, trees, sessions, details, actions };
//! let service = ConnectionStatusService::new(&config, ports);
//! service.start();
//! let mut rx = service.subscribe();
//! while rx.changed().await.is_ok() {
//!     render(&rx.borrow());
//! }
//! ```

pub mod action;
pub mod activity_log;
pub mod address;
pub mod aggregator;
pub mod fetcher;
pub mod scheduler;
pub mod service;
pub mod status;
pub mod telemetry;
pub mod time_format;
pub mod tree;

pub use aggregator::{Aggregator, AggregatorSettings, CycleMode, CycleOutcome, GatewayPorts};
pub use service::ConnectionStatusService;
