//! # gatewatch-network
//!
//! 원격 데스크톱 게이트웨이 REST 어댑터.
//! 토큰 인증, 연결 그룹 트리, 활성 세션, 연결별 파라미터/이력 조회를 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use gatewatch_network::auth::TokenManager;
//! use gatewatch_network::http_client::HttpGatewayClient;
//!
//! let auth = Arc::new(TokenManager::new(&config.gateway.base_url));
//! auth.login("admin", "secret").await?;
//! let client = HttpGatewayClient::new(&config.gateway.base_url, auth, config.request_timeout())?;
//! ```

pub mod auth;
pub mod http_client;
