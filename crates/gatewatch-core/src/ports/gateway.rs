//! 게이트웨이 포트.
//!
//! 구현: `gatewatch-network` crate (reqwest)

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::models::connection::{ConnectionGroupNode, ConnectionParameters};
use crate::models::history::HistoryEntry;
use crate::models::session::ActiveSessionIndex;

/// 인증 세션 제공자
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 현재 인증 토큰
    async fn current_token(&self) -> Result<String, CoreError>;

    /// 접근 가능한 데이터 소스 목록
    async fn available_data_sources(&self) -> Result<Vec<String>, CoreError>;
}

/// 연결 그룹 트리 제공자
#[async_trait]
pub trait ConnectionTreeProvider: Send + Sync {
    /// 데이터 소스별 연결 그룹 트리 조회
    ///
    /// 트리를 얻지 못한 데이터 소스는 결과 맵에서 빠진다.
    async fn connection_group_trees(
        &self,
        data_sources: &[String],
        root_identifier: &str,
    ) -> Result<HashMap<String, ConnectionGroupNode>, CoreError>;
}

/// 활성 세션 제공자
#[async_trait]
pub trait ActiveSessionProvider: Send + Sync {
    /// 데이터 소스별 활성 세션 조회
    async fn active_sessions(&self, data_sources: &[String])
        -> Result<ActiveSessionIndex, CoreError>;
}

/// 연결별 상세 정보 (파라미터, 이력)
#[async_trait]
pub trait ConnectionDetailSource: Send + Sync {
    /// 선언 파라미터 조회
    async fn connection_parameters(
        &self,
        data_source: &str,
        connection_id: &str,
    ) -> Result<ConnectionParameters, CoreError>;

    /// 접속 이력 조회 (순서 무관)
    async fn connection_history(
        &self,
        data_source: &str,
        connection_id: &str,
    ) -> Result<Vec<HistoryEntry>, CoreError>;
}
