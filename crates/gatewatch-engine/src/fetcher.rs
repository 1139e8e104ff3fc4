//! 연결별 상세 조회.
//!
//! 파라미터와 이력을 동시에 조회하고, 실패하면 빈 결과로 대체한다.
//! 한 연결의 실패가 다른 연결의 집계를 멈추지 않는다.

use gatewatch_core::error::CoreError;
use gatewatch_core::models::connection::ConnectionParameters;
use gatewatch_core::models::history::HistoryEntry;
use gatewatch_core::ports::gateway::ConnectionDetailSource;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 연결 하나의 상세 정보
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDetail {
    /// 선언 파라미터 (실패 시 빈 맵)
    pub parameters: ConnectionParameters,
    /// 접속 이력 (실패 시 빈 목록)
    pub history: Vec<HistoryEntry>,
    /// 하나 이상의 조회가 실패해 빈 결과로 대체됨
    pub degraded: bool,
}

/// 상세 조회기 (단일 시도, 재시도 없음)
#[derive(Clone)]
pub struct DetailFetcher {
    source: Arc<dyn ConnectionDetailSource>,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn ConnectionDetailSource>) -> Self {
        Self { source }
    }

    /// 파라미터 + 이력 동시 조회
    pub async fn fetch(&self, data_source: &str, connection_id: &str) -> ConnectionDetail {
        let (parameters, history) = tokio::join!(
            self.source.connection_parameters(data_source, connection_id),
            self.source.connection_history(data_source, connection_id),
        );

        let mut degraded = false;

        let parameters = parameters.unwrap_or_else(|e| {
            log_failure("파라미터", data_source, connection_id, &e);
            degraded = true;
            ConnectionParameters::new()
        });

        let history = history.unwrap_or_else(|e| {
            log_failure("이력", data_source, connection_id, &e);
            degraded = true;
            Vec::new()
        });

        debug!(
            data_source,
            connection_id,
            parameters = parameters.len(),
            history = history.len(),
            "상세 조회 완료"
        );

        ConnectionDetail {
            parameters,
            history,
            degraded,
        }
    }
}

/// 일시적 실패는 warn, 그 외(인증, 디코딩 등)는 error
fn log_failure(what: &str, data_source: &str, connection_id: &str, e: &CoreError) {
    if e.is_transient() {
        warn!(data_source, connection_id, "{what} 조회 실패: {e}");
    } else {
        error!(data_source, connection_id, "{what} 조회 실패: {e}");
    }
}
