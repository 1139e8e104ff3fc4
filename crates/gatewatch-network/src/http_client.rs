//! 게이트웨이 REST 클라이언트.
//!
//! 연결 그룹 트리, 활성 세션, 연결별 파라미터/이력을 조회한다.
//! 모든 요청은 단일 시도이며 재시도하지 않는다.

use async_trait::async_trait;
use futures::future::join_all;
use gatewatch_core::error::CoreError;
use gatewatch_core::models::connection::{ConnectionGroupNode, ConnectionParameters};
use gatewatch_core::models::history::HistoryEntry;
use gatewatch_core::models::session::{ActiveSession, ActiveSessionIndex};
use gatewatch_core::ports::gateway::{
    ActiveSessionProvider, AuthProvider, ConnectionDetailSource, ConnectionTreeProvider,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// base URL 뒤에 경로 세그먼트를 붙인 URL 생성
///
/// 각 세그먼트는 퍼센트 인코딩된다 (`/` 포함).
pub(crate) fn build_url(base_url: &str, segments: &[&str]) -> Result<Url, CoreError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| CoreError::Config(format!("잘못된 게이트웨이 URL '{base_url}': {e}")))?;
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            CoreError::Config(format!("경로를 붙일 수 없는 URL: {base_url}"))
        })?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

/// 데이터 소스별 결과 병합
///
/// 실패한 데이터 소스는 빠지고, 전부 실패한 경우에만 마지막 에러를 반환한다.
fn merge_per_source<T>(
    what: &str,
    results: Vec<(String, Result<T, CoreError>)>,
) -> Result<Vec<(String, T)>, CoreError> {
    let mut merged = Vec::with_capacity(results.len());
    let mut last_err = None;

    for (data_source, result) in results {
        match result {
            Ok(value) => merged.push((data_source, value)),
            Err(e) => {
                warn!(data_source = %data_source, "{what} 조회 실패: {e}");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if merged.is_empty() => Err(e),
        _ => Ok(merged),
    }
}

/// HTTP 게이트웨이 클라이언트
pub struct HttpGatewayClient {
    client: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpGatewayClient {
    /// 새 클라이언트 생성
    pub fn new(
        base_url: &str,
        auth: Arc<dyn AuthProvider>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// `{base}/api/session/data/{ds}/...?token=` 형태의 URL
    async fn data_url(&self, data_source: &str, segments: &[&str]) -> Result<Url, CoreError> {
        let token = self.auth.current_token().await?;

        let mut full = vec!["api", "session", "data", data_source];
        full.extend_from_slice(segments);

        let mut url = build_url(&self.base_url, &full)?;
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }

    /// GET 요청 후 JSON 본문 디코딩
    async fn get_json<T: DeserializeOwned>(
        &self,
        data_source: &str,
        segments: &[&str],
    ) -> Result<T, CoreError> {
        let url = self.data_url(data_source, segments).await?;
        debug!(data_source, path = url.path(), "GET");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("요청 실패: {e}")))?;
        let resp = self.check_response(resp).await?;

        let body = resp
            .text()
            .await
            .map_err(|e| CoreError::Network(format!("응답 본문 읽기 실패: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// HTTP 응답 상태 확인 + 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status.as_u16() {
            401 | 403 => Err(CoreError::Auth(format!("인증 실패 ({status}): {text}"))),
            404 => Err(CoreError::NotFound {
                resource_type: "API".to_string(),
                id: text,
            }),
            503 => Err(CoreError::ServiceUnavailable(text)),
            _ => Err(CoreError::Internal(format!("API 에러 ({status}): {text}"))),
        }
    }
}

#[async_trait]
impl ConnectionTreeProvider for HttpGatewayClient {
    async fn connection_group_trees(
        &self,
        data_sources: &[String],
        root_identifier: &str,
    ) -> Result<HashMap<String, ConnectionGroupNode>, CoreError> {
        let results = join_all(data_sources.iter().map(|ds| async move {
            let tree = self
                .get_json::<ConnectionGroupNode>(ds, &["connectionGroups", root_identifier, "tree"])
                .await;
            (ds.clone(), tree)
        }))
        .await;

        let trees: HashMap<_, _> = merge_per_source("연결 그룹 트리", results)?
            .into_iter()
            .collect();
        debug!("연결 그룹 트리 {}개 수신", trees.len());
        Ok(trees)
    }
}

#[async_trait]
impl ActiveSessionProvider for HttpGatewayClient {
    async fn active_sessions(
        &self,
        data_sources: &[String],
    ) -> Result<ActiveSessionIndex, CoreError> {
        let results = join_all(data_sources.iter().map(|ds| async move {
            let sessions = self
                .get_json::<serde_json::Value>(ds, &["activeConnections"])
                .await
                .map(ActiveSession::parse_map);
            (ds.clone(), sessions)
        }))
        .await;

        let mut index = ActiveSessionIndex::new();
        for (data_source, sessions) in merge_per_source("활성 세션", results)? {
            index.insert_data_source(data_source.clone(), HashMap::new());
            for session in sessions {
                index.push(&data_source, session);
            }
        }

        debug!("활성 세션 {}개 수신", index.total_sessions());
        Ok(index)
    }
}

#[async_trait]
impl ConnectionDetailSource for HttpGatewayClient {
    async fn connection_parameters(
        &self,
        data_source: &str,
        connection_id: &str,
    ) -> Result<ConnectionParameters, CoreError> {
        self.get_json(data_source, &["connections", connection_id, "parameters"])
            .await
    }

    async fn connection_history(
        &self,
        data_source: &str,
        connection_id: &str,
    ) -> Result<Vec<HistoryEntry>, CoreError> {
        let raw: serde_json::Value = self
            .get_json(data_source, &["connections", connection_id, "history"])
            .await?;
        Ok(HistoryEntry::parse_list(raw))
    }
}
