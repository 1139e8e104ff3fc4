//! 게이트웨이 인증 토큰 관리.
//!
//! 로그인, 토큰 재검증, 로그아웃, 데이터 소스 목록을 담당하며
//! `AuthProvider` 포트를 구현한다.

use async_trait::async_trait;
use gatewatch_core::error::CoreError;
use gatewatch_core::ports::gateway::AuthProvider;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::http_client::build_url;

/// 서버 응답 (`POST /api/tokens`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    auth_token: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    data_source: Option<String>,
    #[serde(default)]
    available_data_sources: Vec<String>,
}

/// 내부 토큰 상태
#[derive(Debug, Clone)]
struct TokenState {
    auth_token: String,
    username: Option<String>,
    data_sources: Vec<String>,
}

impl From<TokenResponse> for TokenState {
    fn from(resp: TokenResponse) -> Self {
        // availableDataSources가 비어 있으면 주 데이터 소스 하나만 사용
        let data_sources = if resp.available_data_sources.is_empty() {
            resp.data_source.into_iter().collect()
        } else {
            resp.available_data_sources
        };
        Self {
            auth_token: resp.auth_token,
            username: resp.username,
            data_sources,
        }
    }
}

/// 토큰 매니저 (로그인/재검증/로그아웃)
#[derive(Clone)]
pub struct TokenManager {
    base_url: String,
    client: reqwest::Client,
    state: Arc<RwLock<Option<TokenState>>>,
}

impl TokenManager {
    /// 새 토큰 매니저 생성 (미인증 상태)
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            state: Arc::new(RwLock::new(None)),
        }
    }

    /// 외부에서 이미 발급받은 토큰으로 생성
    pub fn with_token(base_url: &str, auth_token: &str, data_sources: Vec<String>) -> Self {
        let manager = Self::new(base_url);
        let state = TokenState {
            auth_token: auth_token.to_string(),
            username: None,
            data_sources,
        };
        Self {
            state: Arc::new(RwLock::new(Some(state))),
            ..manager
        }
    }

    /// 사용자명/비밀번호 로그인 → 인증 토큰 획득
    pub async fn login(&self, username: &str, password: &str) -> Result<(), CoreError> {
        let url = build_url(&self.base_url, &["api", "tokens"])?;
        let resp = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| CoreError::Auth(format!("로그인 요청 실패: {e}")))?;

        let token_resp = Self::parse_token_response(resp, "로그인").await?;
        let state = TokenState::from(token_resp);
        debug!(
            "로그인 성공: user={:?}, 데이터 소스 {}개",
            state.username,
            state.data_sources.len()
        );

        *self.state.write().await = Some(state);
        Ok(())
    }

    /// 현재 토큰 재검증 (게이트웨이가 세션 만료를 연장)
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let current = self
            .state
            .read()
            .await
            .clone()
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))?;

        let url = build_url(&self.base_url, &["api", "tokens"])?;
        let resp = self
            .client
            .post(url)
            .form(&[("token", current.auth_token.as_str())])
            .send()
            .await
            .map_err(|e| CoreError::Auth(format!("토큰 재검증 요청 실패: {e}")))?;

        let token_resp = Self::parse_token_response(resp, "토큰 재검증").await?;
        let mut refreshed = TokenState::from(token_resp);
        if refreshed.username.is_none() {
            refreshed.username = current.username;
        }

        *self.state.write().await = Some(refreshed);
        debug!("토큰 재검증 성공");
        Ok(())
    }

    /// 로그아웃 (`DELETE /api/tokens/{token}`)
    ///
    /// 미인증 상태면 no-op.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let token = self.state.read().await.as_ref().map(|s| s.auth_token.clone());

        if let Some(token) = token {
            let url = build_url(&self.base_url, &["api", "tokens", &token])?;
            if let Err(e) = self.client.delete(url).send().await {
                warn!("로그아웃 요청 실패 (로컬 토큰은 폐기): {e}");
            }
        }

        *self.state.write().await = None;
        debug!("로그아웃 완료");
        Ok(())
    }

    /// 현재 인증 상태
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    /// 로그인한 사용자명
    pub async fn username(&self) -> Option<String> {
        self.state.read().await.as_ref().and_then(|s| s.username.clone())
    }

    async fn parse_token_response(
        resp: reqwest::Response,
        action: &str,
    ) -> Result<TokenResponse, CoreError> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Auth(format!("{action} 실패 ({status}): {text}")));
        }

        resp.json()
            .await
            .map_err(|e| CoreError::Auth(format!("{action} 응답 파싱 실패: {e}")))
    }
}

#[async_trait]
impl AuthProvider for TokenManager {
    async fn current_token(&self) -> Result<String, CoreError> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.auth_token.clone())
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))
    }

    async fn available_data_sources(&self) -> Result<Vec<String>, CoreError> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.data_sources.clone())
            .ok_or_else(|| CoreError::Auth("인증되지 않음".to_string()))
    }
}
