//! 집계 오케스트레이터.
//!
//! 한 갱신 주기의 흐름:
//! 트리 + 활성 세션 동시 조회 (세션 실패 시 빈 세션) → 연결별 상세 동시 조회 → 판정 → 주소순 정렬 → 스냅샷 발행.
//!
//! 주기는 동시에 하나만 실행된다. 스케줄러 tick은 진행 중인 주기가 있으면 버려지고,
//! 수동 갱신은 앞선 주기가 끝날 때까지 기다린다.
//! 스냅샷은 `watch` 채널에 `Arc` 하나를 교체하는 방식으로만 발행한다.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use gatewatch_core::config::{AppConfig, FailurePolicy};
use gatewatch_core::error::CoreError;
use gatewatch_core::models::connection::Connection;
use gatewatch_core::models::session::ActiveSessionIndex;
use gatewatch_core::models::snapshot::Snapshot;
use gatewatch_core::models::status::ConnectionStatusRecord;
use gatewatch_core::ports::action::ActionResolver;
use gatewatch_core::ports::gateway::{
    ActiveSessionProvider, AuthProvider, ConnectionDetailSource, ConnectionTreeProvider,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::activity_log::ActivityLog;
use crate::address::resolve_address;
use crate::fetcher::{ConnectionDetail, DetailFetcher};
use crate::status::{classify_machine_status, classify_session_activity, connected_hosts};
use crate::time_format::{format_last_connection, DisplayZone};
use crate::tree::flatten_trees;

/// 현재 시각 공급자
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// 엔진이 사용하는 외부 포트 묶음
#[derive(Clone)]
pub struct GatewayPorts {
    pub auth: Arc<dyn AuthProvider>,
    pub trees: Arc<dyn ConnectionTreeProvider>,
    pub sessions: Arc<dyn ActiveSessionProvider>,
    pub details: Arc<dyn ConnectionDetailSource>,
    pub actions: Arc<dyn ActionResolver>,
}

/// 집계 설정
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    /// 연결 그룹 트리 루트 식별자
    pub root_group_identifier: String,
    /// 트리 조회 실패 시 정책
    pub failure_policy: FailurePolicy,
    /// 절대 시각 표시 시간대
    pub zone: DisplayZone,
}

impl AggregatorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            root_group_identifier: config.gateway.root_group_identifier.clone(),
            failure_policy: config.refresh.failure_policy,
            zone: DisplayZone::from_config(&config.display),
        }
    }
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default_config())
    }
}

/// 주기 실행 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleMode {
    /// 사용자 요청. 로딩 표시를 켜고, 진행 중인 주기 뒤에 대기
    Manual,
    /// 스케줄러 tick. 조용히 실행하고, 진행 중인 주기가 있으면 건너뜀
    Scheduled,
}

impl CycleMode {
    fn is_silent(self) -> bool {
        matches!(self, Self::Scheduled)
    }
}

/// 주기 실행 결과
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// 새 스냅샷 발행
    Published(Arc<Snapshot>),
    /// 다른 주기가 진행 중이라 건너뜀
    Skipped,
}

impl CycleOutcome {
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Published(s) => Some(s),
            Self::Skipped => None,
        }
    }
}

/// 로딩 표시 해제 가드 (주기 future가 중간에 drop 되어도 해제)
struct LoadingGuard<'a>(&'a watch::Sender<bool>);

impl<'a> LoadingGuard<'a> {
    fn engage(tx: &'a watch::Sender<bool>) -> Self {
        tx.send_replace(true);
        Self(tx)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// 집계 오케스트레이터
pub struct Aggregator {
    ports: GatewayPorts,
    fetcher: DetailFetcher,
    settings: AggregatorSettings,
    activity_log: Arc<ActivityLog>,
    clock: Clock,
    /// 단일 실행 가드
    cycle_guard: Mutex<()>,
    /// 발행된 스냅샷 수
    cycle_counter: AtomicU64,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    loading_tx: watch::Sender<bool>,
    loading_rx: watch::Receiver<bool>,
}

impl Aggregator {
    /// 새 오케스트레이터 생성
    pub fn new(
        ports: GatewayPorts,
        settings: AggregatorSettings,
        activity_log: Arc<ActivityLog>,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::initial()));
        let (loading_tx, loading_rx) = watch::channel(false);
        Self {
            fetcher: DetailFetcher::new(ports.details.clone()),
            ports,
            settings,
            activity_log,
            clock: Arc::new(Utc::now),
            cycle_guard: Mutex::new(()),
            cycle_counter: AtomicU64::new(0),
            snapshot_tx,
            snapshot_rx,
            loading_tx,
            loading_rx,
        }
    }

    /// 시각 공급자 교체
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// 스냅샷 수신기 복제
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }

    /// 수동 주기 진행 중 여부
    pub fn is_loading(&self) -> bool {
        *self.loading_rx.borrow()
    }

    /// 로딩 상태 수신기 복제
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        &self.activity_log
    }

    /// 갱신 주기 한 번 실행
    pub async fn run_cycle(&self, mode: CycleMode) -> CycleOutcome {
        let _guard = match mode {
            CycleMode::Manual => self.cycle_guard.lock().await,
            CycleMode::Scheduled => match self.cycle_guard.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    debug!("이전 주기 진행 중, tick 건너뜀");
                    return CycleOutcome::Skipped;
                }
            },
        };

        let silent = mode.is_silent();
        let _loading = (!silent).then(|| LoadingGuard::engage(&self.loading_tx));
        if !silent {
            self.activity_log.info("Starting connection status load...");
        }

        let snapshot = match self.collect_records(silent).await {
            Ok(records) => Snapshot {
                cycle: self.next_cycle(),
                generated_at: (self.clock)(),
                stale: false,
                records,
            },
            Err(e) => self.failed_snapshot(&e),
        };

        let snapshot = Arc::new(snapshot);
        self.snapshot_tx.send_replace(snapshot.clone());
        debug!(
            cycle = snapshot.cycle,
            records = snapshot.len(),
            stale = snapshot.stale,
            "스냅샷 발행"
        );

        CycleOutcome::Published(snapshot)
    }

    fn next_cycle(&self) -> u64 {
        self.cycle_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 트리 조회 실패 시 정책에 따른 스냅샷
    fn failed_snapshot(&self, error: &CoreError) -> Snapshot {
        warn!("스냅샷 빌드 실패: {error}");
        self.activity_log
            .error(format!("Error loading connections: {error}"));

        match self.settings.failure_policy {
            FailurePolicy::ClearSnapshot => Snapshot {
                cycle: self.next_cycle(),
                generated_at: (self.clock)(),
                stale: false,
                records: Vec::new(),
            },
            FailurePolicy::KeepPrevious => {
                let previous = self.snapshot();
                Snapshot {
                    cycle: self.next_cycle(),
                    generated_at: previous.generated_at,
                    stale: true,
                    records: previous.records.clone(),
                }
            }
        }
    }

    /// 전체 레코드 수집 + 정렬
    async fn collect_records(&self, silent: bool) -> Result<Vec<ConnectionStatusRecord>, CoreError> {
        let data_sources = self.ports.auth.available_data_sources().await?;
        let root = self.settings.root_group_identifier.as_str();

        let (trees, sessions) = tokio::join!(
            self.ports.trees.connection_group_trees(&data_sources, root),
            self.ports.sessions.active_sessions(&data_sources),
        );
        let trees = trees?;
        let sessions = sessions.unwrap_or_else(|e| {
            warn!("활성 세션 조회 실패, 빈 세션으로 대체: {e}");
            self.activity_log
                .warning(format!("Active sessions unavailable: {e}"));
            ActiveSessionIndex::new()
        });

        let connections = flatten_trees(&trees);
        let valid: Vec<(&Connection, &str)> = connections
            .iter()
            .filter_map(|c| c.resolved_identifier().map(|id| (c, id)))
            .collect();

        let skipped = connections.len() - valid.len();
        if skipped > 0 {
            warn!("식별자 없는 연결 {skipped}개 제외");
            self.activity_log
                .warning(format!("Skipped {skipped} connection(s) without identifier"));
        }

        let details = join_all(
            valid
                .iter()
                .map(|(conn, id)| self.fetcher.fetch(&conn.data_source, id)),
        )
        .await;

        let degraded = details.iter().filter(|d| d.degraded).count();
        if degraded > 0 {
            self.activity_log.warning(format!(
                "Details unavailable for {degraded} connection(s), using empty results"
            ));
        }

        let now = (self.clock)();
        let mut records: Vec<ConnectionStatusRecord> = valid
            .iter()
            .zip(details)
            .map(|((conn, id), detail)| self.assemble(conn, id, detail, &sessions, now))
            .collect();

        // 안정 정렬: 같은 주소는 평탄화 순서 유지
        records.sort_by(|a, b| a.ip_address.cmp(&b.ip_address));

        info!(
            data_sources = data_sources.len(),
            connections = records.len(),
            active_sessions = sessions.total_sessions(),
            "연결 상태 집계 완료"
        );
        if !silent {
            self.activity_log.success(format!(
                "Loaded {} connection(s), {} active session(s)",
                records.len(),
                sessions.total_sessions()
            ));
        }

        Ok(records)
    }

    /// 연결 하나의 상태 레코드 조립
    fn assemble(
        &self,
        conn: &Connection,
        identifier: &str,
        detail: ConnectionDetail,
        sessions: &ActiveSessionIndex,
        now: DateTime<Utc>,
    ) -> ConnectionStatusRecord {
        let name = conn.display_name();
        let protocol = conn.protocol_tag();

        // 트리에 파라미터가 실려 온 경우 상세 조회 실패 시 대체값으로 사용
        let parameters = if detail.parameters.is_empty() {
            &conn.parameters
        } else {
            &detail.parameters
        };

        let ip_address = resolve_address(name, parameters, protocol);
        let live = sessions.sessions_for(&conn.data_source, identifier);

        ConnectionStatusRecord {
            identifier: identifier.to_string(),
            data_source: conn.data_source.clone(),
            connection_name: name.to_string(),
            machine_status: classify_machine_status(
                &ip_address,
                live.len(),
                &detail.history,
                parameters,
                now,
            ),
            session_status: classify_session_activity(&live, &detail.history, now),
            connected_ips: connected_hosts(&live),
            protocol: protocol.to_string(),
            last_connection: format_last_connection(
                &detail.history,
                conn.last_active,
                now,
                &self.settings.zone,
            ),
            action: self.ports.actions.resolve(&conn.data_source, conn),
            ip_address,
        }
    }
}
