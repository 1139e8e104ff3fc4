//! 연결 상태 서비스.
//!
//! UI 레이어가 사용하는 진입점. 스냅샷 조회/구독, 로딩 상태, 수동 갱신,
//! 자동 갱신 시작/중단, 활동 로그를 제공한다.

use gatewatch_core::config::AppConfig;
use gatewatch_core::models::snapshot::Snapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::activity_log::ActivityLog;
use crate::aggregator::{Aggregator, AggregatorSettings, CycleMode, GatewayPorts};
use crate::scheduler::RefreshScheduler;
use crate::time_format::DisplayZone;

/// 연결 상태 서비스
pub struct ConnectionStatusService {
    aggregator: Arc<Aggregator>,
    interval: Duration,
    auto_start: bool,
    scheduler: parking_lot::Mutex<Option<RefreshScheduler>>,
}

impl ConnectionStatusService {
    /// 설정 + 포트로 서비스 생성 (자동 갱신은 [`Self::start`]에서 시작)
    pub fn new(config: &AppConfig, ports: GatewayPorts) -> Self {
        let zone = DisplayZone::from_config(&config.display);
        let activity_log = Arc::new(ActivityLog::new(config.activity_log.capacity, zone));
        let aggregator = Aggregator::new(
            ports,
            AggregatorSettings::from_config(config),
            activity_log,
        );
        Self::with_aggregator(aggregator, config.refresh_interval(), config.refresh.auto_start)
    }

    /// 미리 구성한 오케스트레이터로 생성
    pub fn with_aggregator(aggregator: Aggregator, interval: Duration, auto_start: bool) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            interval,
            auto_start,
            scheduler: parking_lot::Mutex::new(None),
        }
    }

    /// 설정에 따라 자동 갱신 시작 (tokio 런타임 안에서 호출)
    pub fn start(&self) {
        if self.auto_start {
            self.start_auto_refresh();
        } else {
            info!("자동 갱신 비활성화 (auto_start=false)");
        }
    }

    /// 현재 스냅샷
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.aggregator.snapshot()
    }

    /// 스냅샷 변경 구독
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.aggregator.subscribe()
    }

    /// 수동 갱신 진행 중 여부
    pub fn is_loading(&self) -> bool {
        self.aggregator.is_loading()
    }

    /// 로딩 상태 변경 구독
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.aggregator.subscribe_loading()
    }

    /// 수동 갱신 (진행 중인 주기가 있으면 끝난 뒤 실행)
    pub async fn refresh(&self) -> Arc<Snapshot> {
        match self.aggregator.run_cycle(CycleMode::Manual).await.snapshot() {
            Some(snapshot) => snapshot.clone(),
            None => self.aggregator.snapshot(),
        }
    }

    /// 자동 갱신 시작 (이미 실행 중이면 재시작)
    pub fn start_auto_refresh(&self) {
        let mut slot = self.scheduler.lock();
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        *slot = Some(RefreshScheduler::spawn(
            self.aggregator.clone(),
            self.interval,
        ));

        self.aggregator.activity_log().success(format!(
            "Auto-refresh started (every {} seconds)",
            self.interval.as_secs_f64()
        ));
    }

    /// 자동 갱신 중단 (진행 중인 주기는 끝까지 실행)
    pub fn stop_auto_refresh(&self) {
        if let Some(scheduler) = self.scheduler.lock().take() {
            scheduler.stop();
            self.aggregator.activity_log().info("Auto-refresh stopped");
        }
    }

    /// 자동 갱신 실행 중 여부
    pub fn is_auto_refreshing(&self) -> bool {
        self.scheduler
            .lock()
            .as_ref()
            .is_some_and(|s| !s.is_finished())
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        self.aggregator.activity_log()
    }
}
