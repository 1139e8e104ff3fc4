//! 자동 갱신 스케줄러.
//!
//! 시작 즉시 한 번, 이후 고정 주기(fixed-period)로 집계 주기를 띄운다.
//! 각 tick은 별도 task로 실행되므로 느린 주기가 다음 tick을 늦추지 않는다.
//! 진행 중인 주기가 있으면 해당 tick은 오케스트레이터에서 버려진다.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::aggregator::{Aggregator, CycleMode, CycleOutcome};

/// 주기가 0이면 사용할 최소 주기
const MIN_PERIOD: Duration = Duration::from_millis(100);

/// 자동 갱신 스케줄러 핸들
///
/// 핸들을 drop 하면 종료 채널이 닫혀 루프도 끝난다.
pub struct RefreshScheduler {
    period: Duration,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshScheduler {
    /// 스케줄러 시작 (tokio 런타임 안에서 호출)
    pub fn spawn(aggregator: Arc<Aggregator>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!("자동 갱신 시작: 주기={}ms", period.as_millis());
            let mut interval = tokio::time::interval(period);

            loop {
                // 중단 요청이 준비된 tick보다 우선
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        info!("자동 갱신 루프 종료");
                        break;
                    }
                    _ = interval.tick() => {
                        let agg = aggregator.clone();
                        tokio::spawn(async move {
                            if let CycleOutcome::Skipped = agg.run_cycle(CycleMode::Scheduled).await {
                                debug!("자동 갱신 tick 건너뜀");
                            }
                        });
                    }
                }
            }
        });

        Self {
            period,
            shutdown_tx,
            handle,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 이후 tick 중단 (진행 중인 주기는 끝까지 실행)
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// 루프 task 종료 여부
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 중단 후 루프 task 종료까지 대기
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.handle.await {
            debug!("자동 갱신 루프 join 실패: {e}");
        }
    }
}
