//! 집계 흐름 통합 테스트.
//!
//! 인메모리 게이트웨이로 트리 → 상세 조회 → 판정 → 정렬 → 발행 전체를 검증한다.

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gatewatch_core::config::{AppConfig, FailurePolicy};
use gatewatch_core::error::CoreError;
use gatewatch_core::models::connection::{Connection, ConnectionGroupNode, ConnectionParameters};
use gatewatch_core::models::history::HistoryEntry;
use gatewatch_core::models::session::{ActiveSession, ActiveSessionIndex};
use gatewatch_core::models::snapshot::Snapshot;
use gatewatch_core::models::status::{MachineStatus, ResolvedAddress, SessionActivity};
use gatewatch_core::ports::gateway::{
    ActiveSessionProvider, AuthProvider, ConnectionDetailSource, ConnectionTreeProvider,
};
use gatewatch_engine::action::ClientUrlResolver;
use gatewatch_engine::activity_log::ActivityLog;
use gatewatch_engine::time_format::DisplayZone;
use gatewatch_engine::{
    Aggregator, AggregatorSettings, ConnectionStatusService, CycleMode, CycleOutcome, GatewayPorts,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const MINUTE: i64 = 60 * 1000;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const PG: &str = "postgresql";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

fn ago(ms: i64) -> HistoryEntry {
    HistoryEntry::new(now().timestamp_millis() - ms)
}

fn conn(id: Option<&str>, name: &str, protocol: &str) -> Connection {
    Connection {
        identifier: id.map(str::to_string),
        name: Some(name.to_string()),
        protocol: Some(protocol.to_string()),
        ..Default::default()
    }
}

fn root(connections: Vec<Connection>, groups: Vec<ConnectionGroupNode>) -> ConnectionGroupNode {
    ConnectionGroupNode {
        name: Some("ROOT".into()),
        identifier: Some("ROOT".into()),
        child_connections: Some(connections),
        child_connection_groups: Some(groups),
        ..Default::default()
    }
}

fn session(conn_id: &str, host: &str) -> ActiveSession {
    ActiveSession {
        identifier: Some(format!("s-{conn_id}-{host}")),
        connection_identifier: Some(conn_id.to_string()),
        remote_host: Some(host.to_string()),
        ..Default::default()
    }
}

fn params(pairs: &[(&str, &str)]) -> ConnectionParameters {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

// ============================================================
// 인메모리 게이트웨이
// ============================================================

#[derive(Default)]
struct MockGateway {
    trees: HashMap<String, ConnectionGroupNode>,
    sessions: ActiveSessionIndex,
    parameters: HashMap<String, ConnectionParameters>,
    history: HashMap<String, Vec<HistoryEntry>>,
    failing_details: HashSet<String>,
    fail_tree: AtomicBool,
    fail_sessions: AtomicBool,
    delay: Duration,
    tree_calls: AtomicUsize,
}

impl MockGateway {
    fn with_tree(tree: ConnectionGroupNode) -> Self {
        let mut trees = HashMap::new();
        trees.insert(PG.to_string(), tree);
        Self {
            trees,
            ..Default::default()
        }
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl AuthProvider for MockGateway {
    async fn current_token(&self) -> Result<String, CoreError> {
        Ok("tok".into())
    }

    async fn available_data_sources(&self) -> Result<Vec<String>, CoreError> {
        let mut sources: Vec<String> = self.trees.keys().cloned().collect();
        sources.sort();
        Ok(sources)
    }
}

#[async_trait]
impl ConnectionTreeProvider for MockGateway {
    async fn connection_group_trees(
        &self,
        data_sources: &[String],
        _root_identifier: &str,
    ) -> Result<HashMap<String, ConnectionGroupNode>, CoreError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.fail_tree.load(Ordering::SeqCst) {
            return Err(CoreError::ServiceUnavailable("gateway down".into()));
        }
        Ok(data_sources
            .iter()
            .filter_map(|ds| self.trees.get(ds).map(|t| (ds.clone(), t.clone())))
            .collect())
    }
}

#[async_trait]
impl ActiveSessionProvider for MockGateway {
    async fn active_sessions(
        &self,
        _data_sources: &[String],
    ) -> Result<ActiveSessionIndex, CoreError> {
        if self.fail_sessions.load(Ordering::SeqCst) {
            return Err(CoreError::Auth("token expired".into()));
        }
        Ok(self.sessions.clone())
    }
}

#[async_trait]
impl ConnectionDetailSource for MockGateway {
    async fn connection_parameters(
        &self,
        _data_source: &str,
        connection_id: &str,
    ) -> Result<ConnectionParameters, CoreError> {
        if self.failing_details.contains(connection_id) {
            return Err(CoreError::Auth("403".into()));
        }
        Ok(self.parameters.get(connection_id).cloned().unwrap_or_default())
    }

    async fn connection_history(
        &self,
        _data_source: &str,
        connection_id: &str,
    ) -> Result<Vec<HistoryEntry>, CoreError> {
        if self.failing_details.contains(connection_id) {
            return Err(CoreError::Network("reset".into()));
        }
        Ok(self.history.get(connection_id).cloned().unwrap_or_default())
    }
}

fn ports(gw: &Arc<MockGateway>) -> GatewayPorts {
    GatewayPorts {
        auth: gw.clone(),
        trees: gw.clone(),
        sessions: gw.clone(),
        details: gw.clone(),
        actions: Arc::new(ClientUrlResolver::new("http://gw/guacamole")),
    }
}

fn aggregator_with(gw: &Arc<MockGateway>, policy: FailurePolicy) -> Aggregator {
    let settings = AggregatorSettings {
        failure_policy: policy,
        zone: DisplayZone::Fixed(chrono::FixedOffset::east_opt(0).unwrap()),
        ..Default::default()
    };
    Aggregator::new(
        ports(gw),
        settings,
        Arc::new(ActivityLog::new(100, DisplayZone::Local)),
    )
    .with_clock(Arc::new(now))
}

fn aggregator(gw: &Arc<MockGateway>) -> Aggregator {
    aggregator_with(gw, FailurePolicy::ClearSnapshot)
}

async fn run(agg: &Aggregator) -> Arc<Snapshot> {
    match agg.run_cycle(CycleMode::Manual).await {
        CycleOutcome::Published(snapshot) => snapshot,
        CycleOutcome::Skipped => panic!("수동 주기는 건너뛰지 않음"),
    }
}

fn addresses(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .records
        .iter()
        .map(|r| r.ip_address.to_string())
        .collect()
}

// ============================================================
// 레코드 구성
// ============================================================

#[tokio::test]
async fn connections_without_identifier_are_excluded() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![
            conn(Some("1"), "10.0.0.1", "rdp"),
            conn(None, "10.0.0.2", "rdp"),
            Connection {
                id: Some("3".into()),
                name: Some("10.0.0.3".into()),
                ..Default::default()
            },
            Connection {
                identifier: Some(String::new()),
                name: Some("10.0.0.4".into()),
                ..Default::default()
            },
        ],
        vec![],
    )));
    let agg = aggregator(&gw);

    let snapshot = run(&agg).await;
    let ids: Vec<_> = snapshot.records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert!(agg
        .activity_log()
        .entries()
        .iter()
        .any(|e| e.message.contains("Skipped 2 connection")));
}

#[tokio::test]
async fn nested_groups_are_flattened() {
    let inner = ConnectionGroupNode {
        identifier: Some("lab".into()),
        child_connections: Some(vec![conn(Some("2"), "10.0.0.2", "ssh")]),
        child_connection_groups: None,
        ..Default::default()
    };
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![conn(Some("1"), "10.0.0.1", "rdp")],
        vec![inner],
    )));

    let snapshot = run(&aggregator(&gw)).await;
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.records.iter().all(|r| r.data_source == PG));
}

#[tokio::test]
async fn address_resolution_precedence() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("a"), "10.0.0.5", "rdp"),
            conn(Some("b"), "web1", "rdp"),
            conn(Some("c"), "web2", "custom"),
            conn(Some("d"), "web3", "rdp"),
        ],
        vec![],
    ));
    gw.parameters.insert("a".into(), params(&[("hostname", "10.9.9.9")]));
    gw.parameters.insert("b".into(), params(&[("hostname", "10.0.0.9")]));
    gw.parameters.insert("c".into(), params(&[("server", "  10.0.0.7 ")]));
    gw.parameters.insert("d".into(), params(&[("hostname", "web3.local")]));
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    let by_id = |id: &str| snapshot.find(PG, id).unwrap().ip_address.to_string();

    assert_eq!(by_id("a"), "10.0.0.5");
    assert_eq!(by_id("b"), "10.0.0.9");
    assert_eq!(by_id("c"), "10.0.0.7");
    assert_eq!(by_id("d"), "N/A");
}

#[tokio::test]
async fn every_address_is_dotted_quad_or_na() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("1"), "999.1.1.1", "rdp"),
            conn(Some("2"), "", "vnc"),
            conn(Some("3"), "host", "ssh"),
            conn(Some("4"), "10.1.1.1", "telnet"),
        ],
        vec![],
    ));
    gw.parameters
        .insert("3".into(), params(&[("hostname", " "), ("port", "10.0.0")]));
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    for record in &snapshot.records {
        let json = serde_json::to_value(record).unwrap();
        let ip = json["ipAddress"].as_str().unwrap();
        assert!(
            ip == "N/A" || ip.parse::<std::net::Ipv4Addr>().is_ok(),
            "잘못된 주소: {ip}"
        );
    }
}

#[tokio::test]
async fn records_sorted_by_address_with_na_last() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![
            conn(Some("1"), "10.0.0.9", "rdp"),
            conn(Some("2"), "first-unresolved", "rdp"),
            conn(Some("3"), "10.0.0.2", "rdp"),
            conn(Some("4"), "10.0.1.1", "rdp"),
            conn(Some("5"), "second-unresolved", "rdp"),
        ],
        vec![],
    )));

    let snapshot = run(&aggregator(&gw)).await;
    assert_eq!(
        addresses(&snapshot),
        vec!["10.0.0.2", "10.0.0.9", "10.0.1.1", "N/A", "N/A"]
    );
    // 같은 주소는 평탄화 순서 유지
    assert_eq!(snapshot.records[3].identifier, "2");
    assert_eq!(snapshot.records[4].identifier, "5");
}

// ============================================================
// 상태 판정
// ============================================================

#[tokio::test]
async fn active_session_beats_old_history() {
    let mut gw = MockGateway::with_tree(root(vec![conn(Some("1"), "10.0.0.1", "rdp")], vec![]));
    gw.sessions.push(PG, session("1", "192.168.1.10"));
    gw.history.insert("1".into(), vec![ago(2 * DAY)]);
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    let record = snapshot.find(PG, "1").unwrap();

    assert_eq!(record.machine_status.kind, MachineStatus::Active);
    assert_eq!(record.machine_status.label, "1 user online");
    assert_eq!(record.session_status.kind, SessionActivity::Active);
    assert_eq!(record.session_status.label, "1 Active");
    assert_eq!(record.connected_ips, "192.168.1.10");
}

#[tokio::test]
async fn session_labels_pluralize() {
    let mut gw = MockGateway::with_tree(root(vec![conn(Some("1"), "10.0.0.1", "rdp")], vec![]));
    gw.sessions.push(PG, session("1", "192.168.1.10"));
    gw.sessions.push(PG, session("1", "192.168.1.11"));
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    let record = snapshot.find(PG, "1").unwrap();
    assert_eq!(record.session_status.label, "2 Active");
    assert_eq!(record.machine_status.label, "2 users online");
    assert_eq!(record.connected_ips, "192.168.1.10, 192.168.1.11");
}

#[tokio::test]
async fn sessions_attributed_by_connection_field_within_data_source() {
    let mut gw = MockGateway::with_tree(root(vec![conn(Some("1"), "10.0.0.1", "rdp")], vec![]));
    gw.trees
        .insert("ldap".into(), root(vec![conn(Some("1"), "10.0.0.2", "rdp")], vec![]));

    // 맵 키가 잘못되어 있어도 connectionIdentifier 필드로 귀속
    let mut misfiled = HashMap::new();
    misfiled.insert("other".to_string(), vec![session("1", "172.16.0.5")]);
    gw.sessions.insert_data_source(PG, misfiled);
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    assert_eq!(snapshot.find(PG, "1").unwrap().connected_ips, "172.16.0.5");
    let ldap = snapshot.find("ldap", "1").unwrap();
    assert_eq!(ldap.connected_ips, "None");
    assert_eq!(ldap.session_status.kind, SessionActivity::Inactive);
}

#[tokio::test]
async fn history_tiers_and_connectable() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("recent"), "10.0.0.1", "rdp"),
            conn(Some("hour"), "10.0.0.2", "rdp"),
            conn(Some("days"), "10.0.0.3", "rdp"),
            conn(Some("old"), "10.0.0.4", "rdp"),
            conn(Some("fresh"), "10.0.0.5", "rdp"),
            conn(Some("bare"), "bare", "rdp"),
        ],
        vec![],
    ));
    gw.history.insert("recent".into(), vec![ago(DAY), ago(2 * MINUTE)]);
    gw.history.insert("hour".into(), vec![ago(30 * MINUTE)]);
    gw.history.insert("days".into(), vec![ago(3 * DAY)]);
    gw.history.insert("old".into(), vec![ago(30 * DAY)]);
    gw.parameters
        .insert("fresh".into(), params(&[("hostname", "10.0.0.5")]));
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    let verdict = |id: &str| {
        let r = snapshot.find(PG, id).unwrap();
        (r.machine_status.kind, r.machine_status.label.clone(), r.session_status.kind)
    };

    assert_eq!(
        verdict("recent"),
        (MachineStatus::Active, "Recently Active".into(), SessionActivity::Recent)
    );
    assert_eq!(
        verdict("hour"),
        (MachineStatus::Recent, "Recent (1h)".into(), SessionActivity::Inactive)
    );
    assert_eq!(
        verdict("days"),
        (MachineStatus::NoRecent, "3d ago".into(), SessionActivity::Inactive)
    );
    assert_eq!(
        verdict("old"),
        (MachineStatus::NoRecent, "Inactive".into(), SessionActivity::Inactive)
    );
    assert_eq!(verdict("fresh").0, MachineStatus::Connectable);
    assert_eq!(verdict("bare").0, MachineStatus::Unknown);
}

#[tokio::test]
async fn last_connection_rounding() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("59m"), "10.0.0.1", "rdp"),
            conn(Some("29m"), "10.0.0.2", "rdp"),
            conn(Some("never"), "10.0.0.3", "rdp"),
        ],
        vec![],
    ));
    gw.history.insert("59m".into(), vec![ago(59 * MINUTE)]);
    gw.history.insert("29m".into(), vec![ago(29 * MINUTE)]);
    let gw = Arc::new(gw);

    let snapshot = run(&aggregator(&gw)).await;
    assert_eq!(
        snapshot.find(PG, "59m").unwrap().last_connection.relative,
        "1 hour ago"
    );
    let just_now = &snapshot.find(PG, "29m").unwrap().last_connection;
    assert_eq!(just_now.relative, "Just now");
    assert_eq!(just_now.formatted, "Oct 19, 2026, 11:31 AM");

    let never = &snapshot.find(PG, "never").unwrap().last_connection;
    assert_eq!(never.formatted, "Never");
    assert_eq!(never.relative, "Never connected");
    assert!(never.timestamp.is_none());
}

#[tokio::test]
async fn record_carries_action_link_and_protocol() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![Connection {
            identifier: Some("1".into()),
            ..Default::default()
        }],
        vec![],
    )));

    let snapshot = run(&aggregator(&gw)).await;
    let record = &snapshot.records[0];
    assert_eq!(record.connection_name, "Unnamed Connection");
    assert_eq!(record.protocol, "Unknown");
    assert_eq!(record.action.label, "Connect");
    assert_eq!(
        record.action.href,
        "http://gw/guacamole/#/client/MQBjAHBvc3RncmVzcWw="
    );

    let json = serde_json::to_value(record).unwrap();
    assert_eq!(json["machineStatus"]["kind"], "unknown");
    assert_eq!(json["connectedIps"], "None");
}

// ============================================================
// 실패 처리
// ============================================================

#[tokio::test]
async fn detail_failure_is_isolated() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("ok"), "web-ok", "rdp"),
            conn(Some("broken"), "web-broken", "rdp"),
        ],
        vec![],
    ));
    gw.parameters.insert("ok".into(), params(&[("hostname", "10.0.0.1")]));
    gw.history.insert("ok".into(), vec![ago(2 * HOUR)]);
    gw.failing_details.insert("broken".into());
    let gw = Arc::new(gw);

    let agg = aggregator(&gw);
    let snapshot = run(&agg).await;

    assert_eq!(snapshot.len(), 2);
    let ok = snapshot.find(PG, "ok").unwrap();
    assert_eq!(ok.ip_address.to_string(), "10.0.0.1");
    assert_eq!(ok.machine_status.label, "Recent (24h)");

    let broken = snapshot.find(PG, "broken").unwrap();
    assert_eq!(broken.ip_address, ResolvedAddress::Unavailable);
    assert_eq!(broken.machine_status.kind, MachineStatus::Unknown);
    assert_eq!(broken.last_connection.relative, "Never connected");
}

#[tokio::test]
async fn tree_failure_publishes_empty_snapshot() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![conn(Some("1"), "10.0.0.1", "rdp")],
        vec![],
    )));
    let agg = aggregator(&gw);

    let first = run(&agg).await;
    assert_eq!(first.len(), 1);

    gw.fail_tree.store(true, Ordering::SeqCst);
    let second = run(&agg).await;
    assert!(second.is_empty());
    assert!(!second.stale);
    assert!(second.cycle > first.cycle);
    assert!(agg
        .activity_log()
        .entries()
        .iter()
        .any(|e| e.message.starts_with("Error loading connections")));
}

#[tokio::test]
async fn session_failure_keeps_records_without_live_sessions() {
    let mut gw = MockGateway::with_tree(root(
        vec![
            conn(Some("1"), "10.0.0.1", "rdp"),
            conn(Some("2"), "10.0.0.2", "ssh"),
        ],
        vec![],
    ));
    gw.sessions.push(PG, session("1", "192.168.1.10"));
    gw.history.insert("2".into(), vec![ago(30 * MINUTE)]);
    let gw = Arc::new(gw);
    gw.fail_sessions.store(true, Ordering::SeqCst);

    let agg = aggregator_with(&gw, FailurePolicy::KeepPrevious);
    let snapshot = run(&agg).await;

    assert_eq!(snapshot.len(), 2);
    assert!(!snapshot.stale);
    for record in &snapshot.records {
        assert_eq!(record.session_status.kind, SessionActivity::Inactive);
        assert_eq!(record.connected_ips, "None");
    }
    assert_eq!(
        snapshot.find(PG, "1").unwrap().machine_status.kind,
        MachineStatus::Unknown
    );
    assert_eq!(
        snapshot.find(PG, "2").unwrap().machine_status.label,
        "Recent (1h)"
    );

    let entries = agg.activity_log().entries();
    assert!(entries
        .iter()
        .any(|e| e.message.starts_with("Active sessions unavailable")));
    assert!(!entries
        .iter()
        .any(|e| e.message.starts_with("Error loading connections")));
}

#[tokio::test]
async fn keep_previous_policy_retains_records() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![conn(Some("1"), "10.0.0.1", "rdp")],
        vec![],
    )));
    let agg = aggregator_with(&gw, FailurePolicy::KeepPrevious);

    let first = run(&agg).await;
    gw.fail_tree.store(true, Ordering::SeqCst);
    let second = run(&agg).await;

    assert!(second.stale);
    assert_eq!(second.records, first.records);
    assert_eq!(second.generated_at, first.generated_at);
}

// ============================================================
// 동시성
// ============================================================

#[tokio::test(start_paused = true)]
async fn overlapping_cycles_publish_whole_snapshots() {
    let connections: Vec<_> = (0..20)
        .map(|i| conn(Some(&i.to_string()), &format!("10.0.0.{i}"), "rdp"))
        .collect();
    let gw = Arc::new(MockGateway {
        delay: Duration::from_millis(500),
        ..MockGateway::with_tree(root(connections, vec![]))
    });
    let agg = Arc::new(aggregator(&gw));
    let mut rx = agg.subscribe();

    let mut tasks = Vec::new();
    for i in 0..6 {
        let agg = agg.clone();
        let mode = if i % 2 == 0 { CycleMode::Manual } else { CycleMode::Scheduled };
        tasks.push(tokio::spawn(async move { agg.run_cycle(mode).await }));
    }

    let mut seen = Vec::new();
    let collector = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            seen.push((snapshot.cycle, snapshot.len()));
            if seen.len() == 3 {
                break;
            }
        }
        seen
    });

    let mut skipped = 0;
    for task in tasks {
        if let CycleOutcome::Skipped = task.await.unwrap() {
            skipped += 1;
        }
    }
    let seen = collector.await.unwrap();

    // 수동 3회는 모두 실행, 스케줄 tick은 진행 중 주기에 막혀 버려짐
    assert_eq!(skipped, 3);
    assert_eq!(agg.snapshot().cycle, 3);
    assert!(seen.iter().all(|(_, len)| *len == 20));
    assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_queues_behind_running_cycle() {
    let gw = Arc::new(MockGateway {
        delay: Duration::from_millis(200),
        ..MockGateway::with_tree(root(vec![conn(Some("1"), "10.0.0.1", "rdp")], vec![]))
    });
    let agg = Arc::new(aggregator(&gw));

    let first = tokio::spawn({
        let agg = agg.clone();
        async move { agg.run_cycle(CycleMode::Manual).await }
    });
    tokio::task::yield_now().await;
    let second = agg.run_cycle(CycleMode::Manual).await;

    assert_matches!(first.await.unwrap(), CycleOutcome::Published(_));
    assert_eq!(second.snapshot().unwrap().cycle, 2);
    assert_eq!(gw.tree_calls.load(Ordering::SeqCst), 2);
}

// ============================================================
// 서비스
// ============================================================

fn service_config(auto_start: bool) -> AppConfig {
    let mut config = AppConfig::default_config();
    config.refresh.interval_ms = 10_000;
    config.refresh.auto_start = auto_start;
    config.display.utc_offset_minutes = Some(0);
    config
}

#[tokio::test(start_paused = true)]
async fn service_loading_flag_only_for_manual_refresh() {
    let gw = Arc::new(MockGateway {
        delay: Duration::from_millis(100),
        ..MockGateway::with_tree(root(vec![conn(Some("1"), "10.0.0.1", "rdp")], vec![]))
    });
    let service = Arc::new(ConnectionStatusService::new(&service_config(false), ports(&gw)));
    let mut loading = service.subscribe_loading();
    assert!(!service.is_loading());

    let refresh = tokio::spawn({
        let service = service.clone();
        async move { service.refresh().await }
    });

    loading.changed().await.unwrap();
    assert!(*loading.borrow_and_update());

    let snapshot = refresh.await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert!(!service.is_loading());
    assert_eq!(service.snapshot().cycle, snapshot.cycle);
}

#[tokio::test(start_paused = true)]
async fn service_auto_refresh_start_stop() {
    let gw = Arc::new(MockGateway::with_tree(root(
        vec![conn(Some("1"), "10.0.0.1", "rdp")],
        vec![],
    )));
    let service = ConnectionStatusService::new(&service_config(true), ports(&gw));
    let mut rx = service.subscribe();

    service.start();
    assert!(service.is_auto_refreshing());

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().len(), 1);
    assert!(!service.is_loading());

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(gw.tree_calls.load(Ordering::SeqCst), 3);

    service.stop_auto_refresh();
    assert!(!service.is_auto_refreshing());
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(gw.tree_calls.load(Ordering::SeqCst), 3);

    let messages: Vec<_> = service
        .activity_log()
        .entries()
        .into_iter()
        .map(|e| e.message)
        .collect();
    assert!(messages.contains(&"Auto-refresh started (every 10 seconds)".to_string()));
    assert!(messages.contains(&"Auto-refresh stopped".to_string()));
}

#[tokio::test(start_paused = true)]
async fn service_restart_replaces_scheduler() {
    let gw = Arc::new(MockGateway::with_tree(root(vec![], vec![])));
    let service = ConnectionStatusService::new(&service_config(false), ports(&gw));

    service.start();
    assert!(!service.is_auto_refreshing());

    service.start_auto_refresh();
    service.start_auto_refresh();
    tokio::time::sleep(Duration::from_secs(15)).await;

    // 두 번째 시작이 첫 번째를 대체하므로 tick은 한 줄기만 남는다
    assert_eq!(gw.tree_calls.load(Ordering::SeqCst), 2);
    service.stop_auto_refresh();
}
