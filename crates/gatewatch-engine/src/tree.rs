//! 연결 그룹 트리 평탄화.
//!
//! 데이터 소스별 트리를 깊이 우선으로 순회하며 연결 목록을 만든다.
//! 각 연결에는 소속 데이터 소스가 붙는다.

use gatewatch_core::models::connection::{Connection, ConnectionGroupNode};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// 그룹 중첩 최대 깊이
pub const MAX_GROUP_DEPTH: usize = 64;

/// 데이터 소스 → 트리 맵을 연결 목록으로 평탄화
///
/// 데이터 소스는 이름 순으로 처리한다. 한 데이터 소스 안에서는
/// 그룹에 직접 속한 연결을 먼저, 그다음 하위 그룹을 선언 순서대로 내려간다.
pub fn flatten_trees(trees: &HashMap<String, ConnectionGroupNode>) -> Vec<Connection> {
    let mut data_sources: Vec<&String> = trees.keys().collect();
    data_sources.sort();

    let mut out = Vec::new();
    for data_source in data_sources {
        let before = out.len();
        flatten_tree(data_source, &trees[data_source], &mut out);
        debug!(
            data_source = %data_source,
            "트리 평탄화: 연결 {}개",
            out.len() - before
        );
    }
    out
}

/// 트리 하나를 평탄화하여 `out`에 추가
pub fn flatten_tree(data_source: &str, root: &ConnectionGroupNode, out: &mut Vec<Connection>) {
    let mut visited = HashSet::new();
    walk(data_source, root, 0, &mut visited, out);
}

fn walk<'a>(
    data_source: &str,
    group: &'a ConnectionGroupNode,
    depth: usize,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<Connection>,
) {
    if depth > MAX_GROUP_DEPTH {
        warn!(
            data_source,
            group = ?group.identifier,
            "그룹 중첩이 {MAX_GROUP_DEPTH}단계를 넘어 건너뜀"
        );
        return;
    }

    if let Some(id) = group.identifier.as_deref() {
        if !visited.insert(id) {
            warn!(data_source, group = id, "중복 그룹 건너뜀");
            return;
        }
    }

    out.extend(group.connections().iter().map(|conn| Connection {
        data_source: data_source.to_string(),
        ..conn.clone()
    }));

    for child in group.groups() {
        walk(data_source, child, depth + 1, visited, out);
    }
}
