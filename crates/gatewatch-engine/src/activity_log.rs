//! 활동 로그.
//!
//! 갱신 주기마다 남기는 진단 메시지를 고정 용량 링 버퍼에 보관한다.
//! 용량을 넘으면 가장 오래된 항목부터 버린다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::time_format::DisplayZone;

/// 로그 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 활동 로그 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 기록 시각
    pub timestamp: DateTime<Utc>,
    /// 수준
    pub level: LogLevel,
    /// 메시지
    pub message: String,
}

/// 고정 용량 활동 로그
#[derive(Debug)]
pub struct ActivityLog {
    entries: parking_lot::Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    zone: DisplayZone,
}

impl ActivityLog {
    /// 새 활동 로그 생성 (용량 0은 1로 보정)
    pub fn new(capacity: usize, zone: DisplayZone) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: parking_lot::Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            zone,
        }
    }

    /// 항목 추가
    pub fn push(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    /// 오래된 순 전체 항목 복사본
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 전체 삭제
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 클립보드용 텍스트 (`[HH:MM:SS] message` 줄 단위)
    pub fn export_text(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(|e| {
                format!(
                    "[{}] {}",
                    self.zone.format_with(e.timestamp, "%H:%M:%S"),
                    e.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
