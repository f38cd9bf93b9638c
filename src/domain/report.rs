// ==========================================
// 车队数据装载系统 - 装载运行报告
// ==========================================
// 职责: 汇总一次全量装载的结果（计数 / 跳过行 / 文件错误 / 存储失败）
// 用途: 编排器返回给调用方，CLI 以 JSON 输出
// ==========================================

use crate::domain::types::EntityKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// RunStatus - 运行状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,
    Succeeded,
    Failed,
}

// ==========================================
// LoadStage - 编排阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Discover,
    DecodeIndependent,
    Purge,
    LoadIndependent,
    ResolveReferences,
    DecodeDependent,
    LoadDependent,
    Completed,
}

// ==========================================
// LoadCounts - 各实体入库条数
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadCounts {
    pub orders: usize,
    pub vehicles: usize,
    pub warehouses: usize,
    pub failures: usize,
    pub blockages: usize,
    pub maintenances: usize,
}

impl LoadCounts {
    pub fn get(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Order => self.orders,
            EntityKind::Vehicle => self.vehicles,
            EntityKind::Warehouse => self.warehouses,
            EntityKind::Failure => self.failures,
            EntityKind::Blockage => self.blockages,
            EntityKind::Maintenance => self.maintenances,
        }
    }

    pub fn set(&mut self, kind: EntityKind, count: usize) {
        let slot = match kind {
            EntityKind::Order => &mut self.orders,
            EntityKind::Vehicle => &mut self.vehicles,
            EntityKind::Warehouse => &mut self.warehouses,
            EntityKind::Failure => &mut self.failures,
            EntityKind::Blockage => &mut self.blockages,
            EntityKind::Maintenance => &mut self.maintenances,
        };
        *slot = count;
    }

    pub fn total(&self) -> usize {
        self.orders
            + self.vehicles
            + self.warehouses
            + self.failures
            + self.blockages
            + self.maintenances
    }
}

// ==========================================
// SkippedLine - 被跳过的输入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub source: String,     // 源文件
    pub line_number: usize, // 1 起始行号
    pub line: String,       // 原始行（已 TRIM）
    pub reason: String,     // 跳过原因
}

// ==========================================
// FileError - 输入文件读取失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    pub kind: EntityKind,
    pub path: String,
    pub message: String,
}

// ==========================================
// StoreFailure - 存储操作失败
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreFailure {
    pub stage: LoadStage,
    pub kind: Option<EntityKind>,
    pub message: String,
}

// ==========================================
// LoadReport - 全量装载报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    pub run_id: String,
    pub status: RunStatus,
    pub stage: LoadStage,                                 // 最后到达的阶段
    pub counts: LoadCounts,
    pub skipped: BTreeMap<EntityKind, Vec<SkippedLine>>,
    pub unresolved_references: BTreeMap<EntityKind, usize>, // 跳过行中车牌未解析的部分
    pub file_errors: Vec<FileError>,
    pub store_failures: Vec<StoreFailure>,
    pub elapsed_ms: u128,
}

impl LoadReport {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            status: RunStatus::Running,
            stage: LoadStage::Discover,
            counts: LoadCounts::default(),
            skipped: BTreeMap::new(),
            unresolved_references: BTreeMap::new(),
            file_errors: Vec::new(),
            store_failures: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Succeeded
    }

    pub fn enter(&mut self, stage: LoadStage) {
        self.stage = stage;
    }

    pub fn record_skipped(&mut self, kind: EntityKind, lines: Vec<SkippedLine>) {
        if lines.is_empty() {
            return;
        }
        self.skipped.entry(kind).or_default().extend(lines);
    }

    /// 某实体被跳过的行数
    pub fn skipped_count(&self, kind: EntityKind) -> usize {
        self.skipped.get(&kind).map(Vec::len).unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().map(Vec::len).sum()
    }

    pub fn record_unresolved(&mut self, kind: EntityKind, count: usize) {
        if count > 0 {
            *self.unresolved_references.entry(kind).or_default() += count;
        }
    }

    /// 某实体因车牌未解析而跳过的行数
    pub fn unresolved_count(&self, kind: EntityKind) -> usize {
        self.unresolved_references.get(&kind).copied().unwrap_or(0)
    }

    /// 记录存储失败，运行整体判为失败
    pub fn fail(&mut self, kind: Option<EntityKind>, message: impl Into<String>) {
        self.store_failures.push(StoreFailure {
            stage: self.stage,
            kind,
            message: message.into(),
        });
        self.status = RunStatus::Failed;
    }

    /// 记录清空阶段的单表失败（尽力而为，不改变运行状态）
    pub fn note_purge_failure(&mut self, kind: EntityKind, message: impl Into<String>) {
        self.store_failures.push(StoreFailure {
            stage: LoadStage::Purge,
            kind: Some(kind),
            message: message.into(),
        });
    }

    pub fn complete(&mut self) {
        self.stage = LoadStage::Completed;
        self.status = RunStatus::Succeeded;
    }
}
