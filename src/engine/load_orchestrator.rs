// ==========================================
// 车队数据装载系统 - 装载编排器
// ==========================================
// 职责: 一次完整的"清空 + 重新装载"
// 阶段（前一阶段成功才进入下一阶段）:
//   1. 发现输入文件
//   2. 解码无依赖实体（仓库 / 车辆 / 订单 / 封路）
//   3. 清空六张表（依赖方在前，尽力而为，外键约束必须恢复）
//   4. 插入无依赖实体（每类一个事务）
//   5. 构建车牌引用快照
//   6. 解码依赖实体（故障 / 保养）
//   7. 插入依赖实体
// 红线: 任一类插入失败即终止，运行判为失败；不做行级重试
// ==========================================

use crate::config::ingest_config::IngestConfig;
use crate::domain::report::{FileError, LoadReport, LoadStage};
use crate::domain::types::EntityKind;
use crate::engine::reference_resolver::VehicleRefSnapshot;
use crate::importer::blockage_decoder::BlockageDecoder;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::failure_decoder::FailureDecoder;
use crate::importer::file_discovery::{discover_inputs, InputFile};
use crate::importer::line_decoder::{DecodeBatch, LineDecoder};
use crate::importer::maintenance_decoder::MaintenanceDecoder;
use crate::importer::order_decoder::OrderDecoder;
use crate::importer::vehicle_decoder::{dedupe_plates, VehicleDecoder};
use crate::importer::warehouse_decoder::{check_principal_count, WarehouseDecoder};
use crate::repository::error::RepositoryResult;
use crate::repository::fleet_repo::FleetRepository;
use crate::repository::store::StoreConnection;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// LoadError - 运行级致命错误
// ==========================================
// 存储失败不走这里，记入 LoadReport 并将状态置为 Failed
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("配置无效: {0}")]
    InvalidConfig(String),

    #[error("输入文件发现失败: {0}")]
    Discovery(#[from] ImportError),
}

// ==========================================
// LoadOrchestrator
// ==========================================
pub struct LoadOrchestrator<S: StoreConnection> {
    repo: FleetRepository<S>,
    config: IngestConfig,
}

impl<S: StoreConnection> LoadOrchestrator<S> {
    /// # 参数
    /// - store: 存储连接
    /// - config: 装载配置（运行期间只读）
    pub fn new(store: Arc<S>, config: IngestConfig) -> Self {
        Self {
            repo: FleetRepository::new(store),
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// 执行一次完整装载
    ///
    /// # 返回
    /// - Ok(LoadReport): 运行结束（成功或失败见 report.status）
    /// - Err(LoadError): 配置无效或输入目录不可读，未触碰存储
    #[instrument(skip(self), fields(run_id = tracing::field::Empty))]
    pub async fn run_full_load(&self) -> Result<LoadReport, LoadError> {
        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let mut report = LoadReport::new(run_id.clone());
        info!(
            run_id = %run_id,
            data_dir = %self.config.data_dir.display(),
            "开始装载车队数据"
        );

        self.config
            .validate()
            .map_err(|e| LoadError::InvalidConfig(e.to_string()))?;

        // === 阶段 1: 发现输入文件 ===
        report.enter(LoadStage::Discover);
        let inputs = discover_inputs(
            &self.config.data_dir,
            &self.config.files,
            self.config.default_anchor,
        )?;
        self.note_missing_period_files(&inputs, &mut report);

        // === 阶段 2: 解码无依赖实体 ===
        report.enter(LoadStage::DecodeIndependent);
        let warehouses =
            decode_kind(&inputs, EntityKind::Warehouse, |_| WarehouseDecoder::new(), &mut report)
                .await;
        check_principal_count(&warehouses);

        let vehicles =
            decode_kind(&inputs, EntityKind::Vehicle, |_| VehicleDecoder::new(), &mut report).await;
        let mut duplicates = Vec::new();
        let vehicles = dedupe_plates(vehicles, &self.config.files.vehicles_file, &mut duplicates);
        report.record_skipped(EntityKind::Vehicle, duplicates);

        let orders = decode_kind(
            &inputs,
            EntityKind::Order,
            |file| OrderDecoder::new(file.anchor),
            &mut report,
        )
        .await;

        let blockage_recurrence = self.config.recurrence_for(EntityKind::Blockage);
        let blockages = decode_kind(
            &inputs,
            EntityKind::Blockage,
            |file| BlockageDecoder::new(file.anchor, blockage_recurrence),
            &mut report,
        )
        .await;

        // === 阶段 3: 清空 ===
        report.enter(LoadStage::Purge);
        if !self.purge_all(&mut report).await {
            return Ok(self.finish(report, started).await);
        }

        // === 阶段 4: 插入无依赖实体 ===
        report.enter(LoadStage::LoadIndependent);
        let loaded = self
            .insert_kind(EntityKind::Warehouse, self.repo.insert_warehouses(&warehouses).await, &mut report)
            && self.insert_kind(EntityKind::Vehicle, self.repo.insert_vehicles(&vehicles).await, &mut report)
            && self.insert_kind(EntityKind::Order, self.repo.insert_orders(&orders).await, &mut report)
            && self.insert_kind(EntityKind::Blockage, self.repo.insert_blockages(&blockages).await, &mut report);
        if !loaded {
            return Ok(self.finish(report, started).await);
        }

        // === 阶段 5: 车牌引用快照 ===
        report.enter(LoadStage::ResolveReferences);
        let snapshot = match VehicleRefSnapshot::load(&self.repo).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                error!(error = %e, "车牌引用快照构建失败");
                report.fail(Some(EntityKind::Vehicle), e.to_string());
                return Ok(self.finish(report, started).await);
            }
        };

        // === 阶段 6: 解码依赖实体 ===
        report.enter(LoadStage::DecodeDependent);
        let run_date = self.config.effective_run_date();
        let failures = decode_kind(
            &inputs,
            EntityKind::Failure,
            |_| FailureDecoder::new(Arc::clone(&snapshot), run_date),
            &mut report,
        )
        .await;

        let maintenance_recurrence = self.config.recurrence_for(EntityKind::Maintenance);
        let maintenances = decode_kind(
            &inputs,
            EntityKind::Maintenance,
            |_| MaintenanceDecoder::new(Arc::clone(&snapshot), maintenance_recurrence),
            &mut report,
        )
        .await;

        // === 阶段 7: 插入依赖实体 ===
        report.enter(LoadStage::LoadDependent);
        let loaded = self
            .insert_kind(EntityKind::Failure, self.repo.insert_failures(&failures).await, &mut report)
            && self.insert_kind(
                EntityKind::Maintenance,
                self.repo.insert_maintenances(&maintenances).await,
                &mut report,
            );
        if loaded {
            report.complete();
        }

        Ok(self.finish(report, started).await)
    }

    /// 清空全部表
    ///
    /// # 返回
    /// - false: 外键约束未能恢复，运行终止
    async fn purge_all(&self, report: &mut LoadReport) -> bool {
        if let Err(e) = self.repo.set_referential_integrity(false).await {
            warn!(error = %e, "外键约束关闭失败，按依赖顺序继续清空");
        }

        for kind in EntityKind::PURGE_ORDER {
            match self.repo.purge_table(kind).await {
                Ok(deleted) => debug!(table = kind.table_name(), deleted = deleted, "已清空"),
                Err(e) => {
                    warn!(table = kind.table_name(), error = %e, "清表失败，继续清空其余表");
                    report.note_purge_failure(kind, e.to_string());
                }
            }
        }

        match self.repo.set_referential_integrity(true).await {
            Ok(()) => {
                info!("清空阶段完成");
                true
            }
            Err(e) => {
                error!(error = %e, "外键约束恢复失败");
                report.fail(None, format!("外键约束恢复失败: {}", e));
                false
            }
        }
    }

    /// 处理一类实体的插入结果
    ///
    /// # 返回
    /// - false: 插入失败（事务已回滚），运行判为失败
    fn insert_kind(
        &self,
        kind: EntityKind,
        result: RepositoryResult<usize>,
        report: &mut LoadReport,
    ) -> bool {
        match result {
            Ok(count) => {
                report.counts.set(kind, count);
                true
            }
            Err(e) => {
                error!(kind = %kind, table = kind.table_name(), error = %e, "批量插入失败");
                report.fail(Some(kind), e.to_string());
                false
            }
        }
    }

    /// 周期类实体没有任何输入文件时记为文件错误
    fn note_missing_period_files(&self, inputs: &[InputFile], report: &mut LoadReport) {
        for kind in EntityKind::PURGE_ORDER {
            let Some(prefix) = self.config.files.prefix_for(kind) else {
                continue;
            };
            if inputs.iter().any(|f| f.kind == kind) {
                continue;
            }

            let pattern = self
                .config
                .data_dir
                .join(format!("{}*", prefix))
                .display()
                .to_string();
            warn!(kind = %kind, pattern = %pattern, "未找到输入文件");
            report.file_errors.push(FileError {
                kind,
                path: pattern,
                message: "未找到输入文件".to_string(),
            });
        }
    }

    async fn finish(&self, mut report: LoadReport, started: Instant) -> LoadReport {
        report.elapsed_ms = started.elapsed().as_millis();

        if report.is_success() {
            for kind in EntityKind::PURGE_ORDER.iter().rev() {
                match self.repo.count_rows(*kind).await {
                    Ok(rows) if rows != report.counts.get(*kind) => warn!(
                        table = kind.table_name(),
                        rows = rows,
                        inserted = report.counts.get(*kind),
                        "表行数与入库条数不一致"
                    ),
                    Ok(rows) => debug!(table = kind.table_name(), rows = rows, "表行数"),
                    Err(e) => warn!(table = kind.table_name(), error = %e, "表行数读取失败"),
                }
            }
        }

        info!(
            run_id = %report.run_id,
            status = ?report.status,
            stage = ?report.stage,
            loaded = report.counts.total(),
            skipped = report.total_skipped(),
            file_errors = report.file_errors.len(),
            elapsed_ms = report.elapsed_ms as u64,
            "装载结束"
        );
        report
    }
}

/// 并发解码某类实体的全部文件，汇总为一个批次
///
/// 每个文件在 blocking 线程上解码；文件级错误记入报告并继续其余文件
async fn decode_kind<D, F>(
    inputs: &[InputFile],
    kind: EntityKind,
    make_decoder: F,
    report: &mut LoadReport,
) -> Vec<D::Record>
where
    D: LineDecoder + 'static,
    D::Record: 'static,
    F: Fn(&InputFile) -> D,
{
    let files: Vec<InputFile> = inputs.iter().filter(|f| f.kind == kind).cloned().collect();

    let tasks = files.iter().map(|file| {
        let decoder = make_decoder(file);
        let path = file.path.clone();
        tokio::task::spawn_blocking(move || decoder.decode_file(&path))
    });
    let results = join_all(tasks).await;

    let mut records = Vec::new();
    for (file, joined) in files.iter().zip(results) {
        let outcome: ImportResult<DecodeBatch<D::Record>> = joined
            .map_err(|e| ImportError::InternalError(format!("解码任务异常: {}", e)))
            .and_then(|r| r);

        match outcome {
            Ok(batch) => {
                info!(
                    kind = %kind,
                    file = %file.path.display(),
                    anchor = %file.anchor,
                    records = batch.records.len(),
                    skipped = batch.skipped.len(),
                    unresolved = batch.unresolved,
                    "文件解码完成"
                );
                records.extend(batch.records);
                report.record_skipped(kind, batch.skipped);
                report.record_unresolved(kind, batch.unresolved);
            }
            Err(e) => {
                warn!(kind = %kind, file = %file.path.display(), error = %e, "文件解码失败，继续其余文件");
                report.file_errors.push(FileError {
                    kind,
                    path: file.path.display().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    records
}
