// ==========================================
// 车队数据装载系统 - 行解码 Trait
// ==========================================
// 职责: 定义逐行解码接口与解码批次
// 约束: 单行错误只跳过该行并告警，文件级 I/O 错误才向上返回
// ==========================================

use crate::domain::report::SkippedLine;
use crate::domain::types::EntityKind;
use crate::importer::error::{ImportResult, SkipReason};
use crate::importer::file_parser;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// LineOutcome - 单行解码结果
// ==========================================
// Ok(vec![]) 表示该行被有意忽略（如表头），不计入跳过
pub type LineOutcome<T> = Result<Vec<T>, SkipReason>;

// ==========================================
// DecodeBatch - 一个文件的解码结果
// ==========================================
#[derive(Debug, Clone)]
pub struct DecodeBatch<T> {
    pub kind: EntityKind,
    pub source: String,
    pub records: Vec<T>,
    pub skipped: Vec<SkippedLine>,
    pub unresolved: usize, // skipped 中车牌未解析的行数
}

impl<T> DecodeBatch<T> {
    pub fn new(kind: EntityKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: source.into(),
            records: Vec::new(),
            skipped: Vec::new(),
            unresolved: 0,
        }
    }
}

// ==========================================
// LineDecoder Trait
// ==========================================
// 实现者: OrderDecoder / VehicleDecoder / WarehouseDecoder /
//         FailureDecoder / BlockageDecoder / MaintenanceDecoder
pub trait LineDecoder: Send + Sync {
    type Record: Send;

    /// 解码器对应的实体种类
    fn kind(&self) -> EntityKind;

    /// 解码单行（已 TRIM，非空）
    fn decode_line(&self, line: &str) -> LineOutcome<Self::Record>;

    /// 逐行解码文本内容
    ///
    /// # 参数
    /// - source: 来源标识（文件路径），用于告警与报告
    /// - content: 文件全文
    fn decode_str(&self, source: &str, content: &str) -> DecodeBatch<Self::Record> {
        let kind = self.kind();
        let mut batch = DecodeBatch::new(kind, source);

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            match self.decode_line(line) {
                Ok(records) => batch.records.extend(records),
                Err(reason) => {
                    if reason.is_unresolved_reference() {
                        batch.unresolved += 1;
                    }
                    warn!(
                        kind = %kind,
                        source = source,
                        line_number = idx + 1,
                        line = line,
                        reason = %reason,
                        "跳过输入行"
                    );
                    batch.skipped.push(SkippedLine {
                        source: source.to_string(),
                        line_number: idx + 1,
                        line: line.to_string(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        debug!(
            kind = %kind,
            source = source,
            records = batch.records.len(),
            skipped = batch.skipped.len(),
            "解码完成"
        );
        batch
    }

    /// 读取并解码文件
    ///
    /// # 返回
    /// - Err: 文件不存在或不可读（该文件整体失败）
    fn decode_file(&self, path: &Path) -> ImportResult<DecodeBatch<Self::Record>> {
        let content = file_parser::read_text(path)?;
        Ok(self.decode_str(&path.display().to_string(), &content))
    }
}
