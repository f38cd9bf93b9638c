// ==========================================
// 车队数据装载系统 - 仓库解码器
// ==========================================
// 行格式: <x>,<y>,<容量>[,main]
// 主仓库: 容量为无上限哨兵值，全天补给
// 中间仓库: 容量取声明值，每日 00:00 补给
// ==========================================

use crate::domain::fleet::{GridPosition, Warehouse};
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::{parse_f64, parse_i32, strip_unit};
use crate::importer::error::SkipReason;
use crate::importer::file_parser::split_fields;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use tracing::warn;

const PRINCIPAL_MARKER: &str = "main";
const HEADER_KEYWORD: &str = "tipo";

#[derive(Debug, Clone, Copy, Default)]
pub struct WarehouseDecoder;

impl WarehouseDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl LineDecoder for WarehouseDecoder {
    type Record = Warehouse;

    fn kind(&self) -> EntityKind {
        EntityKind::Warehouse
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Warehouse> {
        if line.to_lowercase().contains(HEADER_KEYWORD) {
            return Ok(Vec::new());
        }

        let fields = split_fields(line).map_err(|e| SkipReason::invalid_value("line", e))?;
        if fields.len() != 3 && fields.len() != 4 {
            return Err(SkipReason::field_count("3 或 4", fields.len()));
        }

        let x = parse_i32("x", &fields[0])?;
        let y = parse_i32("y", &fields[1])?;
        let position = GridPosition::new(x, y);

        let is_principal = fields
            .get(3)
            .map(|marker| marker.eq_ignore_ascii_case(PRINCIPAL_MARKER))
            .unwrap_or(false);

        if is_principal {
            return Ok(vec![Warehouse::principal(position)]);
        }

        let capacity = parse_f64("capacity", strip_unit(&fields[2], "m3"))?;

        Ok(vec![Warehouse::intermediate(position, capacity)])
    }
}

/// 主仓库数量检查（期望恰好 1 个，只告警不拦截）
pub fn check_principal_count(warehouses: &[Warehouse]) -> usize {
    let count = warehouses.iter().filter(|w| w.is_principal).count();
    if count != 1 {
        warn!(principal_count = count, "主仓库数量异常，期望 1 个");
    }
    count
}
