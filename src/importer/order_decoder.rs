// ==========================================
// 车队数据装载系统 - 订单解码器
// ==========================================
// 行格式: <DDdHHhMMm>:<x>,<y>,<客户>,<量>m3,<时长>h
// 示例: 11d13h31m:13,18,c-198,3m3,4h
// 年月来自文件名（ventas<YYYY><MM>.txt），由调用方传入
// ==========================================

use crate::domain::fleet::{GridPosition, Order};
use crate::domain::types::{EntityKind, PeriodAnchor};
use crate::importer::data_cleaner::{parse_i32, strip_unit};
use crate::importer::error::SkipReason;
use crate::importer::file_parser::split_fields;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use crate::importer::time_token::parse_anchored;

const ORDER_FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct OrderDecoder {
    anchor: PeriodAnchor,
}

impl OrderDecoder {
    pub fn new(anchor: PeriodAnchor) -> Self {
        Self { anchor }
    }
}

impl LineDecoder for OrderDecoder {
    type Record = Order;

    fn kind(&self) -> EntityKind {
        EntityKind::Order
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Order> {
        let (token, data) = line
            .split_once(':')
            .ok_or(SkipReason::MissingSeparator(':'))?;

        let registered_at = parse_anchored(token, self.anchor)?;

        let fields = split_fields(data).map_err(|e| SkipReason::invalid_value("data", e))?;
        if fields.len() != ORDER_FIELD_COUNT {
            return Err(SkipReason::field_count("5", fields.len()));
        }

        let client_code = fields[2].clone();
        if client_code.is_empty() {
            return Err(SkipReason::EmptyField("client".to_string()));
        }

        Ok(vec![Order {
            client_code,
            registered_at,
            position: GridPosition::new(parse_i32("x", &fields[0])?, parse_i32("y", &fields[1])?),
            quantity_m3: parse_i32("quantity", strip_unit(&fields[3], "m3"))?,
            tolerance_hours: parse_i32("tolerance", strip_unit(&fields[4], "h"))?,
        }])
    }
}
