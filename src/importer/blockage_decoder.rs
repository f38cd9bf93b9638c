// ==========================================
// 车队数据装载系统 - 道路封锁解码器
// ==========================================
// 行格式: <起>-<止>:<x1>,<y1>,<x2>,<y2>,...
// 示例: 01d06h00m-01d15h00m:31,21,34,21
// 坐标两两成对；奇数个时末尾单值丢弃（保留原行为，待业务确认）
// Periodic: 额外生成次年同一时刻的复制
// ==========================================

use crate::domain::fleet::{Blockage, GridPosition};
use crate::domain::types::{EntityKind, PeriodAnchor, Recurrence};
use crate::engine::recurrence::RecurrenceExpander;
use crate::importer::data_cleaner::parse_i32;
use crate::importer::error::SkipReason;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use crate::importer::time_token::parse_anchored;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct BlockageDecoder {
    anchor: PeriodAnchor,
    recurrence: Recurrence,
    expander: RecurrenceExpander,
}

impl BlockageDecoder {
    pub fn new(anchor: PeriodAnchor, recurrence: Recurrence) -> Self {
        Self {
            anchor,
            recurrence,
            expander: RecurrenceExpander::default(),
        }
    }
}

/// 坐标流两两配对
///
/// 奇数长度时最后一个值没有配对，直接丢弃
pub fn pair_vertices(coords: &[i32]) -> Vec<GridPosition> {
    if coords.len() % 2 == 1 {
        debug!(coords = coords.len(), "坐标个数为奇数，末尾单值已丢弃");
    }
    coords
        .chunks_exact(2)
        .map(|pair| GridPosition::new(pair[0], pair[1]))
        .collect()
}

impl LineDecoder for BlockageDecoder {
    type Record = Blockage;

    fn kind(&self) -> EntityKind {
        EntityKind::Blockage
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Blockage> {
        let (range, coord_list) = line
            .split_once(':')
            .ok_or(SkipReason::MissingSeparator(':'))?;

        let tokens: Vec<&str> = range.split('-').collect();
        if tokens.len() != 2 {
            return Err(SkipReason::InvalidTimeRange(range.to_string()));
        }
        let start = parse_anchored(tokens[0], self.anchor)?;
        let end = parse_anchored(tokens[1], self.anchor)?;
        if start >= end {
            return Err(SkipReason::NonIncreasingRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let coords = coord_list
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| parse_i32("coordinate", c))
            .collect::<Result<Vec<_>, _>>()?;

        let vertices = pair_vertices(&coords);
        if vertices.is_empty() {
            return Err(SkipReason::EmptyPolygon);
        }

        let blockage = Blockage {
            start,
            end,
            vertices,
        };
        Ok(self.expander.expand_blockage(&blockage, self.recurrence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn decoder(recurrence: Recurrence) -> BlockageDecoder {
        BlockageDecoder::new(PeriodAnchor::new(2025, 1).unwrap(), recurrence)
    }

    #[test]
    fn test_decode_single_blockage() {
        let blockages = decoder(Recurrence::Once)
            .decode_line("01d06h00m-01d15h00m:31,21,34,21,34,27")
            .unwrap();

        assert_eq!(blockages.len(), 1);
        let b = &blockages[0];
        assert_eq!(b.start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(6, 0, 0).unwrap());
        assert_eq!(b.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(15, 0, 0).unwrap());
        assert_eq!(
            b.vertices,
            vec![GridPosition::new(31, 21), GridPosition::new(34, 21), GridPosition::new(34, 27)]
        );
    }

    #[test]
    fn test_odd_coordinate_list_drops_trailing_value() {
        for (list, expected) in [("1,2,3", 1), ("1,2,3,4,5", 2), ("1,2,3,4", 2)] {
            let line = format!("01d00h00m-02d00h00m:{}", list);
            let b = decoder(Recurrence::Once).decode_line(&line).unwrap().remove(0);
            let len = list.split(',').count();
            assert_eq!(b.vertices.len(), len / 2);
            assert_eq!(b.vertices.len(), expected);
        }
    }

    #[test]
    fn test_periodic_adds_next_year_copy() {
        let blockages = decoder(Recurrence::Periodic)
            .decode_line("05d10h30m-05d12h00m:1,1,1,9")
            .unwrap();

        assert_eq!(blockages.len(), 2);
        assert_eq!(
            blockages[1].start,
            NaiveDate::from_ymd_opt(2026, 1, 5).unwrap().and_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(blockages[0].vertices, blockages[1].vertices);
    }

    #[test]
    fn test_malformed_lines() {
        let d = decoder(Recurrence::Once);
        assert_eq!(
            d.decode_line("01d06h00m-01d15h00m 31,21"),
            Err(SkipReason::MissingSeparator(':'))
        );
        assert!(matches!(
            d.decode_line("01d06h00m:31,21"),
            Err(SkipReason::InvalidTimeRange(_))
        ));
        assert!(matches!(
            d.decode_line("01d15h00m-01d06h00m:31,21"),
            Err(SkipReason::NonIncreasingRange { .. })
        ));
        assert!(matches!(
            d.decode_line("01d06h00m-01d15h00m:31,x"),
            Err(SkipReason::InvalidNumber { .. })
        ));
        assert_eq!(
            d.decode_line("01d06h00m-01d15h00m:31"),
            Err(SkipReason::EmptyPolygon)
        );
        assert_eq!(
            d.decode_line("01d06h00m-01d15h00m:"),
            Err(SkipReason::EmptyPolygon)
        );
    }
}
