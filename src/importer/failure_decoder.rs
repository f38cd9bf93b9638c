// ==========================================
// 车队数据装载系统 - 计划故障解码器
// ==========================================
// 行格式: <班次>_<车牌>_<故障类型>（恰好 3 段）
// 示例: T1_TA01_TI1
// 日期取本次运行日期；occurred 恒为 false
// 故障类型不落库，只校验非空
// ==========================================

use crate::domain::fleet::Failure;
use crate::domain::types::{EntityKind, Shift};
use crate::engine::reference_resolver::VehicleRefSnapshot;
use crate::importer::error::SkipReason;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FailureDecoder {
    vehicles: Arc<VehicleRefSnapshot>,
    run_date: NaiveDate,
}

impl FailureDecoder {
    /// # 参数
    /// - vehicles: 车牌引用快照
    /// - run_date: 本次运行日期（写入每条故障）
    pub fn new(vehicles: Arc<VehicleRefSnapshot>, run_date: NaiveDate) -> Self {
        Self { vehicles, run_date }
    }
}

impl LineDecoder for FailureDecoder {
    type Record = Failure;

    fn kind(&self) -> EntityKind {
        EntityKind::Failure
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Failure> {
        let parts: Vec<&str> = line.split('_').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(SkipReason::field_count("3", parts.len()));
        }

        let shift = Shift::from_label(parts[0])
            .ok_or_else(|| SkipReason::InvalidShift(parts[0].to_string()))?;

        if parts[2].is_empty() {
            return Err(SkipReason::EmptyField("type".to_string()));
        }

        let vehicle_id = self
            .vehicles
            .resolve(parts[1])
            .ok_or_else(|| SkipReason::UnresolvedVehicle(parts[1].to_string()))?;

        let (from_hour, to_hour) = shift.hour_window();
        debug!(
            plate = parts[1],
            shift = %shift,
            from_hour = from_hour,
            to_hour = to_hour,
            "故障班次已解析"
        );

        Ok(vec![Failure {
            date: self.run_date,
            shift,
            vehicle_id,
            occurred: false,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> FailureDecoder {
        let snapshot = VehicleRefSnapshot::from_pairs(vec![
            ("TA01".to_string(), 11),
            ("TD10".to_string(), 42),
        ]);
        FailureDecoder::new(
            Arc::new(snapshot),
            NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
        )
    }

    #[test]
    fn test_decode_resolved_failure() {
        let failures = decoder().decode_line("T2_TD10_TI3").unwrap();
        assert_eq!(
            failures,
            vec![Failure {
                date: NaiveDate::from_ymd_opt(2025, 5, 3).unwrap(),
                shift: Shift::T2,
                vehicle_id: 42,
                occurred: false,
            }]
        );
    }

    #[test]
    fn test_unknown_plate_is_unresolved() {
        let err = decoder().decode_line("T1_TB07_TI1").unwrap_err();
        assert_eq!(err, SkipReason::UnresolvedVehicle("TB07".to_string()));
        assert!(err.is_unresolved_reference());
    }

    #[test]
    fn test_batch_counts_unresolved_separately() {
        let batch = decoder().decode_str("failures.csv", "T1_TA01_TI1\nT1_TB07_TI1\nT9_TA01_TI1\n");
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped.len(), 2);
        assert_eq!(batch.unresolved, 1);
    }

    #[test]
    fn test_malformed_lines() {
        let d = decoder();
        assert!(matches!(d.decode_line("T4_TA01_TI1"), Err(SkipReason::InvalidShift(_))));
        assert!(matches!(d.decode_line("t1_TA01_TI1"), Err(SkipReason::InvalidShift(_))));
        assert!(matches!(
            d.decode_line("T1_TA01"),
            Err(SkipReason::FieldCount { actual: 2, .. })
        ));
        assert!(matches!(
            d.decode_line("T1_TA01_TI1_X"),
            Err(SkipReason::FieldCount { actual: 4, .. })
        ));
        assert!(matches!(d.decode_line("T1_TA01_"), Err(SkipReason::EmptyField(_))));
    }
}
