// ==========================================
// 车队数据装载系统 - 预防性保养解码器
// ==========================================
// 行格式: <YYYYMMDD>:<车牌>
// 示例: 20250401:TA01
// Periodic: 每 2 个月一次，共 12 次
// ==========================================

use crate::domain::fleet::Maintenance;
use crate::domain::types::{EntityKind, Recurrence};
use crate::engine::recurrence::RecurrenceExpander;
use crate::engine::reference_resolver::VehicleRefSnapshot;
use crate::importer::data_cleaner::parse_date_yyyymmdd;
use crate::importer::error::SkipReason;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MaintenanceDecoder {
    vehicles: Arc<VehicleRefSnapshot>,
    recurrence: Recurrence,
    expander: RecurrenceExpander,
}

impl MaintenanceDecoder {
    pub fn new(vehicles: Arc<VehicleRefSnapshot>, recurrence: Recurrence) -> Self {
        Self {
            vehicles,
            recurrence,
            expander: RecurrenceExpander::default(),
        }
    }
}

impl LineDecoder for MaintenanceDecoder {
    type Record = Maintenance;

    fn kind(&self) -> EntityKind {
        EntityKind::Maintenance
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Maintenance> {
        let (date_token, plate) = line
            .split_once(':')
            .ok_or(SkipReason::MissingSeparator(':'))?;

        let day = parse_date_yyyymmdd(date_token)?;

        let plate = plate.trim();
        if plate.is_empty() {
            return Err(SkipReason::EmptyField("plate".to_string()));
        }
        let vehicle_id = self
            .vehicles
            .resolve(plate)
            .ok_or_else(|| SkipReason::UnresolvedVehicle(plate.to_string()))?;

        let seed = Maintenance::for_day(vehicle_id, day);
        Ok(self.expander.expand_maintenance(&seed, self.recurrence))
    }
}
