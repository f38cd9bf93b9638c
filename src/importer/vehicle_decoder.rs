// ==========================================
// 车队数据装载系统 - 车辆解码器
// ==========================================
// 行格式: <车型>,<皮重吨>,<载量>,_,_,<台数>
// 示例: TA,2.5,25,_,_,2 → TA01, TA02
// 表头行（含 Tipo / Unidades）直接忽略
// ==========================================

use crate::domain::fleet::Vehicle;
use crate::domain::report::SkippedLine;
use crate::domain::types::EntityKind;
use crate::importer::data_cleaner::{parse_f64, parse_i32, tonnes_to_kg};
use crate::importer::error::SkipReason;
use crate::importer::file_parser::split_fields;
use crate::importer::line_decoder::{LineDecoder, LineOutcome};
use std::collections::HashSet;
use tracing::warn;

const VEHICLE_FIELD_COUNT: usize = 6;
const HEADER_KEYWORDS: [&str; 2] = ["tipo", "unidades"];

#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleDecoder;

impl VehicleDecoder {
    pub fn new() -> Self {
        Self
    }

    fn is_header(line: &str) -> bool {
        let lower = line.to_lowercase();
        HEADER_KEYWORDS.iter().any(|kw| lower.contains(kw))
    }
}

impl LineDecoder for VehicleDecoder {
    type Record = Vehicle;

    fn kind(&self) -> EntityKind {
        EntityKind::Vehicle
    }

    fn decode_line(&self, line: &str) -> LineOutcome<Vehicle> {
        if Self::is_header(line) {
            return Ok(Vec::new());
        }

        let fields = split_fields(line).map_err(|e| SkipReason::invalid_value("line", e))?;
        if fields.len() != VEHICLE_FIELD_COUNT {
            return Err(SkipReason::field_count("6", fields.len()));
        }

        let category = fields[0].as_str();
        if category.is_empty() {
            return Err(SkipReason::EmptyField("category".to_string()));
        }

        let tare_tonnes = parse_f64("tare", &fields[1])?;
        let tare_kg =
            tonnes_to_kg(tare_tonnes).ok_or_else(|| SkipReason::invalid_value("tare", &fields[1]))?;

        let cargo_capacity = parse_f64("capacity", &fields[2])?;
        if cargo_capacity < 0.0 {
            return Err(SkipReason::invalid_value("capacity", &fields[2]));
        }

        let units = parse_i32("units", &fields[5])?;
        if units < 0 {
            return Err(SkipReason::invalid_value("units", units));
        }

        Ok((1..=units as u32)
            .map(|seq| Vehicle::new_unit(category, seq, tare_kg, cargo_capacity))
            .collect())
    }
}

/// 全量车牌去重
///
/// 同一车型出现在多行时会生成相同车牌（车牌唯一约束），保留首次出现，
/// 后续重复记入跳过列表
///
/// # 参数
/// - vehicles: 按文件顺序解码的全部车辆
/// - source: 来源标识
/// - skipped: 跳过记录输出
pub fn dedupe_plates(
    vehicles: Vec<Vehicle>,
    source: &str,
    skipped: &mut Vec<SkippedLine>,
) -> Vec<Vehicle> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(vehicles.len());

    for vehicle in vehicles {
        if seen.insert(vehicle.plate.clone()) {
            unique.push(vehicle);
            continue;
        }

        let reason = SkipReason::DuplicatePlate(vehicle.plate.clone());
        warn!(plate = %vehicle.plate, source = source, "车牌重复，已丢弃");
        skipped.push(SkippedLine {
            source: source.to_string(),
            line_number: 0,
            line: vehicle.plate,
            reason: reason.to_string(),
        });
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_two_units() {
        let vehicles = VehicleDecoder::new().decode_line("TA,1.5,25,_,_,2").unwrap();

        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].plate, "TA01");
        assert_eq!(vehicles[1].plate, "TA02");
        for v in &vehicles {
            assert_eq!(v.category, "TA");
            assert_eq!(v.tare_kg, 1500);
            assert_eq!(v.cargo_capacity, 25.0);
            assert_eq!(v.cargo_level, 25.0);
        }
    }

    #[test]
    fn test_unit_count_yields_contiguous_plates() {
        let vehicles = VehicleDecoder::new().decode_line("TD,1.0,5,_,_,10").unwrap();
        let plates: Vec<_> = vehicles.iter().map(|v| v.plate.as_str()).collect();
        assert_eq!(plates.len(), 10);
        assert_eq!(plates.first(), Some(&"TD01"));
        assert_eq!(plates.last(), Some(&"TD10"));
        assert!(vehicles.iter().all(|v| v.tare_kg == 1000 && v.cargo_capacity == 5.0));
    }

    #[test]
    fn test_header_is_ignored_without_skip() {
        let d = VehicleDecoder::new();
        assert_eq!(d.decode_line("Tipo,Peso Tara,Carga GLP,Peso Carga,Peso Combinado,Unidades"), Ok(vec![]));

        let batch = d.decode_str("vehiculos.txt", "Tipo,Tara,GLP,_,_,Unidades\nTB,1.5,15,_,_,1\n");
        assert_eq!(batch.records.len(), 1);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_zero_units_yields_nothing() {
        let d = VehicleDecoder::new();
        assert_eq!(d.decode_line("TA,1.5,25,_,_,0"), Ok(vec![]));

        let batch = d.decode_str("vehiculos.txt", "TA,1.5,25,_,_,0\nTB,1.5,15,_,_,1\n");
        assert_eq!(batch.records.len(), 1);
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn test_invalid_lines() {
        let d = VehicleDecoder::new();
        assert!(matches!(
            d.decode_line("TA,1.5,25,_,2"),
            Err(SkipReason::FieldCount { actual: 5, .. })
        ));
        assert!(matches!(
            d.decode_line("TA,heavy,25,_,_,2"),
            Err(SkipReason::InvalidNumber { .. })
        ));
        assert!(matches!(
            d.decode_line("TA,1.5,25,_,_,-1"),
            Err(SkipReason::InvalidValue { .. })
        ));
        assert!(matches!(
            d.decode_line(",1.5,25,_,_,1"),
            Err(SkipReason::EmptyField(_))
        ));
    }

    #[test]
    fn test_dedupe_plates_keeps_first() {
        let d = VehicleDecoder::new();
        let mut all = d.decode_line("TA,2.5,25,_,_,2").unwrap();
        all.extend(d.decode_line("TA,1.0,10,_,_,1").unwrap());

        let mut skipped = Vec::new();
        let unique = dedupe_plates(all, "vehiculos.txt", &mut skipped);

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].tare_kg, 2500);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, "TA01");
    }
}
