// ==========================================
// 车队数据装载系统 - 字段清洗
// ==========================================
// 职责: 去单位后缀 / 数值转换 / YYYYMMDD 日期解析
// 失败一律返回 SkipReason，由解码器决定跳过该行
// ==========================================

use crate::importer::error::SkipReason;
use chrono::NaiveDate;

/// 去掉单位后缀（如 "3m3" → "3"，"4h" → "4"）
///
/// 无后缀时原样返回（已 TRIM）
pub fn strip_unit<'a>(value: &'a str, unit: &str) -> &'a str {
    let trimmed = value.trim();
    trimmed.strip_suffix(unit).unwrap_or(trimmed).trim()
}

/// 解析整数字段
pub fn parse_i32(field: &str, value: &str) -> Result<i32, SkipReason> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| SkipReason::invalid_number(field, value))
}

/// 解析非负整数字段
pub fn parse_u32(field: &str, value: &str) -> Result<u32, SkipReason> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| SkipReason::invalid_number(field, value))
}

/// 解析浮点字段（拒绝 NaN / inf）
pub fn parse_f64(field: &str, value: &str) -> Result<f64, SkipReason> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|_| SkipReason::invalid_number(field, value))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(SkipReason::invalid_value(field, value))
    }
}

/// 解析日期（YYYYMMDD → NaiveDate）
///
/// 必须恰好 8 位数字，且为合法日历日
pub fn parse_date_yyyymmdd(value: &str) -> Result<NaiveDate, SkipReason> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SkipReason::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|_| SkipReason::InvalidDate(value.to_string()))
}

/// 吨 → 千克（四舍五入，避免 2.3 * 1000 = 2299.999…）
pub fn tonnes_to_kg(tonnes: f64) -> Option<i32> {
    let kg = (tonnes * 1000.0).round();
    if kg.is_finite() && kg >= 0.0 && kg <= f64::from(i32::MAX) {
        Some(kg as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_unit() {
        assert_eq!(strip_unit("3m3", "m3"), "3");
        assert_eq!(strip_unit(" 4h ", "h"), "4");
        assert_eq!(strip_unit("12", "m3"), "12");
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_i32("x", " 13 "), Ok(13));
        assert_eq!(parse_i32("x", "-4"), Ok(-4));
        assert!(parse_i32("x", "1.5").is_err());
        assert!(parse_u32("n", "-1").is_err());
        assert_eq!(parse_f64("t", "1.5"), Ok(1.5));
        assert!(parse_f64("t", "NaN").is_err());
        assert!(parse_f64("t", "abc").is_err());
    }

    #[test]
    fn test_parse_date_yyyymmdd() {
        assert_eq!(
            parse_date_yyyymmdd("20250503"),
            Ok(NaiveDate::from_ymd_opt(2025, 5, 3).unwrap())
        );
        assert!(parse_date_yyyymmdd("2025053").is_err());
        assert!(parse_date_yyyymmdd("20250230").is_err());
        assert!(parse_date_yyyymmdd("2025-5-3").is_err());
        assert!(parse_date_yyyymmdd("abcdefgh").is_err());
    }

    #[test]
    fn test_tonnes_to_kg() {
        assert_eq!(tonnes_to_kg(1.5), Some(1500));
        assert_eq!(tonnes_to_kg(2.3), Some(2300));
        assert_eq!(tonnes_to_kg(-1.0), None);
    }
}
