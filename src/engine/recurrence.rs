// ==========================================
// 车队数据装载系统 - 周期展开引擎
// ==========================================
// 职责: 将单条时间记录投影为多个日历实例
// 规则:
// - 保养: 每 2 个月一次，偏移 0, 2, ..., 22 个月（共 12 次）
// - 封路: 周期来源额外复制一条次年同月同日同时刻的记录
// 红线: 月份换算必须精确，不允许出现第 0 月 / 第 13 月
// ==========================================

use crate::domain::fleet::{maintenance_window, Blockage, Maintenance};
use crate::domain::types::Recurrence;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

/// 保养周期步长（月）
pub const MAINTENANCE_STEP_MONTHS: u32 = 2;

/// 保养展开跨度（月，含）
pub const MAINTENANCE_SPAN_MONTHS: u32 = 22;

/// 月份偏移
///
/// # 规则
/// - count = (month - 1) + offset（0 起始累计月数）
/// - 目标年 = year + count / 12
/// - 目标月 = count % 12 + 1
///
/// # 参数
/// - month: 1..=12
pub fn shift_month(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let count = (month - 1) + offset;
    (year + (count / 12) as i32, count % 12 + 1)
}

/// 某月最后一天
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// 日期按月偏移，日号超出目标月时取月末
pub fn shift_date(date: NaiveDate, offset_months: u32) -> Option<NaiveDate> {
    let (year, month) = shift_month(date.year(), date.month(), offset_months);
    let day = date.day().min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// 时刻按月偏移（时分不变）
pub fn shift_datetime(value: NaiveDateTime, offset_months: u32) -> Option<NaiveDateTime> {
    shift_date(value.date(), offset_months).map(|d| d.and_time(value.time()))
}

// ==========================================
// RecurrenceExpander - 周期展开器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceExpander {
    step_months: u32,
    span_months: u32,
}

impl Default for RecurrenceExpander {
    fn default() -> Self {
        Self {
            step_months: MAINTENANCE_STEP_MONTHS,
            span_months: MAINTENANCE_SPAN_MONTHS,
        }
    }
}

impl RecurrenceExpander {
    /// 保养偏移序列: 0, step, 2*step, ..., <= span
    pub fn offsets(&self) -> impl Iterator<Item = u32> {
        (0..=self.span_months).step_by(self.step_months as usize)
    }

    /// 展开保养记录
    ///
    /// # 说明
    /// - 每个实例起始于目标日 00:00（沿用原记录时刻），结束 = 起始 + 23h59m
    /// - Once: 原样返回一条
    pub fn expand_maintenance(
        &self,
        maintenance: &Maintenance,
        recurrence: Recurrence,
    ) -> Vec<Maintenance> {
        if recurrence == Recurrence::Once {
            return vec![maintenance.clone()];
        }

        self.offsets()
            .filter_map(|offset| {
                let start = shift_datetime(maintenance.start, offset)?;
                Some(Maintenance {
                    vehicle_id: maintenance.vehicle_id,
                    start,
                    end: start + maintenance_window(),
                })
            })
            .collect()
    }

    /// 展开封路记录
    ///
    /// # 说明
    /// - Periodic: 原记录 + 次年同一时刻的复制，顶点完全相同
    /// - 复制后若起止不再递增（2 月 29 日收缩到 28 日），丢弃该复制
    pub fn expand_blockage(&self, blockage: &Blockage, recurrence: Recurrence) -> Vec<Blockage> {
        let mut out = vec![blockage.clone()];
        if recurrence == Recurrence::Once {
            return out;
        }

        let shifted = shift_datetime(blockage.start, 12)
            .zip(shift_datetime(blockage.end, 12))
            .filter(|(start, end)| start < end);

        match shifted {
            Some((start, end)) => out.push(Blockage {
                start,
                end,
                vertices: blockage.vertices.clone(),
            }),
            None => warn!(
                start = %blockage.start,
                end = %blockage.end,
                "次年封路复制无效，已丢弃"
            ),
        }
        out
    }
}
