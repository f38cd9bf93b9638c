// ==========================================
// 车队数据装载系统 - 时间串解析
// ==========================================
// 格式: DDdHHhMMm（如 11d13h31m）
// 时间串不含年月，由调用方提供锚定年月
// ==========================================

use crate::domain::types::PeriodAnchor;
use crate::importer::error::SkipReason;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})d(\d{1,2})h(\d{1,2})m$").expect("时间串正则无效")
});

/// 日/时/分三元组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeToken {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

impl TimeToken {
    /// 解析 DDdHHhMMm
    pub fn parse(token: &str) -> Result<Self, SkipReason> {
        let token = token.trim();
        let caps = TIME_TOKEN_RE
            .captures(token)
            .ok_or_else(|| SkipReason::InvalidTimeToken(token.to_string()))?;

        // 正则已保证 1-2 位数字
        let num = |i: usize| -> Result<u32, SkipReason> {
            caps[i]
                .parse()
                .map_err(|_| SkipReason::InvalidTimeToken(token.to_string()))
        };

        Ok(Self {
            day: num(1)?,
            hour: num(2)?,
            minute: num(3)?,
        })
    }

    /// 锚定到指定年月
    pub fn anchor(&self, anchor: PeriodAnchor) -> Result<NaiveDateTime, SkipReason> {
        anchor
            .at(self.day, self.hour, self.minute)
            .ok_or_else(|| SkipReason::DateOutOfPeriod {
                token: self.to_string(),
                anchor: anchor.to_string(),
            })
    }
}

impl std::fmt::Display for TimeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}d{:02}h{:02}m", self.day, self.hour, self.minute)
    }
}

/// 解析并锚定
pub fn parse_anchored(token: &str, anchor: PeriodAnchor) -> Result<NaiveDateTime, SkipReason> {
    TimeToken::parse(token)?.anchor(anchor)
}
