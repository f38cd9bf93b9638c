// ==========================================
// 车队数据装载系统 - 输入文件发现
// ==========================================
// 职责: 扫描输入目录，为每类实体确定输入文件及锚定年月
// 规则:
// - 周期类: <prefix><YYYY><MM>.<ext>，年月即锚点
// - 周期类: <prefix>.<ext>，使用默认锚点
// - 固定类: 固定文件名，不存在时仍列出（读取时报 FileNotFound）
// - 月份不在 1..=12 的文件忽略并告警
// ==========================================

use crate::config::ingest_config::FileNaming;
use crate::domain::types::{EntityKind, PeriodAnchor};
use crate::importer::error::{ImportError, ImportResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

static PERIOD_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_-]+?)(\d{6})?\.([A-Za-z0-9]+)$").expect("周期文件名正则无效")
});

/// 一个待解码的输入文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub kind: EntityKind,
    pub path: PathBuf,
    pub anchor: PeriodAnchor,
}

/// 文件名匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodMatch {
    /// 携带合法年月
    Dated(PeriodAnchor),
    /// 无年月
    Undated,
    /// 年月不合法（如第 13 月）
    InvalidPeriod(String),
}

/// 按前缀匹配周期类文件名
///
/// # 返回
/// - None: 文件名不属于该前缀
pub fn match_period_file(file_name: &str, prefix: &str) -> Option<PeriodMatch> {
    let caps = PERIOD_FILE_RE.captures(file_name)?;
    if &caps[1] != prefix {
        return None;
    }

    Some(match caps.get(2) {
        None => PeriodMatch::Undated,
        Some(period) => match PeriodAnchor::parse_yyyymm(period.as_str()) {
            Some(anchor) => PeriodMatch::Dated(anchor),
            None => PeriodMatch::InvalidPeriod(period.as_str().to_string()),
        },
    })
}

/// 扫描输入目录
///
/// # 参数
/// - data_dir: 输入目录
/// - naming: 文件命名配置
/// - default_anchor: 无年月文件的锚点
///
/// # 返回
/// - 按 (种类, 锚点, 路径) 排序的输入文件列表
/// - Err(DirectoryReadError): 目录不可读
pub fn discover_inputs(
    data_dir: &Path,
    naming: &FileNaming,
    default_anchor: PeriodAnchor,
) -> ImportResult<Vec<InputFile>> {
    let entries = fs::read_dir(data_dir).map_err(|e| ImportError::DirectoryReadError {
        path: data_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut file_names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            file_names.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    let mut inputs = Vec::new();

    for kind in EntityKind::PURGE_ORDER {
        if let Some(name) = naming.fixed_name_for(kind) {
            inputs.push(InputFile {
                kind,
                path: data_dir.join(name),
                anchor: default_anchor,
            });
            continue;
        }

        let Some(prefix) = naming.prefix_for(kind) else {
            continue;
        };

        for file_name in &file_names {
            match match_period_file(file_name, prefix) {
                Some(PeriodMatch::Dated(anchor)) => inputs.push(InputFile {
                    kind,
                    path: data_dir.join(file_name),
                    anchor,
                }),
                Some(PeriodMatch::Undated) => inputs.push(InputFile {
                    kind,
                    path: data_dir.join(file_name),
                    anchor: default_anchor,
                }),
                Some(PeriodMatch::InvalidPeriod(period)) => {
                    warn!(kind = %kind, file = %file_name, period = %period, "文件名年月无效，已忽略");
                }
                None => {}
            }
        }
    }

    inputs.sort_by(|a, b| {
        (a.kind, a.anchor, &a.path).cmp(&(b.kind, b.anchor, &b.path))
    });

    debug!(data_dir = %data_dir.display(), files = inputs.len(), "输入文件发现完成");
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_match_period_file() {
        assert_eq!(
            match_period_file("orders202501.csv", "orders"),
            Some(PeriodMatch::Dated(PeriodAnchor::new(2025, 1).unwrap()))
        );
        assert_eq!(
            match_period_file("orders.txt", "orders"),
            Some(PeriodMatch::Undated)
        );
        assert_eq!(
            match_period_file("orders202513.csv", "orders"),
            Some(PeriodMatch::InvalidPeriod("202513".to_string()))
        );
        assert_eq!(match_period_file("blockages202501.csv", "orders"), None);
        assert_eq!(match_period_file("orders20251.csv", "orders"), None);
        assert_eq!(match_period_file("orders202501", "orders"), None);
    }

    #[test]
    fn test_discover_inputs() {
        let dir = tempdir().unwrap();
        for name in [
            "orders202502.csv",
            "orders202501.csv",
            "orders202500.csv",
            "blockages.csv",
            "maintenances.csv",
            "vehicles.csv",
            "notes.md",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let default_anchor = PeriodAnchor::new(2025, 1).unwrap();
        let inputs = discover_inputs(dir.path(), &FileNaming::default(), default_anchor).unwrap();

        let orders: Vec<_> = inputs.iter().filter(|f| f.kind == EntityKind::Order).collect();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].anchor, PeriodAnchor::new(2025, 1).unwrap());
        assert_eq!(orders[1].anchor, PeriodAnchor::new(2025, 2).unwrap());

        let blockages: Vec<_> = inputs.iter().filter(|f| f.kind == EntityKind::Blockage).collect();
        assert_eq!(blockages.len(), 1);
        assert_eq!(blockages[0].anchor, default_anchor);

        // 固定类即使不存在也列出
        assert!(inputs
            .iter()
            .any(|f| f.kind == EntityKind::Warehouse && f.path.ends_with("warehouses.csv")));
        assert!(inputs.iter().any(|f| f.kind == EntityKind::Failure));
    }

    #[test]
    fn test_discover_missing_directory() {
        let result = discover_inputs(
            Path::new("definitely_missing_dir"),
            &FileNaming::default(),
            PeriodAnchor::default(),
        );
        assert!(matches!(result, Err(ImportError::DirectoryReadError { .. })));
    }
}
