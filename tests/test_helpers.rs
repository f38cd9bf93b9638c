// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、输入目录构造、表计数
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use fleet_data_loader::config::IngestConfig;
use fleet_data_loader::db;
use fleet_data_loader::repository::SqliteStore;
use rusqlite::Connection;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试存储
pub fn open_store(db_path: &str) -> Arc<SqliteStore> {
    Arc::new(SqliteStore::new(db_path).expect("Failed to open SqliteStore"))
}

/// 创建输入目录并写入文件
///
/// # 参数
/// - files: (文件名, 内容)
pub fn create_data_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (name, content) in files {
        write_input(dir.path(), name, content);
    }
    dir
}

pub fn write_input(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("Failed to write input file");
}

/// 测试配置（固定运行日期，便于断言）
pub fn test_config(db_path: &str, data_dir: &Path) -> IngestConfig {
    IngestConfig {
        db_path: db_path.to_string(),
        data_dir: data_dir.to_path_buf(),
        run_date: Some(test_run_date()),
        ..IngestConfig::default()
    }
}

pub fn test_run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 3).unwrap()
}

/// 表行数
pub fn count_table(db_path: &str, table: &str) -> i64 {
    let conn = Connection::open(db_path).expect("Failed to open db");
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .expect("Failed to count rows")
}

/// 查询单列文本
pub fn query_strings(db_path: &str, sql: &str) -> Vec<String> {
    let conn = Connection::open(db_path).expect("Failed to open db");
    let mut stmt = conn.prepare(sql).expect("Failed to prepare");
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .expect("Failed to query");
    rows.map(|r| r.expect("Failed to read row")).collect()
}
