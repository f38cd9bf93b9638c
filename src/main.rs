// ==========================================
// 车队数据装载系统 - 命令行入口
// ==========================================
// 用法: fleet-data-loader [config.json]
// 输出: 运行报告（JSON，stdout）；失败时退出码 1
// ==========================================

use anyhow::Context;
use fleet_data_loader::{db, logging, IngestConfig, LoadOrchestrator, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => IngestConfig::from_json_file(&PathBuf::from(&path))
            .with_context(|| format!("加载配置失败: {}", path))?,
        None => IngestConfig::default(),
    };

    logging::init_with_format(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", fleet_data_loader::APP_NAME, fleet_data_loader::VERSION);
    tracing::info!("==================================================");
    tracing::info!(db_path = %config.db_path, "使用数据库");

    db::ensure_parent_dir(&config.db_path)
        .with_context(|| format!("创建数据库目录失败: {}", config.db_path))?;
    let conn = db::open_sqlite_connection(&config.db_path)
        .with_context(|| format!("打开数据库失败: {}", config.db_path))?;
    db::init_schema(&conn).context("初始化数据库结构失败")?;

    let store = Arc::new(SqliteStore::from_connection(Arc::new(std::sync::Mutex::new(conn))));
    let orchestrator = LoadOrchestrator::new(store, config);

    let report = orchestrator.run_full_load().await.context("装载运行失败")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("序列化运行报告失败")?
    );

    if !report.is_success() {
        tracing::error!(run_id = %report.run_id, "装载失败");
        std::process::exit(1);
    }
    Ok(())
}
