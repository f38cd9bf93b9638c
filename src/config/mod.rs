// ==========================================
// 车队数据装载系统 - 配置层
// ==========================================
// 职责: 装载配置的加载、默认值与校验
// ==========================================

pub mod ingest_config;

pub use ingest_config::{
    get_default_db_path, FileNaming, IngestConfig, LogFormat, RecurrenceSettings,
};
