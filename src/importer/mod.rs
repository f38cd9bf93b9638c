// ==========================================
// 车队数据装载系统 - 导入层
// ==========================================
// 职责: 输入文件发现与逐行解码
// 支持: 订单 / 车辆 / 仓库 / 故障 / 封路 / 保养 六类文本格式
// 红线: 单行错误只跳过，不向调用方抛出
// ==========================================

// 模块声明
pub mod blockage_decoder;
pub mod data_cleaner;
pub mod error;
pub mod failure_decoder;
pub mod file_discovery;
pub mod file_parser;
pub mod line_decoder;
pub mod maintenance_decoder;
pub mod order_decoder;
pub mod time_token;
pub mod vehicle_decoder;
pub mod warehouse_decoder;

// 重导出核心类型
pub use blockage_decoder::BlockageDecoder;
pub use error::{ImportError, ImportResult, SkipReason};
pub use failure_decoder::FailureDecoder;
pub use file_discovery::{discover_inputs, InputFile};
pub use line_decoder::{DecodeBatch, LineDecoder, LineOutcome};
pub use maintenance_decoder::MaintenanceDecoder;
pub use order_decoder::OrderDecoder;
pub use vehicle_decoder::VehicleDecoder;
pub use warehouse_decoder::WarehouseDecoder;
