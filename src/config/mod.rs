// ==========================================
// 路线表批量导入 - 配置层
// ==========================================
// 职责: 运行配置加载与校验（目标表、字段映射、阈值、维护语句）
// 存储: JSON 配置文件
// ==========================================

pub mod etl_config;
pub mod field_map;

// 重导出核心配置类型
pub use etl_config::{EtlConfig, EtlConfigFile, ImportIdSource, MaintenanceStep};
pub use field_map::{FieldMap, UnmappedFieldPolicy};
