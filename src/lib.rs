// ==========================================
// 路线表批量导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite (rusqlite) + calamine
// 系统定位: 将一批路线表工作簿清洗、打标后批量写入目标表
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 行、上下文与运行报告
pub mod domain;

// 数据仓储层 - 目标库访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行配置与字段映射
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 运行耗时与 SQL 统计
pub mod perf;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{EtlConfig, FieldMap, UnmappedFieldPolicy};
pub use domain::{
    Branch, CellValue, Field, ImportContext, ImportId, LoadOutcome, LoadReport, MissingValue,
    Row, ServiceDay, SheetOutcome,
};
pub use importer::{ImportError, ImportResult, RoutesheetLoader, RunContext};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "路线表批量导入工具";
