// ==========================================
// 路线表批量导入 - 数据仓储层
// ==========================================
// 职责: 目标库访问（上下文解析、维护语句、SQL 构建）
// 约束: 值一律参数绑定；配置中的标识符加载时校验，所有标识符引用时转义
// ==========================================

pub mod import_context_repo;
pub mod maintenance_repo;
pub mod sql_builder;

pub use import_context_repo::ImportContextRepository;
pub use maintenance_repo::MaintenanceRepository;
