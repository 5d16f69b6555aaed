// ==========================================
// 路线表批量导入 - 领域层
// ==========================================
// 职责: 行结构、单元格值、导入上下文、导入结果
// 红线: 不依赖数据库，不包含 I/O
// ==========================================

pub mod context;
pub mod outcome;
pub mod row;
pub mod types;

// 重导出核心类型
pub use context::{ImportContext, ImportId, CONTEXT_COLUMNS};
pub use outcome::{LoadOutcome, LoadReport, MaintenanceOutcome, SheetOutcome};
pub use row::{Field, Row};
pub use types::{Branch, CellValue, MissingValue, ServiceDay};
