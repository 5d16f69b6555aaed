// ==========================================
// 路线表批量导入 - 导入层
// ==========================================
// 职责: 工作簿 → 工作表 → 行 → 映射清洗 → 批次提交
// 支持: Excel (.xls/.xlsx/.xlsm/.xlsb), CSV
// ==========================================

pub mod batch_stager;
pub mod data_cleaner;
pub mod derivation;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod routesheet_loader;
pub mod run_context;
pub mod worksheet;

// 重导出核心类型
pub use batch_stager::BatchStager;
pub use derivation::DerivationService;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{BoundColumn, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use routesheet_loader::RoutesheetLoader;
pub use run_context::RunContext;
pub use worksheet::{SheetOptions, Worksheet};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, Grid, RawSheet};
