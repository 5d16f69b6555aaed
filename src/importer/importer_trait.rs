// ==========================================
// 路线表批量导入 - 导入层接口
// ==========================================
// 职责: 定义文件读取接口（不包含实现）
// 实现者: ExcelParser / CsvParser / UniversalFileParser
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::error::ImportResult;
use std::path::Path;

/// 原始二维表（第一行为表头）
pub type Grid = Vec<Vec<CellValue>>;

/// 工作簿中的单个工作表
///
/// 单个工作表读取失败不影响同一工作簿中的其他工作表
#[derive(Debug)]
pub struct RawSheet {
    pub name: String,
    pub grid: ImportResult<Grid>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid: Ok(grid),
        }
    }
}

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 读取工作簿中的全部工作表（保持工作簿内顺序）
    ///
    /// # 返回
    /// - Ok(Vec<RawSheet>): 每个工作表的读取结果
    /// - Err: 文件无法打开（整个文件判定失败）
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>>;
}
