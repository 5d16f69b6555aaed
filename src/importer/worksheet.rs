// ==========================================
// 路线表批量导入 - 工作表数据源适配器
// ==========================================
// 职责:
// - 丢弃非空单元格数不足阈值的行（阈值按原始整行计算，含占位列）
// - 丢弃表头为空或包含 "unnamed" 的占位列
// - 缺失值统一替换为同一个哨兵值
// - 在每行行首注入 Branch / ServiceDay / Route / ImportID
// 行序列可重复遍历，不维护外部游标
// ==========================================

use crate::domain::context::ImportContext;
use crate::domain::row::{Field, Row};
use crate::domain::types::{CellValue, MissingValue};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::Grid;

/// 工作表读取选项
#[derive(Debug, Clone, Copy)]
pub struct SheetOptions {
    pub min_non_null_cells: usize,
    pub missing_value: MissingValue,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            min_non_null_cells: 10,
            missing_value: MissingValue::Zero,
        }
    }
}

/// 表头是否为占位列
pub fn is_placeholder_header(header: &str) -> bool {
    let trimmed = header.trim();
    trimmed.is_empty() || trimmed.to_lowercase().contains("unnamed")
}

// ==========================================
// Worksheet - 单个工作表
// ==========================================
#[derive(Debug, Clone)]
pub struct Worksheet {
    file_path: String,
    sheet_name: String,
    columns: Vec<String>,
    records: Vec<Vec<CellValue>>,
    context: Option<ImportContext>,
}

impl Worksheet {
    /// 从原始二维表构建
    ///
    /// # 返回
    /// - Ok(Worksheet): 可能为空（无数据行或全部低于阈值）
    /// - Err(InvalidInput): 有数据行却没有任何表头单元格
    pub fn from_grid(
        file_path: &str,
        sheet_name: &str,
        grid: Grid,
        options: SheetOptions,
    ) -> ImportResult<Self> {
        let mut rows = grid.into_iter();

        let header: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .map(|cell| cell.to_text().unwrap_or_default().trim().to_string())
                .collect(),
            None => Vec::new(),
        };
        let data_rows: Vec<Vec<CellValue>> = rows.collect();

        if !data_rows.is_empty() && header.iter().all(|h| h.is_empty()) {
            return Err(ImportError::InvalidInput {
                sheet: sheet_name.to_string(),
                message: "缺少表头行".to_string(),
            });
        }

        let kept: Vec<usize> = header
            .iter()
            .enumerate()
            .filter(|(_, h)| !is_placeholder_header(h))
            .map(|(idx, _)| idx)
            .collect();

        let columns: Vec<String> = kept.iter().map(|&idx| header[idx].clone()).collect();
        let sentinel = options.missing_value.sentinel();

        let records: Vec<Vec<CellValue>> = data_rows
            .into_iter()
            .filter(|row| {
                row.iter().filter(|cell| !cell.is_missing()).count() >= options.min_non_null_cells
            })
            .map(|row| {
                kept.iter()
                    .map(|&idx| match row.get(idx) {
                        Some(cell) if !cell.is_missing() => cell.clone(),
                        _ => sentinel.clone(),
                    })
                    .collect()
            })
            .collect();

        // 表头全部为占位列但仍有合格行：无法形成任何字段
        if columns.is_empty() && !records.is_empty() {
            return Err(ImportError::InvalidInput {
                sheet: sheet_name.to_string(),
                message: "表头全部为占位列".to_string(),
            });
        }

        Ok(Self {
            file_path: file_path.to_string(),
            sheet_name: sheet_name.to_string(),
            columns,
            records,
            context: None,
        })
    }

    // ===== 出处 =====

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn set_file_path(&mut self, file_path: impl Into<String>) {
        self.file_path = file_path.into();
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn set_sheet_name(&mut self, sheet_name: impl Into<String>) {
        self.sheet_name = sheet_name.into();
    }

    // ===== 上下文 =====

    /// 附加导入上下文（之后产出的每一行行首带四个上下文字段）
    pub fn attach_context(&mut self, context: ImportContext) {
        self.context = Some(context);
    }

    pub fn context(&self) -> Option<&ImportContext> {
        self.context.as_ref()
    }

    // ===== 行访问 =====

    /// 保留下来的数据列（不含上下文列）
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 行序列（每次调用都从头开始）
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.records.len()).filter_map(move |idx| self.row(idx))
    }

    /// 第 idx 行
    pub fn row(&self, idx: usize) -> Option<Row> {
        let record = self.records.get(idx)?;

        let context_fields = self
            .context
            .as_ref()
            .map(|ctx| ctx.fields().to_vec())
            .unwrap_or_default();

        let data_fields = self
            .columns
            .iter()
            .zip(record.iter())
            .map(|(name, value)| Field::new(name.as_str(), value.clone()));

        Some(context_fields.into_iter().chain(data_fields).collect())
    }

    /// 定义列结构的样本行（第一行）
    pub fn first_row(&self) -> Option<Row> {
        self.row(0)
    }
}
