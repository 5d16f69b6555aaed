// ==========================================
// 路线表批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略: 工作表级错误在工作表边界内消化，
//           仅连接丢失 / ImportID 解析失败允许中止整个运行
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.xlsm/.xlsb/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 工作表结构错误 =====
    #[error("工作表数据无效 ({sheet}): {message}")]
    InvalidInput { sheet: String, message: String },

    // ===== 字段映射错误 =====
    #[error("字段映射缺失 ({sheet}): 未配置的列 {fields:?}")]
    MappingGap { sheet: String, fields: Vec<String> },

    // ===== 数据库错误 =====
    #[error("批量插入失败 (表 {table}, {row_count} 行): {message}")]
    BatchInsertFailed {
        table: String,
        statement: String,
        row_count: usize,
        rows: Vec<Vec<Option<String>>>,
        message: String,
    },

    #[error("ImportID 获取失败: {0}")]
    ContextResolutionFailed(String),

    #[error("数据库连接丢失: {0}")]
    ConnectionLost(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("维护语句执行失败 ({name}): {message}")]
    MaintenanceFailed { name: String, message: String },

    // ===== 配置错误 =====
    #[error("配置错误: {0}")]
    ConfigError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否必须中止整个运行
    ///
    /// 工作表级错误（InvalidInput / MappingGap / BatchInsertFailed 等）只影响当前工作表
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            ImportError::ConnectionLost(_) | ImportError::ContextResolutionFailed(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        if crate::db::is_connection_error(&err) {
            ImportError::ConnectionLost(err.to_string())
        } else {
            ImportError::DatabaseQueryError(err.to_string())
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ConfigError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
