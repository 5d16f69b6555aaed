// ==========================================
// 路线表批量导入 - 导入上下文
// ==========================================
// ImportID: 每次运行获取一次，本次运行所有工作表共享
// ImportContext: 每个工作表派生一次，附加到该表每一行
// ==========================================

use crate::domain::row::Field;
use crate::domain::types::{Branch, CellValue, ServiceDay};
use serde::Serialize;
use std::fmt;

/// 上下文列名（固定注入顺序）
pub const COLUMN_BRANCH: &str = "Branch";
pub const COLUMN_SERVICE_DAY: &str = "ServiceDay";
pub const COLUMN_ROUTE: &str = "Route";
pub const COLUMN_IMPORT_ID: &str = "ImportID";

pub const CONTEXT_COLUMNS: [&str; 4] = [
    COLUMN_BRANCH,
    COLUMN_SERVICE_DAY,
    COLUMN_ROUTE,
    COLUMN_IMPORT_ID,
];

/// 本次运行的批次标识
///
/// 只能由 ImportContextRepository 从数据库解析得到
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImportId(i64);

impl ImportId {
    pub(crate) fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ImportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 单个工作表的导入上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportContext {
    pub import_id: ImportId,
    pub route: String,
    pub branch: Branch,
    pub service_day: ServiceDay,
}

impl ImportContext {
    /// 注入到行首的四个上下文字段: Branch, ServiceDay, Route, ImportID
    pub fn fields(&self) -> [Field; 4] {
        [
            Field::new(COLUMN_BRANCH, self.branch.code()),
            Field::new(COLUMN_SERVICE_DAY, self.service_day.name()),
            Field::new(COLUMN_ROUTE, self.route.as_str()),
            Field::new(COLUMN_IMPORT_ID, CellValue::Integer(self.import_id.value())),
        ]
    }
}
