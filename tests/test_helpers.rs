// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时目标库、测试配置、CSV 夹具、内存工作簿解析器
// ==========================================

#![allow(dead_code)]

use routesheet_etl::config::{EtlConfig, FieldMap};
use routesheet_etl::domain::CellValue;
use routesheet_etl::importer::{FileParser, Grid, ImportError, ImportResult, RawSheet};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 测试视图中的 ImportID
pub const TEST_IMPORT_ID: i64 = 42;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 初始化目标表与"最近一次导入"视图
pub fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS Imports (
            ImportID INTEGER PRIMARY KEY,
            CreatedAt TEXT NOT NULL DEFAULT (datetime('now'))
        );
        INSERT OR IGNORE INTO Imports (ImportID) VALUES ({prev}), ({id});
        CREATE VIEW IF NOT EXISTS MostRecentImport AS
            SELECT MAX(ImportID) AS ImportID FROM Imports;

        CREATE TABLE IF NOT EXISTS RouteStops (
            Branch TEXT,
            ServiceDay TEXT,
            Route TEXT,
            ImportID INTEGER,
            Latitude TEXT NOT NULL,
            Longitude TEXT,
            StopNumber TEXT
        );
        "#,
        prev = TEST_IMPORT_ID - 1,
        id = TEST_IMPORT_ID,
    ))?;
    Ok(())
}

/// 测试配置: Lat/Lon/Stop 三列映射，阈值 2
pub fn test_config() -> EtlConfig {
    let field_map = FieldMap::new([
        ("Lat", "Latitude"),
        ("Lon", "Longitude"),
        ("Stop", "StopNumber"),
    ])
    .expect("valid field map");
    let mut config = EtlConfig::with_field_map("RouteStops", field_map).expect("valid config");
    config.min_non_null_cells = 2;
    config
}

/// 在目录下写入 CSV 夹具
pub fn write_csv(dir: &Path, name: &str, rows: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create csv fixture");
    for row in rows {
        writeln!(file, "{}", row.join(",")).expect("write csv fixture");
    }
    path
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |r| r.get(0))
        .expect("count rows")
}

pub fn text(s: &str) -> CellValue {
    CellValue::from(s)
}

/// 由字符串切片构建二维表，空串视为空单元格
pub fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    if cell.is_empty() {
                        CellValue::Null
                    } else {
                        text(cell)
                    }
                })
                .collect()
        })
        .collect()
}

// ==========================================
// InMemoryWorkbooks - 内存工作簿解析器
// ==========================================
// 以文件名为键，返回预先登记的工作表；未登记的文件视为无法打开
// 工作表内容为 Err 时，读取该表报告连接丢失
#[derive(Default)]
pub struct InMemoryWorkbooks {
    workbooks: HashMap<String, Vec<(String, Result<Grid, String>)>>,
}

impl InMemoryWorkbooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, file_name: &str, sheet_name: &str, grid: Grid) -> Self {
        self.push(file_name, sheet_name, Ok(grid))
    }

    /// 登记一个读取时连接丢失的工作表
    pub fn with_lost_connection(self, file_name: &str, sheet_name: &str, message: &str) -> Self {
        self.push(file_name, sheet_name, Err(message.to_string()))
    }

    fn push(mut self, file_name: &str, sheet_name: &str, grid: Result<Grid, String>) -> Self {
        self.workbooks
            .entry(file_name.to_string())
            .or_default()
            .push((sheet_name.to_string(), grid));
        self
    }
}

impl FileParser for InMemoryWorkbooks {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.workbooks
            .get(&file_name)
            .map(|sheets| {
                sheets
                    .iter()
                    .map(|(name, grid)| RawSheet {
                        name: name.clone(),
                        grid: grid
                            .clone()
                            .map_err(|msg| ImportError::ConnectionLost(msg.clone())),
                    })
                    .collect()
            })
            .ok_or_else(|| ImportError::FileNotFound(file_path.display().to_string()))
    }
}
