// ==========================================
// 路线表批量导入 - 导入上下文仓储
// ==========================================
// 职责: 读取"最近一次导入"视图，解析本次运行共享的 ImportID
// 红线: 每次运行只解析一次（由 RunContext::establish 保证）
// ==========================================

use crate::config::ImportIdSource;
use crate::domain::context::ImportId;
use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::sql_builder::build_select_statement;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::{debug, info, warn};

pub struct ImportContextRepository<'a> {
    conn: &'a Connection,
}

fn value_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(f) => CellValue::Number(f),
        ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => CellValue::Text(format!("<blob {} bytes>", b.len())),
    }
}

impl<'a> ImportContextRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 通用查询: SELECT {columns} FROM {table}
    ///
    /// 未指定列时投影为 `*` 并带默认 LIMIT 100
    pub fn select_data_from_table(
        &self,
        columns: Option<&[&str]>,
        table: &str,
    ) -> ImportResult<Vec<Vec<CellValue>>> {
        let sql = build_select_statement(columns, table, None);
        debug!(sql = %sql, "查询");

        let mut stmt = self.conn.prepare(&sql)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|idx| row.get_ref(idx).map(value_from_ref))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }

    /// 获取当前 ImportID
    ///
    /// # 返回
    /// - Ok(ImportId): 第一行第一列的整数值
    /// - Err(ContextResolutionFailed): 视图不存在 / 无数据 / 值不是整数
    /// - Err(ConnectionLost): 连接不可用
    pub fn fetch_current_import_id(&self, source: &ImportIdSource) -> ImportResult<ImportId> {
        let columns = [source.column.as_str()];
        let rows = self
            .select_data_from_table(Some(&columns[..]), &source.table)
            .map_err(|e| match e {
                ImportError::ConnectionLost(_) => e,
                other => ImportError::ContextResolutionFailed(other.to_string()),
            })?;

        if rows.len() > 1 {
            warn!(table = %source.table, rows = rows.len(), "ImportID 来源返回多行，取第一行");
        }

        let value = rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .ok_or_else(|| {
                ImportError::ContextResolutionFailed(format!("{} 中没有 ImportID", source.table))
            })?;

        let import_id = match &value {
            CellValue::Integer(i) => Some(*i),
            CellValue::Number(f) if f.fract() == 0.0 => Some(*f as i64),
            CellValue::Text(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            ImportError::ContextResolutionFailed(format!("ImportID 不是整数: {:?}", value))
        })?;

        info!(import_id = import_id, "已获取本次运行的 ImportID");
        Ok(ImportId::new(import_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with_view(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_fetch_import_id_from_view() {
        let conn = conn_with_view(
            r#"
            CREATE TABLE Imports (ImportID INTEGER PRIMARY KEY, CreatedAt TEXT);
            INSERT INTO Imports (ImportID, CreatedAt) VALUES (41, '2023-09-01'), (42, '2023-09-08');
            CREATE VIEW MostRecentImport AS SELECT MAX(ImportID) AS ImportID FROM Imports;
            "#,
        );
        let repo = ImportContextRepository::new(&conn);
        let id = repo.fetch_current_import_id(&ImportIdSource::default()).unwrap();
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_missing_view_is_context_resolution_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let repo = ImportContextRepository::new(&conn);
        let err = repo
            .fetch_current_import_id(&ImportIdSource::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::ContextResolutionFailed(_)));
        assert!(err.is_run_fatal());
    }

    #[test]
    fn test_empty_view_is_context_resolution_failure() {
        let conn = conn_with_view("CREATE TABLE MostRecentImport (ImportID INTEGER);");
        let repo = ImportContextRepository::new(&conn);
        assert!(matches!(
            repo.fetch_current_import_id(&ImportIdSource::default()),
            Err(ImportError::ContextResolutionFailed(_))
        ));
    }

    #[test]
    fn test_text_import_id_is_parsed() {
        let conn = conn_with_view(
            "CREATE TABLE MostRecentImport (ImportID TEXT); INSERT INTO MostRecentImport VALUES (' 7 ');",
        );
        let repo = ImportContextRepository::new(&conn);
        assert_eq!(
            repo.fetch_current_import_id(&ImportIdSource::default())
                .unwrap()
                .value(),
            7
        );
    }

    #[test]
    fn test_select_default_projection_is_capped() {
        let conn = conn_with_view(
            r#"
            CREATE TABLE Big (n INTEGER);
            WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 150)
            INSERT INTO Big SELECT n FROM seq;
            "#,
        );
        let repo = ImportContextRepository::new(&conn);
        let rows = repo.select_data_from_table(None, "Big").unwrap();
        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0], vec![CellValue::Integer(1)]);
    }
}
