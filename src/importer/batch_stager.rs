// ==========================================
// 路线表批量导入 - 插入批次暂存器
// ==========================================
// 职责: 暂存已清洗的行 → 按样本行生成一次 INSERT → 整批事务提交
// 约束:
// - 提交后（无论成败）暂存区清空，连接的 autocommit 状态与提交前一致
// - 同一时刻只有一个批次在途（&mut self 保证）
// ==========================================

use crate::domain::row::Row;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::repository::sql_builder::build_insert_statement;
use rusqlite::{params_from_iter, Connection};
use std::collections::HashSet;
use tracing::{debug, error, info};

const BATCH_SAVEPOINT: &str = "routesheet_batch";

pub struct BatchStager {
    mapper: FieldMapper,
    pending: Vec<Vec<Option<String>>>,
    // 第一条暂存行，定义本批次的字段顺序
    shape: Option<Row>,
    // 第一条字段顺序不一致的暂存行（从 0 开始）
    misaligned: Option<usize>,
}

impl BatchStager {
    pub fn new(mapper: FieldMapper) -> Self {
        Self {
            mapper,
            pending: Vec::new(),
            shape: None,
            misaligned: None,
        }
    }

    pub fn mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    /// 暂存一行（仅清洗，不访问数据库）
    ///
    /// 字段顺序与本批次第一行不一致的行照常暂存，提交时整批判定失败
    pub fn stage(&mut self, row: &Row) {
        match &self.shape {
            None => self.shape = Some(row.clone()),
            Some(shape) if self.misaligned.is_none() && !shape.same_shape(row) => {
                self.misaligned = Some(self.pending.len());
            }
            Some(_) => {}
        }
        self.pending.push(self.mapper.scrub_values(row));
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// 提交暂存批次
    ///
    /// # 参数
    /// - conn: 本次运行共享的连接
    /// - sample: 定义列结构的样本行（通常为第一行）
    /// - table: 目标表
    ///
    /// # 返回
    /// - Ok(n): 写入行数（暂存区为空时为 0，不发出任何语句）
    /// - Err(BatchInsertFailed): 整批已回滚
    /// - Err(ConnectionLost): 连接不可用
    pub fn commit(&mut self, conn: &Connection, sample: &Row, table: &str) -> ImportResult<usize> {
        let rows = std::mem::take(&mut self.pending);
        let shape = self.shape.take();
        let misaligned = self.misaligned.take();
        if rows.is_empty() {
            return Ok(0);
        }

        let columns = self.mapper.map_field_names(sample);
        let statement = build_insert_statement(table, &columns);
        debug!(sql = %statement, rows = rows.len(), "批量插入语句");

        let alignment = match (shape, misaligned) {
            (_, Some(idx)) => Err(format!("第 {} 行的字段顺序与第 1 行不一致", idx + 1)),
            (Some(shape), None) if !shape.same_shape(sample) => {
                Err("样本行的字段顺序与暂存行不一致".to_string())
            }
            _ => Ok(()),
        };

        if let Err(message) = alignment.and_then(|_| check_batch_shape(&columns, &rows)) {
            error!(table = %table, error = %message, "批次结构校验失败");
            return Err(batch_failed(table, statement, rows, message));
        }

        let was_autocommit = conn.is_autocommit();
        let result = if was_autocommit {
            execute_in_transaction(conn, &statement, &rows)
        } else {
            execute_in_savepoint(conn, &statement, &rows)
        };
        debug_assert_eq!(conn.is_autocommit(), was_autocommit);

        match result {
            Ok(count) => {
                info!(table = %table, rows = count, "批量插入已提交");
                Ok(count)
            }
            Err(e) if crate::db::is_connection_error(&e) => {
                error!(error = %e, "批量插入时数据库连接丢失");
                Err(ImportError::ConnectionLost(e.to_string()))
            }
            Err(e) => {
                error!(
                    table = %table,
                    sql = %statement,
                    rows = rows.len(),
                    error = %e,
                    "批量插入失败，已回滚"
                );
                Err(batch_failed(table, statement, rows, e.to_string()))
            }
        }
    }
}

fn batch_failed(
    table: &str,
    statement: String,
    rows: Vec<Vec<Option<String>>>,
    message: String,
) -> ImportError {
    ImportError::BatchInsertFailed {
        table: table.to_string(),
        statement,
        row_count: rows.len(),
        rows,
        message,
    }
}

/// 批次结构校验: 列名非空且不重复、每行值个数与列数一致
fn check_batch_shape(columns: &[String], rows: &[Vec<Option<String>>]) -> Result<(), String> {
    if columns.is_empty() {
        return Err("样本行没有任何可写入的字段".to_string());
    }

    if let Some(idx) = columns.iter().position(|c| c.trim().is_empty()) {
        return Err(format!("第 {} 个字段未映射到目标列", idx + 1));
    }

    // SQL 标识符大小写不敏感
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.to_lowercase()) {
            return Err(format!("重复的目标列: {}", column));
        }
    }

    if let Some((idx, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(format!(
            "第 {} 行有 {} 个值，与 {} 个列不一致",
            idx + 1,
            row.len(),
            columns.len()
        ));
    }

    Ok(())
}

fn insert_rows(
    conn: &Connection,
    statement: &str,
    rows: &[Vec<Option<String>>],
) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(statement)?;
    let mut count = 0;
    for row in rows {
        stmt.execute(params_from_iter(row.iter()))?;
        count += 1;
    }
    Ok(count)
}

/// autocommit 模式下: 独立事务，失败时 Transaction drop 自动回滚
fn execute_in_transaction(
    conn: &Connection,
    statement: &str,
    rows: &[Vec<Option<String>>],
) -> rusqlite::Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let count = insert_rows(&tx, statement, rows)?;
    tx.commit()?;
    Ok(count)
}

/// 调用方已持有事务时: 使用 SAVEPOINT，失败时只回滚本批次
fn execute_in_savepoint(
    conn: &Connection,
    statement: &str,
    rows: &[Vec<Option<String>>],
) -> rusqlite::Result<usize> {
    conn.execute_batch(&format!("SAVEPOINT {}", BATCH_SAVEPOINT))?;
    match insert_rows(conn, statement, rows) {
        Ok(count) => {
            conn.execute_batch(&format!("RELEASE {}", BATCH_SAVEPOINT))?;
            Ok(count)
        }
        Err(e) => {
            conn.execute_batch(&format!(
                "ROLLBACK TO {0}; RELEASE {0}",
                BATCH_SAVEPOINT
            ))?;
            Err(e)
        }
    }
}
