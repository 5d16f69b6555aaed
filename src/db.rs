// ==========================================
// 路线表批量导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 整个运行只持有一个连接（登录一次，所有读取与批量提交复用）
// - 统一 busy_timeout / foreign_keys
// - 区分"连接级错误"（中止运行）与"语句级错误"（仅影响当前工作表）
// ==========================================

use rusqlite::{Connection, ErrorCode};
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 判断错误是否意味着连接本身不可用
///
/// 约束冲突、语法错误、列不存在等都属于语句级错误，不在此列
pub fn is_connection_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
        ),
        _ => false,
    }
}

/// 默认数据库路径
///
/// 优先级: ROUTESHEET_ETL_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("ROUTESHEET_ETL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./routesheets.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("routesheet-etl");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("routesheets.db");
        }
    }

    path.to_string_lossy().to_string()
}
