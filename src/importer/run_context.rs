// ==========================================
// 路线表批量导入 - 运行上下文
// ==========================================
// 职责: 持有本次运行唯一的连接、ImportID 与配置
// 红线: ImportID 只在 establish 时解析一次，运行期间不可变
// ==========================================

use crate::config::EtlConfig;
use crate::domain::context::ImportId;
use crate::importer::error::ImportResult;
use crate::repository::ImportContextRepository;
use rusqlite::Connection;
use tracing::info;

pub struct RunContext {
    conn: Connection,
    import_id: ImportId,
    config: EtlConfig,
}

impl RunContext {
    /// 建立运行上下文
    ///
    /// # 返回
    /// - Ok(RunContext): ImportID 已解析
    /// - Err(ContextResolutionFailed / ConnectionLost): 运行不能开始
    pub fn establish(conn: Connection, config: EtlConfig) -> ImportResult<Self> {
        let import_id = ImportContextRepository::new(&conn)
            .fetch_current_import_id(&config.import_id_source)?;

        info!(
            import_id = %import_id,
            target_table = %config.target_table,
            "运行上下文已建立"
        );

        Ok(Self {
            conn,
            import_id,
            config,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn import_id(&self) -> ImportId {
        self.import_id
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldMap;
    use crate::importer::error::ImportError;

    fn config() -> EtlConfig {
        EtlConfig::with_field_map("RouteStops", FieldMap::new([("Lat", "Latitude")]).unwrap())
            .unwrap()
    }

    #[test]
    fn test_establish_resolves_import_id_once() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE MostRecentImport (ImportID INTEGER); INSERT INTO MostRecentImport VALUES (42);",
        )
        .unwrap();

        let ctx = RunContext::establish(conn, config()).unwrap();
        assert_eq!(ctx.import_id().value(), 42);

        // 视图变化不影响已建立的上下文
        ctx.connection()
            .execute("UPDATE MostRecentImport SET ImportID = 43", [])
            .unwrap();
        assert_eq!(ctx.import_id().value(), 42);
        assert_eq!(ctx.config().target_table, "RouteStops");
    }

    #[test]
    fn test_establish_fails_without_source_view() {
        let conn = Connection::open_in_memory().unwrap();
        let result = RunContext::establish(conn, config());
        assert!(matches!(result, Err(ImportError::ContextResolutionFailed(_))));
    }
}
