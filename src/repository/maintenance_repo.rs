// ==========================================
// 路线表批量导入 - 运行后维护语句
// ==========================================
// 职责: 全部工作表成功后依次执行配置的维护语句
// 约束: 单条语句失败只记录、不中断后续语句，也不影响已提交的数据
// ==========================================

use crate::config::MaintenanceStep;
use crate::domain::outcome::MaintenanceOutcome;
use crate::importer::error::{ImportError, ImportResult};
use rusqlite::Connection;
use tracing::{error, info};

pub struct MaintenanceRepository<'a> {
    conn: &'a Connection,
}

impl<'a> MaintenanceRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// 执行单条维护语句
    pub fn execute_step(&self, step: &MaintenanceStep) -> ImportResult<()> {
        self.conn.execute_batch(&step.sql).map_err(|e| {
            if crate::db::is_connection_error(&e) {
                ImportError::ConnectionLost(e.to_string())
            } else {
                ImportError::MaintenanceFailed {
                    name: step.name.clone(),
                    message: e.to_string(),
                }
            }
        })
    }

    /// 依次执行全部维护语句
    ///
    /// # 返回
    /// - Ok(outcomes): 每条语句一个结果（失败项带错误信息）
    /// - Err(ConnectionLost): 连接不可用，后续语句不再执行
    pub fn run_all(&self, steps: &[MaintenanceStep]) -> ImportResult<Vec<MaintenanceOutcome>> {
        let mut outcomes = Vec::with_capacity(steps.len());

        for step in steps {
            match self.execute_step(step) {
                Ok(()) => {
                    info!(name = %step.name, "维护语句执行完成");
                    outcomes.push(MaintenanceOutcome {
                        name: step.name.clone(),
                        succeeded: true,
                        message: None,
                    });
                }
                Err(e @ ImportError::ConnectionLost(_)) => {
                    error!(name = %step.name, error = %e, "维护语句执行时连接丢失");
                    return Err(e);
                }
                Err(e) => {
                    error!(name = %step.name, error = %e, "维护语句执行失败");
                    outcomes.push(MaintenanceOutcome {
                        name: step.name.clone(),
                        succeeded: false,
                        message: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(name: &str, sql: &str) -> MaintenanceStep {
        MaintenanceStep {
            name: name.to_string(),
            sql: sql.to_string(),
        }
    }

    #[test]
    fn test_failed_step_does_not_stop_the_rest() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE RouteStops (Route TEXT, Stop TEXT);")
            .unwrap();

        let repo = MaintenanceRepository::new(&conn);
        let outcomes = repo
            .run_all(&[
                step("broken", "UPDATE Missing SET x = 1"),
                step(
                    "dedupe",
                    "CREATE INDEX IF NOT EXISTS idx_route ON RouteStops (Route)",
                ),
            ])
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].succeeded);
        assert!(outcomes[0].message.as_deref().unwrap_or("").contains("Missing"));
        assert!(outcomes[1].succeeded);

        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_route'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(index_count, 1);
    }

    #[test]
    fn test_no_steps_no_outcomes() {
        let conn = Connection::open_in_memory().unwrap();
        let outcomes = MaintenanceRepository::new(&conn).run_all(&[]).unwrap();
        assert!(outcomes.is_empty());
    }
}
