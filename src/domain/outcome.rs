// ==========================================
// 路线表批量导入 - 工作表结果与运行报告
// ==========================================

use crate::domain::context::ImportId;
use crate::i18n::t_with_args;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// 单个工作表的导入结果（三态）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Succeeded { rows: usize },
    Failed { reason: String },
    Skipped,
}

/// 带出处的工作表结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetOutcome {
    pub file: String,
    pub sheet: String,
    #[serde(flatten)]
    pub outcome: LoadOutcome,
}

impl SheetOutcome {
    /// 报告中的标签: "{file} - {sheet}"
    pub fn label(&self) -> String {
        format!("{} - {}", self.file, self.sheet)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Failed { .. })
    }
}

/// 维护语句执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceOutcome {
    pub name: String,
    pub succeeded: bool,
    pub message: Option<String>,
}

/// 运行级报告
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub run_id: String,
    pub import_id: ImportId,
    pub target_table: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub outcomes: Vec<SheetOutcome>,
    pub maintenance: Vec<MaintenanceOutcome>,
}

impl LoadReport {
    pub fn new(run_id: String, import_id: ImportId, target_table: String) -> Self {
        Self {
            run_id,
            import_id,
            target_table,
            started_at: Utc::now(),
            elapsed_ms: 0,
            outcomes: Vec::new(),
            maintenance: Vec::new(),
        }
    }

    pub fn record(&mut self, file: &str, sheet: &str, outcome: LoadOutcome) {
        self.outcomes.push(SheetOutcome {
            file: file.to_string(),
            sheet: sheet.to_string(),
            outcome,
        });
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_ms = elapsed.as_millis() as u64;
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, LoadOutcome::Succeeded { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes.iter().filter(|o| o.is_failed())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SheetOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, LoadOutcome::Skipped))
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn failed_sheets(&self) -> Vec<String> {
        self.failed().map(|o| o.label()).collect()
    }

    pub fn rows_loaded(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.outcome {
                LoadOutcome::Succeeded { rows } => rows,
                _ => 0,
            })
            .sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 运行结束时给操作员看的汇总
    pub fn render_summary(&self) -> Vec<String> {
        let import_id = self.import_id.to_string();
        let seconds = format!("{:.4}", self.elapsed_ms as f64 / 1000.0);
        let succeeded = self.succeeded().count().to_string();
        let failed = self.failed().count().to_string();
        let skipped = self.skipped().count().to_string();

        let mut lines = vec![
            t_with_args("report.elapsed", &[("seconds", &seconds)]),
            t_with_args("report.title", &[("import_id", &import_id)]),
            t_with_args(
                "report.counts",
                &[
                    ("succeeded", &succeeded),
                    ("failed", &failed),
                    ("skipped", &skipped),
                ],
            ),
        ];

        if self.has_failures() {
            lines.push(t_with_args("report.failed_list", &[]));
            lines.extend(self.failed_sheets().into_iter().map(|s| format!("  {}", s)));
        }

        for m in self.maintenance.iter().filter(|m| !m.succeeded) {
            lines.push(t_with_args("report.maintenance_failed", &[("name", &m.name)]));
        }

        lines
    }
}
