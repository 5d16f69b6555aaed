// ==========================================
// 路线表批量导入 - 导入流程编排
// ==========================================
// 流程: 扫描目录 → 逐文件打开 → 逐工作表 [读取 → 派生上下文 → 覆盖检查 → 暂存 → 提交]
//       → 全部成功时执行维护语句 → 运行报告
// 失败隔离: 工作表级错误记入报告后继续；仅 is_run_fatal() 的错误中止运行
// ==========================================

use crate::domain::outcome::{LoadOutcome, LoadReport};
use crate::importer::batch_stager::BatchStager;
use crate::importer::derivation::DerivationService;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, RawSheet};
use crate::importer::run_context::RunContext;
use crate::importer::worksheet::{SheetOptions, Worksheet};
use crate::i18n::t_with_args;
use crate::perf::PerfGuard;
use crate::repository::MaintenanceRepository;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 文件无法打开时报告中使用的工作表名
pub const WHOLE_FILE_SHEET: &str = "*";

// ==========================================
// RoutesheetLoader - 路线表导入器
// ==========================================
pub struct RoutesheetLoader {
    context: RunContext,
    file_parser: Box<dyn FileParser>,
    derivation: DerivationService,
    stager: BatchStager,
}

impl RoutesheetLoader {
    /// 使用默认文件解析器（Excel + CSV）
    pub fn new(context: RunContext) -> Self {
        Self::with_parser(context, Box::new(UniversalFileParser))
    }

    pub fn with_parser(context: RunContext, file_parser: Box<dyn FileParser>) -> Self {
        let stager = BatchStager::new(FieldMapper::from_config(context.config()));
        Self {
            context,
            file_parser,
            derivation: DerivationService,
            stager,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    fn sheet_options(&self) -> SheetOptions {
        let config = self.context.config();
        SheetOptions {
            min_non_null_cells: config.min_non_null_cells,
            missing_value: config.missing_value,
        }
    }

    /// 扫描目录（不递归），按扩展名白名单过滤，按文件名排序
    pub fn scan_directory(&self, dir: &Path) -> ImportResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ImportError::FileNotFound(dir.display().to_string()));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            // Excel 打开文件时留下的锁文件
            let is_lock_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("~$"))
                .unwrap_or(false);
            let accepted = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| self.context.config().accepts_extension(e))
                .unwrap_or(false);
            if accepted && !is_lock_file {
                files.push(path);
            }
        }
        files.sort();

        debug!(dir = %dir.display(), files = files.len(), "目录扫描完成");
        Ok(files)
    }

    /// 导入目录下的全部工作簿
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_directory(&mut self, dir: &Path) -> ImportResult<LoadReport> {
        let files = self.scan_directory(dir)?;
        if files.is_empty() {
            warn!(dir = %dir.display(), "目录中没有可导入的文件");
        }
        self.load_files(&files)
    }

    /// 依次导入给定的工作簿
    ///
    /// # 返回
    /// - Ok(LoadReport): 运行完成（可能含失败的工作表）
    /// - Err: 连接丢失等运行级错误，运行已中止
    #[instrument(skip(self, files), fields(files = files.len(), run_id = tracing::field::Empty))]
    pub fn load_files(&mut self, files: &[PathBuf]) -> ImportResult<LoadReport> {
        let perf = PerfGuard::new("routesheet_load");
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let mut report = LoadReport::new(
            run_id,
            self.context.import_id(),
            self.context.config().target_table.clone(),
        );
        info!(import_id = %report.import_id, "开始导入路线表");

        for path in files {
            self.load_workbook(path, &mut report)?;
        }

        let steps = &self.context.config().post_run_statements;
        if report.has_failures() {
            if !steps.is_empty() {
                warn!(
                    failed = report.failed().count(),
                    "存在失败的工作表，跳过维护语句"
                );
            }
        } else if !steps.is_empty() {
            report.maintenance = MaintenanceRepository::new(self.context.connection()).run_all(steps)?;
        }

        report.finish(perf.elapsed());
        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            skipped = report.skipped().count(),
            rows = report.rows_loaded(),
            "路线表导入结束"
        );
        Ok(report)
    }

    /// 导入单个工作簿的全部工作表
    fn load_workbook(&mut self, path: &Path, report: &mut LoadReport) -> ImportResult<()> {
        let file_name = file_label(path);

        let sheets = match self.file_parser.parse_workbook(path) {
            Ok(sheets) => sheets,
            Err(e) => {
                warn!(file = %file_name, error = %e, "工作簿无法打开");
                report.record(
                    &file_name,
                    WHOLE_FILE_SHEET,
                    LoadOutcome::Failed {
                        reason: e.to_string(),
                    },
                );
                return Ok(());
            }
        };

        let file_path = path.to_string_lossy().to_string();
        for sheet in sheets {
            let sheet_name = sheet.name.clone();
            let outcome = self.load_sheet(&file_path, sheet)?;
            report.record(&file_name, &sheet_name, outcome);
        }
        Ok(())
    }

    /// 导入单个工作表
    ///
    /// # 返回
    /// - Ok(outcome): 成功 / 跳过 / 失败（工作表级错误已消化）
    /// - Err: 运行级错误
    #[instrument(skip(self, sheet), fields(sheet = %sheet.name))]
    pub fn load_sheet(&mut self, file_path: &str, sheet: RawSheet) -> ImportResult<LoadOutcome> {
        let label = sheet_label(file_path, &sheet.name);
        info!("{}", t_with_args("report.sheet_working", &[("sheet", &label)]));

        match self.try_load_sheet(file_path, sheet) {
            Ok(LoadOutcome::Skipped) => {
                info!("{}", t_with_args("report.sheet_skipped", &[("sheet", &label)]));
                Ok(LoadOutcome::Skipped)
            }
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_run_fatal() => {
                error!(sheet = %label, error = %e, "运行级错误，中止导入");
                Err(e)
            }
            Err(e) => {
                log_failure_hints(&label, &self.context.config().target_table, &e);
                Ok(LoadOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn try_load_sheet(&mut self, file_path: &str, sheet: RawSheet) -> ImportResult<LoadOutcome> {
        let grid = sheet.grid?;
        let mut worksheet =
            Worksheet::from_grid(file_path, &sheet.name, grid, self.sheet_options())?;

        let context =
            self.derivation
                .derive_context(self.context.import_id(), file_path, &sheet.name);
        debug!(
            branch = %context.branch,
            service_day = context.service_day.name(),
            route = %context.route,
            "工作表上下文"
        );
        worksheet.attach_context(context);

        let sample = match worksheet.first_row() {
            Some(row) => row,
            None => return Ok(LoadOutcome::Skipped),
        };

        self.stager
            .mapper()
            .check_coverage(worksheet.sheet_name(), sample.keys())?;

        for row in worksheet.rows() {
            self.stager.stage(&row);
        }

        let table = &self.context.config().target_table;
        let rows = self
            .stager
            .commit(self.context.connection(), &sample, table)?;

        info!(
            "{}",
            t_with_args(
                "report.sheet_succeeded",
                &[
                    ("sheet", &sheet_label(file_path, worksheet.sheet_name())),
                    ("table", table),
                    ("rows", &rows.to_string()),
                ],
            )
        );
        Ok(LoadOutcome::Succeeded { rows })
    }
}

/// 报告与日志中的文件名（不含目录）
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 工作表标签，与报告中的 SheetOutcome::label 一致: CLB_Monday.xlsx - Route12
fn sheet_label(file_path: &str, sheet: &str) -> String {
    format!("{} - {}", file_label(Path::new(file_path)), sheet)
}

/// 工作表失败时给操作员的排查提示
fn log_failure_hints(label: &str, table: &str, err: &ImportError) {
    warn!(error = %err, "{}", t_with_args("report.sheet_failed", &[("sheet", label), ("table", table)]));
    if let ImportError::BatchInsertFailed { statement, .. } = err {
        debug!(sql = %statement, "失败的插入语句");
    }
    for key in [
        "report.hint_header",
        "report.hint_misalignment",
        "report.hint_coordinate_sign",
        "report.hint_duplicate_headers",
    ] {
        warn!("{}", t_with_args(key, &[]));
    }
    warn!("{}", t_with_args("report.hint_recheck", &[("sheet", label)]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EtlConfig, FieldMap};
    use crate::domain::types::CellValue;
    use rusqlite::Connection;

    fn loader() -> RoutesheetLoader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE MostRecentImport (ImportID INTEGER);
            INSERT INTO MostRecentImport VALUES (42);
            CREATE TABLE RouteStops (
                Branch TEXT, ServiceDay TEXT, Route TEXT, ImportID TEXT,
                Latitude TEXT NOT NULL, Longitude TEXT
            );
            "#,
        )
        .unwrap();

        let mut config = EtlConfig::with_field_map(
            "RouteStops",
            FieldMap::new([("Lat", "Latitude"), ("Lon", "Longitude")]).unwrap(),
        )
        .unwrap();
        config.min_non_null_cells = 2;

        RoutesheetLoader::new(RunContext::establish(conn, config).unwrap())
    }

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    #[test]
    fn test_load_sheet_succeeds_with_context_columns() {
        let mut loader = loader();
        let sheet = RawSheet::new(
            "Route12",
            vec![
                vec![text("Lat"), text("Lon")],
                vec![text("30.1"), text("-95.2")],
            ],
        );

        let outcome = loader.load_sheet("CLB_Monday_Route12.xlsx", sheet).unwrap();
        assert_eq!(outcome, LoadOutcome::Succeeded { rows: 1 });

        let row: (String, String, String, String) = loader
            .context()
            .connection()
            .query_row(
                "SELECT Branch, ServiceDay, Route, ImportID FROM RouteStops",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .unwrap();
        assert_eq!(
            row,
            (
                "CLB".to_string(),
                "Monday".to_string(),
                "Route12".to_string(),
                "42".to_string()
            )
        );
    }

    #[test]
    fn test_sheet_read_error_is_contained() {
        let mut loader = loader();
        let sheet = RawSheet {
            name: "Broken".to_string(),
            grid: Err(ImportError::ExcelParseError("bad cell".to_string())),
        };
        let outcome = loader.load_sheet("CLB_Monday.xlsx", sheet).unwrap();
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
    }

    #[test]
    fn test_sheet_label_matches_report_label() {
        let loader = loader();
        let mut report = LoadReport::new(
            "run".to_string(),
            loader.context().import_id(),
            "RouteStops".to_string(),
        );
        report.record(
            &file_label(Path::new("routes/PCF_Friday.xlsx")),
            "Route7",
            LoadOutcome::Failed {
                reason: "x".to_string(),
            },
        );

        let label = sheet_label("routes/PCF_Friday.xlsx", "Route7");
        assert_eq!(label, "PCF_Friday.xlsx - Route7");
        assert_eq!(report.failed_sheets(), vec![label]);
    }

    #[test]
    fn test_mapping_gap_fails_before_staging() {
        let mut loader = loader();
        let sheet = RawSheet::new(
            "Route12",
            vec![
                vec![text("Lat"), text("Lon"), text("Stop")],
                vec![text("30.1"), text("-95.2"), text("1")],
            ],
        );
        match loader.load_sheet("CLB_Monday.xlsx", sheet).unwrap() {
            LoadOutcome::Failed { reason } => assert!(reason.contains("Stop")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(loader.stager.is_empty());
    }
}
