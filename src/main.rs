// ==========================================
// 路线表批量导入 - 命令行入口
// ==========================================
// 用法: routesheet-etl --config etl.json --dir ./routesheets [--db path] [--report-json out.json]
// 退出码: 仅运行级错误（连接丢失 / ImportID 解析失败 / 配置错误）为非零
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use routesheet_etl::config::EtlConfig;
use routesheet_etl::db::{get_default_db_path, open_sqlite_connection};
use routesheet_etl::{i18n, logging, RoutesheetLoader, RunContext};
use std::path::PathBuf;

/// 将一个目录下的路线表工作簿批量导入目标表
#[derive(Parser)]
#[command(name = "routesheet-etl", version)]
#[command(about = "Load a folder of routesheet workbooks into the target table")]
struct Args {
    /// 运行配置（JSON）
    #[arg(short, long)]
    config: PathBuf,

    /// 工作簿所在目录（不递归）
    #[arg(short, long)]
    dir: PathBuf,

    /// SQLite 数据库路径（默认: ROUTESHEET_ETL_DB_PATH 或用户数据目录）
    #[arg(long)]
    db: Option<String>,

    /// 运行报告输出路径（JSON）
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// 界面语言: zh-CN | en（默认读取 ROUTESHEET_ETL_LOCALE）
    #[arg(long)]
    locale: Option<String>,

    /// 以 JSON 行格式输出日志
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    let locale = args
        .locale
        .clone()
        .or_else(|| std::env::var("ROUTESHEET_ETL_LOCALE").ok())
        .unwrap_or_else(|| "zh-CN".to_string());
    i18n::set_locale(&locale);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", routesheet_etl::APP_NAME, routesheet_etl::VERSION);
    tracing::info!("==================================================");
    tracing::info!("界面语言: {}", i18n::current_locale());

    let config = EtlConfig::load(&args.config)
        .with_context(|| format!("无法加载配置: {}", args.config.display()))?;

    let db_path = args.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);
    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;

    let context = RunContext::establish(conn, config).context("无法建立运行上下文")?;
    let mut loader = RoutesheetLoader::new(context);

    let report = loader
        .load_directory(&args.dir)
        .with_context(|| format!("导入中止: {}", args.dir.display()))?;

    for line in report.render_summary() {
        println!("{}", line);
    }

    if let Some(path) = &args.report_json {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("无法写入运行报告: {}", path.display()))?;
        tracing::info!("运行报告已写入: {}", path.display());
    }

    Ok(())
}
