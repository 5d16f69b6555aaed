// ==========================================
// 路线表批量导入 - SQL 构建工具模块
// ==========================================
// 职责: 标识符校验与引用、INSERT / SELECT 语句构建
// 约束: 值一律走参数绑定；只有标识符会被拼进语句文本，且一律经 quote_identifier 转义
// ==========================================

use crate::importer::error::{ImportError, ImportResult};

/// 未指定列时的默认安全上限（对应 TOP 100 *）
pub const DEFAULT_SELECT_LIMIT: usize = 100;

/// 校验标识符（表名 / 字段名）
///
/// 允许空格和点号（目标库常见 "dbo.Table" / "Stop Number"），
/// 拒绝空串、引号、分号和控制字符
pub fn validate_identifier(name: &str) -> ImportResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ImportError::ConfigError("标识符为空".to_string()));
    }
    if trimmed
        .chars()
        .any(|c| c == '"' || c == '\'' || c == ';' || c == '`' || c.is_control())
    {
        return Err(ImportError::ConfigError(format!("非法标识符: {}", name)));
    }
    Ok(())
}

/// 引用单个标识符: Stop Number → "Stop Number"，内嵌双引号加倍: Stop "A" → "Stop ""A""
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.trim().replace('"', "\"\""))
}

/// 引用表名，按点号拆分 schema: main.RouteStops → "main"."RouteStops"
pub fn quote_table_name(table: &str) -> String {
    table
        .split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// 构建占位符清单: 3 → (?,?,?)
pub fn build_placeholders(count: usize) -> String {
    format!("({})", vec!["?"; count].join(","))
}

/// 构建 INSERT 语句: INSERT INTO "t" ("a","b") VALUES (?,?)
pub fn build_insert_statement(table: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_table_name(table),
        column_list,
        build_placeholders(columns.len())
    )
}

/// 构建 SELECT 语句
///
/// # 参数
/// - `columns`: 投影列；None 时为 `*` 并强制加上默认 LIMIT
/// - `table`: 表 / 视图名
/// - `limit`: 显式 LIMIT（优先于默认上限）
pub fn build_select_statement(columns: Option<&[&str]>, table: &str, limit: Option<usize>) -> String {
    let (projection, limit) = match columns {
        Some(cols) if !cols.is_empty() => (
            cols.iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(","),
            limit,
        ),
        _ => ("*".to_string(), Some(limit.unwrap_or(DEFAULT_SELECT_LIMIT))),
    };

    match limit {
        Some(n) => format!("SELECT {} FROM {} LIMIT {}", projection, quote_table_name(table), n),
        None => format!("SELECT {} FROM {}", projection, quote_table_name(table)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_insert_statement() {
        let sql = build_insert_statement(
            "RouteStops",
            &["Branch".to_string(), "Stop Number".to_string()],
        );
        assert_eq!(
            sql,
            r#"INSERT INTO "RouteStops" ("Branch","Stop Number") VALUES (?,?)"#
        );
    }

    #[test]
    fn test_quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier(r#"Stop "A""#), r#""Stop ""A""""#);
        assert_eq!(
            build_insert_statement("T", &[r#"Stop "A""#.to_string()]),
            r#"INSERT INTO "T" ("Stop ""A""") VALUES (?)"#
        );
    }

    #[test]
    fn test_quote_table_with_schema() {
        assert_eq!(quote_table_name("main.RouteStops"), r#""main"."RouteStops""#);
    }

    #[test]
    fn test_select_default_projection_is_capped() {
        assert_eq!(
            build_select_statement(None, "MostRecentImport", None),
            r#"SELECT * FROM "MostRecentImport" LIMIT 100"#
        );
        assert_eq!(
            build_select_statement(Some(&["ImportID"][..]), "MostRecentImport", None),
            r#"SELECT "ImportID" FROM "MostRecentImport""#
        );
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Stop Number").is_ok());
        assert!(validate_identifier("dbo.RouteStops").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("a;DROP TABLE x").is_err());
        assert!(validate_identifier("a\"b").is_err());
    }

    #[test]
    fn test_build_placeholders() {
        assert_eq!(build_placeholders(1), "(?)");
        assert_eq!(build_placeholders(4), "(?,?,?,?)");
    }
}
