// ==========================================
// 路线表批量导入 - 数据清洗
// ==========================================
// 职责: 出库值统一转文本并剔除引号 / 括号
// 形式: 纯函数，显式作用于值列表
// ==========================================

use crate::domain::types::CellValue;

/// 清洗时剔除的字符（单引号、双引号、圆括号）
pub const SCRUBBED_CHARS: [char; 4] = ['"', '\'', '(', ')'];

/// 清洗单个文本
pub fn scrub_text(value: &str) -> String {
    value.chars().filter(|c| !SCRUBBED_CHARS.contains(c)).collect()
}

/// 清洗单个单元格值；NULL 保持为 None
pub fn scrub_value(value: &CellValue) -> Option<String> {
    value.to_text().map(|text| scrub_text(&text))
}

/// 对已转文本的值列表再清洗一次（幂等）
pub fn scrub_list(values: &[Option<String>]) -> Vec<Option<String>> {
    values
        .iter()
        .map(|v| v.as_deref().map(scrub_text))
        .collect()
}

/// 经纬度列在清洗前显式转文本
///
/// 数值按最短往返表示输出（不受本地化影响，负号保持在最前）；文本去除首尾空白
pub fn stringify_coordinate(value: &CellValue) -> CellValue {
    match value {
        CellValue::Number(n) => CellValue::Text(n.to_string()),
        CellValue::Integer(i) => CellValue::Text(i.to_string()),
        CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
        other => other.clone(),
    }
}
