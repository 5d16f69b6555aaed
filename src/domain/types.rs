// ==========================================
// 路线表批量导入 - 领域类型
// ==========================================
// 单元格值 / 分支机构代码 / 服务日
// ==========================================

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格标量值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 是否为缺失值（NULL / 空白文本 / NaN）
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// 转为文本；NULL 返回 None
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            // f64 的 Display 不带本地化分隔符，也不会输出科学计数法
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

// ==========================================
// MissingValue - 缺失值哨兵
// ==========================================
/// 整个工作表统一使用的缺失值表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValue {
    /// 写入 0，后续由维护语句统一置 NULL
    #[default]
    Zero,
    /// 直接写入 NULL
    Null,
}

impl MissingValue {
    pub fn sentinel(&self) -> CellValue {
        match self {
            MissingValue::Zero => CellValue::Integer(0),
            MissingValue::Null => CellValue::Null,
        }
    }
}

// ==========================================
// Branch - 分支机构代码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    /// Columbus
    #[serde(rename = "CLB")]
    Clb,
    /// Point Comfort
    #[serde(rename = "PCF")]
    Pcf,
    /// Sweeney
    #[serde(rename = "SWE")]
    Swe,
    #[serde(rename = "")]
    Unknown,
}

impl Branch {
    /// 匹配优先级（文件路径包含多个代码时取第一个）
    pub const PRIORITY: [Branch; 3] = [Branch::Clb, Branch::Pcf, Branch::Swe];

    /// 三字母代码；未识别时为空串
    pub fn code(&self) -> &'static str {
        match self {
            Branch::Clb => "CLB",
            Branch::Pcf => "PCF",
            Branch::Swe => "SWE",
            Branch::Unknown => "",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ==========================================
// ServiceDay - 服务日
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServiceDay(Option<Weekday>);

impl ServiceDay {
    /// 匹配顺序: 周一 → 周日，先匹配者胜出
    pub const ORDER: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn new(day: Weekday) -> Self {
        Self(Some(day))
    }

    pub fn unknown() -> Self {
        Self(None)
    }

    pub fn weekday(&self) -> Option<Weekday> {
        self.0
    }

    /// 英文全称；未识别时为空串
    pub fn name(&self) -> &'static str {
        match self.0 {
            Some(day) => weekday_name(day),
            None => "",
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

impl fmt::Display for ServiceDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
