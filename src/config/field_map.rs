// ==========================================
// 路线表批量导入 - 字段映射表
// ==========================================
// 外部列名（Excel 表头） → 目标表字段名
// 启动时构建并校验一次，运行期间不可变
// ==========================================

use crate::domain::context::CONTEXT_COLUMNS;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::sql_builder::validate_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 未映射字段的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedFieldPolicy {
    /// 整个工作表判定失败（MappingGap），不落库任何行
    #[default]
    Reject,
    /// 丢弃该列（列名 / 占位符 / 值同时丢弃）
    Skip,
    /// 直接使用外部列名作为目标字段名
    RawName,
}

/// 已校验的字段映射表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    entries: BTreeMap<String, String>,
}

impl FieldMap {
    /// 构建映射表
    ///
    /// # 规则
    /// - 外部列名去除首尾空白后作为键，不可为空
    /// - 目标字段名必须是合法标识符
    /// - 四个上下文列（Branch/ServiceDay/Route/ImportID）未显式配置时按原名映射
    pub fn new<I, K, V>(pairs: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = BTreeMap::new();

        for (external, target) in pairs {
            let external = external.as_ref().trim();
            let target = target.as_ref().trim();

            if external.is_empty() {
                return Err(ImportError::ConfigError(
                    "字段映射中存在空的外部列名".to_string(),
                ));
            }
            validate_identifier(target)?;

            if entries
                .insert(external.to_string(), target.to_string())
                .is_some()
            {
                return Err(ImportError::ConfigError(format!(
                    "外部列名重复配置: {}",
                    external
                )));
            }
        }

        if entries.is_empty() {
            return Err(ImportError::ConfigError("字段映射为空".to_string()));
        }

        for column in CONTEXT_COLUMNS {
            entries
                .entry(column.to_string())
                .or_insert_with(|| column.to_string());
        }

        Ok(Self { entries })
    }

    /// 查找目标字段名（外部列名先 trim）
    pub fn target_for(&self, external: &str) -> Option<&str> {
        self.entries.get(external.trim()).map(String::as_str)
    }

    pub fn contains(&self, external: &str) -> bool {
        self.target_for(external).is_some()
    }

    /// 列出未配置的外部列名（保持输入顺序）
    pub fn unmapped<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_trims_external_name() {
        let map = FieldMap::new([("Lat", "Latitude"), ("Lon", "Longitude")]).unwrap();
        assert_eq!(map.target_for("  Lat "), Some("Latitude"));
        assert_eq!(map.target_for("Stop"), None);
    }

    #[test]
    fn test_context_columns_identity_mapped() {
        let map = FieldMap::new([("Lat", "Latitude")]).unwrap();
        assert_eq!(map.target_for("Branch"), Some("Branch"));
        assert_eq!(map.target_for("ImportID"), Some("ImportID"));
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_context_column_override_is_kept() {
        let map = FieldMap::new([("Lat", "Latitude"), ("Route", "RouteName")]).unwrap();
        assert_eq!(map.target_for("Route"), Some("RouteName"));
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        let empty: [(&str, &str); 0] = [];
        assert!(FieldMap::new(empty).is_err());
        assert!(FieldMap::new([("  ", "Latitude")]).is_err());
        assert!(FieldMap::new([("Lat", "Lat\"itude")]).is_err());
        assert!(FieldMap::new([("Lat", "Latitude"), (" Lat", "Other")]).is_err());
    }

    #[test]
    fn test_unmapped_keeps_order() {
        let map = FieldMap::new([("Lat", "Latitude")]).unwrap();
        let gaps = map.unmapped(["Stop", "Lat", "Address", "Route"]);
        assert_eq!(gaps, vec!["Stop".to_string(), "Address".to_string()]);
    }
}
