// ==========================================
// 路线表批量导入 - 字段映射器
// ==========================================
// 职责: 外部列名 → 目标字段名 + 出库值清洗
// 约束: 列名 / 占位符 / 值三者由同一个有序 BoundColumn 列表派生，
//       长度与位置始终一致
// ==========================================

use crate::config::{EtlConfig, FieldMap, UnmappedFieldPolicy};
use crate::domain::row::Row;
use crate::importer::data_cleaner::{scrub_value, stringify_coordinate};
use crate::importer::error::{ImportError, ImportResult};

/// 已映射、已清洗的单个出库字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundColumn {
    pub column: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FieldMapper {
    field_map: FieldMap,
    policy: UnmappedFieldPolicy,
    coordinate_fields: Vec<String>,
}

impl FieldMapper {
    pub fn new(
        field_map: FieldMap,
        policy: UnmappedFieldPolicy,
        coordinate_fields: Vec<String>,
    ) -> Self {
        Self {
            field_map,
            policy,
            coordinate_fields,
        }
    }

    pub fn from_config(config: &EtlConfig) -> Self {
        Self::new(
            config.field_map.clone(),
            config.unmapped_field_policy,
            config.coordinate_fields.clone(),
        )
    }

    pub fn policy(&self) -> UnmappedFieldPolicy {
        self.policy
    }

    /// 解析目标字段名
    ///
    /// # 返回
    /// - Some(name): 映射成功（Reject 策略下未映射列得到空串）
    /// - None: Skip 策略下未映射列被丢弃
    fn resolve(&self, external: &str) -> Option<String> {
        match (self.field_map.target_for(external), self.policy) {
            (Some(target), _) => Some(target.to_string()),
            (None, UnmappedFieldPolicy::Reject) => Some(String::new()),
            (None, UnmappedFieldPolicy::Skip) => None,
            (None, UnmappedFieldPolicy::RawName) => Some(external.trim().to_string()),
        }
    }

    fn is_coordinate(&self, external: &str, target: &str) -> bool {
        self.coordinate_fields
            .iter()
            .any(|c| c == external.trim() || c == target)
    }

    /// Reject 策略下检查列覆盖情况；其他策略总是通过
    pub fn check_coverage<'a>(
        &self,
        sheet: &str,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> ImportResult<()> {
        if self.policy != UnmappedFieldPolicy::Reject {
            return Ok(());
        }
        let gaps = self.field_map.unmapped(columns);
        if gaps.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MappingGap {
                sheet: sheet.to_string(),
                fields: gaps,
            })
        }
    }

    /// 映射并清洗一行
    pub fn bind(&self, row: &Row) -> Vec<BoundColumn> {
        row.fields()
            .iter()
            .filter_map(|field| {
                let column = self.resolve(&field.name)?;
                let value = if self.is_coordinate(&field.name, &column) {
                    scrub_value(&stringify_coordinate(&field.value))
                } else {
                    scrub_value(&field.value)
                };
                Some(BoundColumn { column, value })
            })
            .collect()
    }

    /// 目标字段名清单
    pub fn map_field_names(&self, row: &Row) -> Vec<String> {
        self.bind(row).into_iter().map(|b| b.column).collect()
    }

    /// 占位符清单（每个字段一个 "?"）
    pub fn build_placeholders(&self, row: &Row) -> Vec<&'static str> {
        self.bind(row).iter().map(|_| "?").collect()
    }

    /// 清洗后的值清单
    pub fn scrub_values(&self, row: &Row) -> Vec<Option<String>> {
        self.bind(row).into_iter().map(|b| b.value).collect()
    }
}
