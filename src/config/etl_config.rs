// ==========================================
// 路线表批量导入 - 运行配置
// ==========================================
// 来源: JSON 配置文件（serde）
// 时机: 启动时加载并校验一次，运行期间不可变
// ==========================================

use crate::config::field_map::{FieldMap, UnmappedFieldPolicy};
use crate::domain::types::MissingValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::sql_builder::validate_identifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// ImportID 来源（"最近一次导入"视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIdSource {
    pub table: String,
    pub column: String,
}

impl Default for ImportIdSource {
    fn default() -> Self {
        Self {
            table: "MostRecentImport".to_string(),
            column: "ImportID".to_string(),
        }
    }
}

/// 运行结束后的维护语句（对本模块不透明，只关心成功/失败）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceStep {
    pub name: String,
    pub sql: String,
}

/// 配置文件的原始结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EtlConfigFile {
    pub target_table: String,
    pub field_map: BTreeMap<String, String>,
    #[serde(default)]
    pub import_id_source: ImportIdSource,
    #[serde(default = "default_min_non_null_cells")]
    pub min_non_null_cells: usize,
    #[serde(default)]
    pub missing_value: MissingValue,
    #[serde(default)]
    pub unmapped_field_policy: UnmappedFieldPolicy,
    #[serde(default = "default_coordinate_fields")]
    pub coordinate_fields: Vec<String>,
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
    #[serde(default)]
    pub post_run_statements: Vec<MaintenanceStep>,
}

fn default_min_non_null_cells() -> usize {
    10
}

fn default_coordinate_fields() -> Vec<String> {
    vec!["Latitude".to_string(), "Longitude".to_string()]
}

fn default_file_extensions() -> Vec<String> {
    ["xls", "xlsx", "xlsm", "xlsb", "csv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 已校验的运行配置
#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub target_table: String,
    pub field_map: FieldMap,
    pub import_id_source: ImportIdSource,
    pub min_non_null_cells: usize,
    pub missing_value: MissingValue,
    pub unmapped_field_policy: UnmappedFieldPolicy,
    pub coordinate_fields: Vec<String>,
    pub file_extensions: Vec<String>,
    pub post_run_statements: Vec<MaintenanceStep>,
}

impl EtlConfig {
    /// 从 JSON 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::ConfigError(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// 从 JSON 文本加载
    pub fn from_json(raw: &str) -> ImportResult<Self> {
        let file: EtlConfigFile = serde_json::from_str(raw)?;
        Self::validate(file)
    }

    /// 校验原始配置并构建 EtlConfig
    pub fn validate(file: EtlConfigFile) -> ImportResult<Self> {
        validate_identifier(&file.target_table)?;
        validate_identifier(&file.import_id_source.table)?;
        validate_identifier(&file.import_id_source.column)?;

        let field_map = FieldMap::new(&file.field_map)?;

        let mut names = std::collections::HashSet::new();
        for step in &file.post_run_statements {
            if step.sql.trim().is_empty() {
                return Err(ImportError::ConfigError(format!(
                    "维护语句为空: {}",
                    step.name
                )));
            }
            if !names.insert(step.name.as_str()) {
                return Err(ImportError::ConfigError(format!(
                    "维护语句名称重复: {}",
                    step.name
                )));
            }
        }

        let file_extensions: Vec<String> = file
            .file_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if file_extensions.is_empty() {
            return Err(ImportError::ConfigError("未配置任何文件扩展名".to_string()));
        }

        Ok(Self {
            target_table: file.target_table.trim().to_string(),
            field_map,
            import_id_source: file.import_id_source,
            min_non_null_cells: file.min_non_null_cells,
            missing_value: file.missing_value,
            unmapped_field_policy: file.unmapped_field_policy,
            coordinate_fields: file.coordinate_fields,
            file_extensions,
            post_run_statements: file.post_run_statements,
        })
    }

    /// 以代码方式构建（测试 / 嵌入场景），其余项取默认值
    pub fn with_field_map(target_table: &str, field_map: FieldMap) -> ImportResult<Self> {
        validate_identifier(target_table)?;
        Ok(Self {
            target_table: target_table.trim().to_string(),
            field_map,
            import_id_source: ImportIdSource::default(),
            min_non_null_cells: default_min_non_null_cells(),
            missing_value: MissingValue::default(),
            unmapped_field_policy: UnmappedFieldPolicy::default(),
            coordinate_fields: default_coordinate_fields(),
            file_extensions: default_file_extensions(),
            post_run_statements: Vec::new(),
        })
    }

    /// 文件扩展名是否在白名单内（大小写不敏感）
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.file_extensions.iter().any(|e| *e == ext)
    }
}
