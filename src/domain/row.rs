// ==========================================
// 路线表批量导入 - 行结构
// ==========================================
// 行 = 有序的 (外部字段名, 值) 对列表
// 列名与值始终成对携带，不存在两个独立迭代的集合
// ==========================================

use crate::domain::types::CellValue;

/// 单个字段（外部列名 + 值）
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: CellValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 一行数据
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 外部字段名（保持顺序）
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// 按字段名取值（重复列名时取第一个）
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// 与另一行的外部字段名序列是否完全一致
    pub fn same_shape(&self, other: &Row) -> bool {
        self.keys().eq(other.keys())
    }
}

impl FromIterator<Field> for Row {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
