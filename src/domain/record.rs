// ==========================================
// 工作项批量导入 - 创建记录模型
// ==========================================
// 职责: 合并后的工作项创建请求体（逐条送往创建接口）
// ==========================================

use serde::{Deserialize, Serialize};

/// 选项引用 {label, value}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionRef {
    pub label: String,
    pub value: String,
}

impl OptionRef {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

// ==========================================
// FieldValue - 按字段类型编码后的结构化值
// ==========================================
// 序列化为接口所需的裸 JSON 形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 未解析到值（序列化为 null）
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
    IntegerList(Vec<i64>),
    TextList(Vec<String>),
    Option(OptionRef),
    OptionList(Vec<OptionRef>),
    /// 复合字段: 每行一组子字段值
    Compound(Vec<Vec<FieldValuePair>>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

/// 字段 key + 值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValuePair {
    pub field_key: String,
    pub field_value: FieldValue,
}

impl FieldValuePair {
    pub fn new(field_key: impl Into<String>, field_value: FieldValue) -> Self {
        Self {
            field_key: field_key.into(),
            field_value,
        }
    }
}

// ==========================================
// CreationRecord - 工作项创建记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationRecord {
    pub row_number: usize, // 主行行号
    pub name: String,
    pub template_id: Option<i64>,
    pub field_value_pairs: Vec<FieldValuePair>,
}

impl CreationRecord {
    pub fn field(&self, field_key: &str) -> Option<&FieldValuePair> {
        self.field_value_pairs
            .iter()
            .find(|pair| pair.field_key == field_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_wire_shape() {
        let pairs = vec![
            FieldValuePair::new("priority", FieldValue::Option(OptionRef::new("P0", "opt_p0"))),
            FieldValuePair::new("related", FieldValue::IntegerList(vec![1, 2])),
            FieldValuePair::new("owner", FieldValue::Empty),
            FieldValuePair::new(
                "steps",
                FieldValue::Compound(vec![vec![FieldValuePair::new(
                    "step",
                    FieldValue::Text("打开应用".to_string()),
                )]]),
            ),
        ];

        let value = serde_json::to_value(&pairs).unwrap();
        assert_eq!(
            value,
            json!([
                {"field_key": "priority", "field_value": {"label": "P0", "value": "opt_p0"}},
                {"field_key": "related", "field_value": [1, 2]},
                {"field_key": "owner", "field_value": null},
                {"field_key": "steps", "field_value": [[{"field_key": "step", "field_value": "打开应用"}]]}
            ])
        );
    }
}
