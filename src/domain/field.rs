// ==========================================
// 工作项批量导入 - 字段模型
// ==========================================
// 职责: 外部字段 Schema 的只读表示 + 扁平化后的字段索引项
// 红线: FieldSchemaNode 归外部服务所有,导入核心只读
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// FieldType - 字段类型标签
// ==========================================
// 用途: 取代字符串比较,封闭枚举便于穷尽匹配
// 未识别的类型落入 Other,原样保留标签
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    MultiText,
    Select,
    Radio,
    MultiSelect,
    Link,
    TreeSelect,
    TreeMultiSelect,
    WorkItemRelatedSelect,
    WorkItemRelatedMultiSelect,
    User,
    MultiUser,
    WorkItemTemplate,
    CompoundField,
    Number,
    Other(String),
}

impl FieldType {
    /// 从类型标签解析
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => FieldType::Text,
            "multi_text" => FieldType::MultiText,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "multi_select" => FieldType::MultiSelect,
            "link" => FieldType::Link,
            "tree_select" => FieldType::TreeSelect,
            "tree_multi_select" => FieldType::TreeMultiSelect,
            "work_item_related_select" => FieldType::WorkItemRelatedSelect,
            "work_item_related_multi_select" => FieldType::WorkItemRelatedMultiSelect,
            "user" => FieldType::User,
            "multi_user" => FieldType::MultiUser,
            "work_item_template" => FieldType::WorkItemTemplate,
            "compound_field" => FieldType::CompoundField,
            "number" => FieldType::Number,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// 类型标签
    pub fn tag(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::MultiText => "multi_text",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::MultiSelect => "multi_select",
            FieldType::Link => "link",
            FieldType::TreeSelect => "tree_select",
            FieldType::TreeMultiSelect => "tree_multi_select",
            FieldType::WorkItemRelatedSelect => "work_item_related_select",
            FieldType::WorkItemRelatedMultiSelect => "work_item_related_multi_select",
            FieldType::User => "user",
            FieldType::MultiUser => "multi_user",
            FieldType::WorkItemTemplate => "work_item_template",
            FieldType::CompoundField => "compound_field",
            FieldType::Number => "number",
            FieldType::Other(tag) => tag,
        }
    }

    /// 是否为可导入的字段类型
    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Number | FieldType::Other(_))
    }

    /// 平铺选项类型（label → value）
    pub fn has_flat_options(&self) -> bool {
        matches!(
            self,
            FieldType::Select
                | FieldType::MultiSelect
                | FieldType::Radio
                | FieldType::WorkItemTemplate
        )
    }

    /// 级联选项类型（"a/b/c" → value）
    pub fn has_tree_options(&self) -> bool {
        matches!(self, FieldType::TreeSelect | FieldType::TreeMultiSelect)
    }

    /// 受选项约束的类型（单元格须命中选项）
    pub fn is_option_constrained(&self) -> bool {
        self.has_flat_options() || self.has_tree_options()
    }

    /// 仅允许单选的类型
    pub fn is_single_choice(&self) -> bool {
        matches!(
            self,
            FieldType::Select
                | FieldType::Radio
                | FieldType::TreeSelect
                | FieldType::WorkItemTemplate
        )
    }

    /// 仅允许数字的类型
    pub fn requires_number(&self) -> bool {
        matches!(self, FieldType::WorkItemRelatedSelect)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        FieldType::from_tag(&tag)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.tag().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ==========================================
// FieldOption - 字段选项（可能为树）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub children: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item_type_key: Option<String>,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            children: None,
            work_item_type_key: None,
        }
    }

    pub fn with_children(mut self, children: Vec<FieldOption>) -> Self {
        self.children = Some(children);
        self
    }
}

// ==========================================
// FieldSchemaNode - 外部字段 Schema 节点
// ==========================================
// 用途: 字段查询接口的原始返回,compound_fields 构成树
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchemaNode {
    pub field_key: String,
    pub field_name: String,
    pub field_type_key: FieldType,
    #[serde(default)]
    pub field_alias: String,
    #[serde(default)]
    pub is_custom_field: bool,
    #[serde(default)]
    pub is_obsoleted: bool,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub compound_fields: Option<Vec<FieldSchemaNode>>,
}

impl FieldSchemaNode {
    pub fn new(
        field_key: impl Into<String>,
        field_name: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            field_key: field_key.into(),
            field_name: field_name.into(),
            field_type_key: field_type,
            field_alias: String::new(),
            is_custom_field: false,
            is_obsoleted: false,
            options: None,
            compound_fields: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_compound_fields(mut self, fields: Vec<FieldSchemaNode>) -> Self {
        self.compound_fields = Some(fields);
        self
    }
}

// ==========================================
// FlattenedField - 扁平化字段
// ==========================================
// 生命周期: 仅在一次导入运行内,随 FieldIndex 重建
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedField {
    pub field_key: String,
    pub field_name: String,            // 字段自身显示名
    pub composite_name: String,        // 复合显示名（子字段 = 父名 + 分隔符 + 子名）
    pub field_type: FieldType,
    pub option_map: HashMap<String, String>, // 平铺选项 label → value
    pub tree_path_map: HashMap<String, String>, // 级联路径 "a/b/c" → value
    pub parent_key: Option<String>,    // 所属复合字段 key
    pub parent_name: Option<String>,   // 所属复合字段显示名
    pub is_system: bool,
    pub is_supported_type: bool,
}

impl FlattenedField {
    /// 复合字段的子字段
    pub fn is_compound_child(&self) -> bool {
        self.parent_key.is_some()
    }

    /// 是否进入 SupportedFields
    pub fn is_importable(&self) -> bool {
        !self.is_system && self.is_supported_type
    }

    /// 是否有任何可解析的选项
    pub fn has_options(&self) -> bool {
        if self.field_type.has_tree_options() {
            !self.tree_path_map.is_empty()
        } else {
            !self.option_map.is_empty()
        }
    }

    /// 按字段类型查找选项值
    pub fn resolve_option(&self, label: &str) -> Option<&str> {
        let map = if self.field_type.has_tree_options() {
            &self.tree_path_map
        } else {
            &self.option_map
        };
        map.get(label).map(String::as_str)
    }
}
