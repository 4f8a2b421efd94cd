// ==========================================
// 工作项批量导入 - 字段 Schema 索引器
// ==========================================
// 职责: 字段树 → 扁平索引（AllFields / SupportedFields / 模板表）
// 遍历: 显式工作栈,深度优先先序,父字段先于子字段
// ==========================================

use crate::domain::field::{FieldOption, FieldSchemaNode, FieldType, FlattenedField};
use std::collections::{HashMap, HashSet};

/// 复合显示名分隔符（仅在索引内部使用）
const COMPOSITE_SEPARATOR: &str = "\u{241E}\u{2063}";

/// 级联选项路径分隔符
pub const TREE_PATH_SEPARATOR: &str = "/";

/// 生成复合显示名
pub(crate) fn composite_name(parent_name: Option<&str>, field_name: &str) -> String {
    match parent_name {
        Some(parent) => format!("{}{}{}", parent, COMPOSITE_SEPARATOR, field_name),
        None => field_name.to_string(),
    }
}

// ==========================================
// FieldIndex - 一次导入运行的字段索引
// ==========================================
// 生命周期: 每次运行重建一次,运行中只读
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    fields: HashMap<String, FlattenedField>, // 复合显示名 → 字段（AllFields）
    order: Vec<String>,                      // 复合显示名,遍历顺序
    supported: HashSet<String>,              // SupportedFields
    display_names: Vec<String>,              // 全部字段显示名（含重名）
    templates: Vec<(String, String)>,        // 模板名 → 模板 ID,首次出现顺序
}

impl FieldIndex {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 按复合显示名查找（AllFields）
    pub fn get(&self, composite_name: &str) -> Option<&FlattenedField> {
        self.fields.get(composite_name)
    }

    /// 按遍历顺序列出全部字段
    pub fn all_fields(&self) -> impl Iterator<Item = &FlattenedField> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    /// 按遍历顺序列出可导入字段（SupportedFields）
    pub fn supported_fields(&self) -> impl Iterator<Item = &FlattenedField> {
        self.order
            .iter()
            .filter(|name| self.supported.contains(*name))
            .filter_map(|name| self.fields.get(name))
    }

    pub fn is_supported(&self, composite_name: &str) -> bool {
        self.supported.contains(composite_name)
    }

    /// 表头 → 字段
    ///
    /// 先按复合显示名精确匹配,再按字段自身显示名匹配（Schema 顺序第一个）。
    /// 模板表格中复合子字段列只写子字段名,依赖第二步命中。
    pub fn field_for_column(&self, header: &str) -> Option<&FlattenedField> {
        self.fields
            .get(header)
            .or_else(|| self.all_fields().find(|field| field.field_name == header))
    }

    /// 表头 → 可导入字段
    pub fn supported_field_for_column(&self, header: &str) -> Option<&FlattenedField> {
        self.field_for_column(header)
            .filter(|field| self.supported.contains(&field.composite_name))
    }

    /// Schema 中该显示名出现的次数
    pub fn display_name_count(&self, name: &str) -> usize {
        self.display_names.iter().filter(|n| *n == name).count()
    }

    /// 模板名 → 模板 ID
    pub fn template_id(&self, template_name: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|(name, _)| name == template_name)
            .map(|(_, id)| id.as_str())
    }

    /// Schema 中第一个模板 ID
    pub fn first_template_id(&self) -> Option<&str> {
        self.templates.first().map(|(_, id)| id.as_str())
    }

    pub fn has_templates(&self) -> bool {
        !self.templates.is_empty()
    }

    /// 顶层字段 key → 显示名（用于定位名称列）
    pub fn top_level_name_of(&self, field_key: &str) -> Option<&str> {
        self.all_fields()
            .find(|field| !field.is_compound_child() && field.field_key == field_key)
            .map(|field| field.field_name.as_str())
    }

    fn insert(&mut self, field: FlattenedField) {
        let name = field.composite_name.clone();
        self.display_names.push(field.field_name.clone());

        if field.is_importable() {
            self.supported.insert(name.clone());
        } else {
            self.supported.remove(&name);
        }

        // 复合显示名冲突时后者覆盖,位置保留首次出现
        if self.fields.insert(name.clone(), field).is_some() {
            tracing::debug!(composite_name = %name, "复合显示名重复，后出现的字段覆盖前者");
        } else {
            self.order.push(name);
        }
    }

    fn register_template(&mut self, name: &str, id: &str) {
        match self.templates.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = id.to_string(),
            None => self.templates.push((name.to_string(), id.to_string())),
        }
    }
}

// ==========================================
// SchemaIndexer - 字段索引构建器
// ==========================================
pub struct SchemaIndexer {
    system_field_keys: HashSet<String>,
}

impl SchemaIndexer {
    pub fn new<S: AsRef<str>>(system_field_keys: &[S]) -> Self {
        Self {
            system_field_keys: system_field_keys
                .iter()
                .map(|k| k.as_ref().to_string())
                .collect(),
        }
    }

    /// 构建字段索引
    ///
    /// # 说明
    /// - 空 Schema 得到空索引,不报错（由调用方提示"未配置模板"等）
    pub fn build(&self, schema: &[FieldSchemaNode]) -> FieldIndex {
        let mut index = FieldIndex::default();

        // 工作栈: (节点, 父节点); 逆序入栈以保持先序
        let mut stack: Vec<(&FieldSchemaNode, Option<&FieldSchemaNode>)> =
            schema.iter().rev().map(|node| (node, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            let field = self.flatten(node, parent);

            if node.field_type_key == FieldType::WorkItemTemplate {
                for option in node.options.iter().flatten() {
                    index.register_template(&option.label, &option.value);
                }
            }

            index.insert(field);

            // 子字段在父字段之后处理
            if let Some(children) = node.compound_fields.as_ref() {
                stack.extend(children.iter().rev().map(|child| (child, Some(node))));
            }
        }

        tracing::debug!(
            all_fields = index.len(),
            supported_fields = index.supported.len(),
            templates = index.templates.len(),
            "字段索引构建完成"
        );
        index
    }

    fn flatten(&self, node: &FieldSchemaNode, parent: Option<&FieldSchemaNode>) -> FlattenedField {
        let field_type = node.field_type_key.clone();
        let options = node.options.as_deref().unwrap_or(&[]);

        let option_map = if field_type.has_flat_options() {
            flat_option_map(options)
        } else {
            HashMap::new()
        };
        let tree_path_map = if field_type.has_tree_options() {
            tree_path_map(options)
        } else {
            HashMap::new()
        };

        FlattenedField {
            field_key: node.field_key.clone(),
            field_name: node.field_name.clone(),
            composite_name: composite_name(parent.map(|p| p.field_name.as_str()), &node.field_name),
            is_system: self.system_field_keys.contains(&node.field_key),
            is_supported_type: field_type.is_supported(),
            field_type,
            option_map,
            tree_path_map,
            parent_key: parent.map(|p| p.field_key.clone()),
            parent_name: parent.map(|p| p.field_name.clone()),
        }
    }
}

/// 平铺选项: label → value（同名 label 后者覆盖）
fn flat_option_map(options: &[FieldOption]) -> HashMap<String, String> {
    options
        .iter()
        .map(|option| (option.label.clone(), option.value.clone()))
        .collect()
}

/// 级联选项: 完整路径 "a/b/c" → 节点 value（同路径先出现者优先）
fn tree_path_map(options: &[FieldOption]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut stack: Vec<(&FieldOption, Option<String>)> =
        options.iter().rev().map(|option| (option, None)).collect();

    while let Some((option, parent_path)) = stack.pop() {
        let path = match parent_path {
            Some(parent) => format!("{}{}{}", parent, TREE_PATH_SEPARATOR, option.label),
            None => option.label.clone(),
        };

        if let Some(children) = option.children.as_ref() {
            stack.extend(
                children
                    .iter()
                    .rev()
                    .map(|child| (child, Some(path.clone()))),
            );
        }

        map.entry(path).or_insert_with(|| option.value.clone());
    }

    map
}
