// ==========================================
// 工作项批量导入 - 字段值编码
// ==========================================
// 职责: 单元格原始值 → 按字段类型编码的结构化值
// 红线: 纯函数,不报错; 无法解析的部分降级为空值/0
// ==========================================

use crate::domain::{CellValue, FieldType, FieldValue, FlattenedField, OptionRef};
use crate::importer::user_resolver::UserCache;

/// 多值分隔符
pub const MULTI_VALUE_DELIMITER: char = '|';

/// 按 `|` 拆分,去除首尾空白并丢弃空分词
pub fn split_tokens(raw: &str) -> Vec<&str> {
    raw.split(MULTI_VALUE_DELIMITER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// 数字强转,失败回落为 0
fn coerce_integer(raw: &str) -> i64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n as i64)
        .unwrap_or(0)
}

fn resolve_options(field: &FlattenedField, tokens: &[&str]) -> Vec<OptionRef> {
    tokens
        .iter()
        .filter_map(|label| {
            field
                .option_map
                .get(*label)
                .filter(|value| !value.is_empty())
                .map(|value| OptionRef::new(*label, value.clone()))
        })
        .collect()
}

fn resolve_tree_paths(field: &FlattenedField, tokens: &[&str]) -> Vec<String> {
    tokens
        .iter()
        .filter_map(|path| field.tree_path_map.get(*path))
        .filter(|value| !value.is_empty())
        .cloned()
        .collect()
}

/// 编码单元格值
///
/// # 参数
/// - field: 列对应的扁平化字段
/// - raw: 单元格原始值
/// - users: 本次运行的用户缓存
pub fn encode(field: &FlattenedField, raw: &CellValue, users: &UserCache) -> FieldValue {
    let text = raw.as_text();

    match &field.field_type {
        FieldType::Radio => {
            let label = text.trim();
            let value = field.option_map.get(label).cloned().unwrap_or_default();
            FieldValue::Option(OptionRef::new(label, value))
        }
        FieldType::Select => resolve_options(field, &split_tokens(&text))
            .into_iter()
            .next()
            .map(FieldValue::Option)
            .unwrap_or(FieldValue::Empty),
        FieldType::MultiSelect => {
            FieldValue::OptionList(resolve_options(field, &split_tokens(&text)))
        }
        FieldType::TreeSelect => resolve_tree_paths(field, &split_tokens(&text))
            .into_iter()
            .next()
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Empty),
        FieldType::TreeMultiSelect => {
            FieldValue::TextList(resolve_tree_paths(field, &split_tokens(&text)))
        }
        FieldType::WorkItemRelatedSelect => {
            FieldValue::Integer(raw.as_number().map(|n| n as i64).unwrap_or(0))
        }
        FieldType::WorkItemRelatedMultiSelect => FieldValue::IntegerList(
            split_tokens(&text).into_iter().map(coerce_integer).collect(),
        ),
        FieldType::User => split_tokens(&text)
            .first()
            .and_then(|email| users.user_key(email))
            .map(|key| FieldValue::Text(key.to_string()))
            .unwrap_or(FieldValue::Empty),
        FieldType::MultiUser => FieldValue::TextList(
            split_tokens(&text)
                .into_iter()
                .filter_map(|email| users.user_key(email))
                .map(str::to_string)
                .collect(),
        ),
        FieldType::Number => raw
            .as_number()
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Text(text)),
        FieldType::Text
        | FieldType::MultiText
        | FieldType::Link
        | FieldType::WorkItemTemplate
        | FieldType::CompoundField
        | FieldType::Other(_) => FieldValue::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldOption, FieldSchemaNode, UserIdentity};
    use crate::importer::schema_indexer::SchemaIndexer;

    fn field(node: FieldSchemaNode) -> FlattenedField {
        let name = node.field_name.clone();
        let index = SchemaIndexer::new::<&str>(&[]).build(&[node]);
        index.get(&name).cloned().unwrap()
    }

    fn ab_options() -> Vec<FieldOption> {
        vec![FieldOption::new("A", "1"), FieldOption::new("B", "2")]
    }

    fn users() -> UserCache {
        vec![
            UserIdentity::new("u_a", "a@x.com"),
            UserIdentity::new("u_b", "b@x.com"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_split_tokens_trims_and_drops_empty() {
        assert_eq!(split_tokens(" A | |B|"), vec!["A", "B"]);
        assert!(split_tokens("").is_empty());
    }

    #[test]
    fn test_multi_select_keeps_order() {
        let f = field(FieldSchemaNode::new("tags", "标签", FieldType::MultiSelect).with_options(ab_options()));

        let value = encode(&f, &CellValue::text("B|A|C"), &UserCache::default());

        assert_eq!(
            value,
            FieldValue::OptionList(vec![OptionRef::new("B", "2"), OptionRef::new("A", "1")])
        );
    }

    #[test]
    fn test_select_keeps_first_resolved() {
        let f = field(FieldSchemaNode::new("p", "优先级", FieldType::Select).with_options(ab_options()));
        let users = UserCache::default();

        assert_eq!(
            encode(&f, &CellValue::text("X|B|A"), &users),
            FieldValue::Option(OptionRef::new("B", "2"))
        );
        assert_eq!(encode(&f, &CellValue::text("X"), &users), FieldValue::Empty);
    }

    #[test]
    fn test_radio_label_is_trimmed() {
        let f = field(FieldSchemaNode::new("r", "结果", FieldType::Radio).with_options(ab_options()));

        assert_eq!(
            encode(&f, &CellValue::text("  A "), &UserCache::default()),
            FieldValue::Option(OptionRef::new("A", "1"))
        );
    }

    #[test]
    fn test_radio_unresolved_has_empty_value() {
        let f = field(FieldSchemaNode::new("r", "结果", FieldType::Radio).with_options(ab_options()));

        assert_eq!(
            encode(&f, &CellValue::text("Z"), &UserCache::default()),
            FieldValue::Option(OptionRef::new("Z", ""))
        );
    }

    #[test]
    fn test_tree_select_paths() {
        let options = vec![FieldOption::new("端", "e").with_children(vec![
            FieldOption::new("iOS", "e_ios"),
            FieldOption::new("Android", "e_android"),
        ])];
        let single = field(
            FieldSchemaNode::new("m", "模块", FieldType::TreeSelect).with_options(options.clone()),
        );
        let multi = field(
            FieldSchemaNode::new("ms", "多模块", FieldType::TreeMultiSelect).with_options(options),
        );
        let users = UserCache::default();

        assert_eq!(
            encode(&single, &CellValue::text("端/iOS|端"), &users),
            FieldValue::Text("e_ios".to_string())
        );
        assert_eq!(
            encode(&multi, &CellValue::text("端/Android|iOS|端"), &users),
            FieldValue::TextList(vec!["e_android".to_string(), "e".to_string()])
        );
    }

    #[test]
    fn test_related_select_never_fails() {
        let single = field(FieldSchemaNode::new("rel", "关联", FieldType::WorkItemRelatedSelect));
        let multi = field(FieldSchemaNode::new("rels", "多关联", FieldType::WorkItemRelatedMultiSelect));
        let users = UserCache::default();

        assert_eq!(encode(&single, &CellValue::Number(123.0), &users), FieldValue::Integer(123));
        assert_eq!(encode(&single, &CellValue::text("abc"), &users), FieldValue::Integer(0));
        assert_eq!(
            encode(&multi, &CellValue::text("1|x|3"), &users),
            FieldValue::IntegerList(vec![1, 0, 3])
        );
        assert_eq!(encode(&multi, &CellValue::text(" "), &users), FieldValue::IntegerList(vec![]));
    }

    #[test]
    fn test_user_fields_resolve_through_cache() {
        let single = field(FieldSchemaNode::new("qa", "测试", FieldType::User));
        let multi = field(FieldSchemaNode::new("devs", "开发", FieldType::MultiUser));
        let users = users();

        assert_eq!(
            encode(&single, &CellValue::text("b@x.com|a@x.com"), &users),
            FieldValue::Text("u_b".to_string())
        );
        assert_eq!(encode(&single, &CellValue::text("zz@x.com"), &users), FieldValue::Empty);
        assert_eq!(
            encode(&multi, &CellValue::text("a@x.com|zz@x.com|b@x.com"), &users),
            FieldValue::TextList(vec!["u_a".to_string(), "u_b".to_string()])
        );
    }

    #[test]
    fn test_pass_through_stringifies_numbers() {
        let text = field(FieldSchemaNode::new("desc", "描述", FieldType::Text));
        let number = field(FieldSchemaNode::new("score", "分值", FieldType::Number));
        let users = UserCache::default();

        assert_eq!(encode(&text, &CellValue::Number(42.0), &users), FieldValue::Text("42".to_string()));
        assert_eq!(encode(&number, &CellValue::Number(4.5), &users), FieldValue::Number(4.5));
    }

    #[test]
    fn test_encode_is_repeatable() {
        let f = field(FieldSchemaNode::new("tags", "标签", FieldType::MultiSelect).with_options(ab_options()));
        let users = UserCache::default();
        let raw = CellValue::text("A|B");

        assert_eq!(encode(&f, &raw, &users), encode(&f, &raw, &users));
    }
}
