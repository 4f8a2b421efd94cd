// ==========================================
// 工作项批量导入 - 表头校验器
// ==========================================
// 职责: 表头 → 字段存在性 / 系统字段 / 类型支持 / Schema 重名
// 说明: 问题写入 ValidationReport,不中断导入
// ==========================================

use crate::domain::ValidationReport;
use crate::importer::context::ImportContext;
use crate::importer::work_item_importer_trait::HeaderValidator as HeaderValidatorTrait;

pub struct HeaderValidator;

impl HeaderValidatorTrait for HeaderValidator {
    fn validate_headers(&self, headers: &[String], ctx: &ImportContext) -> ValidationReport {
        let mut report = ValidationReport::for_headers(headers);

        for header in headers {
            let message_key = match ctx.fields.field_for_column(header) {
                None => Some("validate.field_not_exist"),
                Some(field) if field.is_system => Some("validate.system_field"),
                Some(field) if !field.is_supported_type => Some("validate.unsupported_type"),
                Some(_) => None,
            };

            match message_key {
                Some(key) => report.entry(header).push_message(ctx.message(key)),
                // 合法表头: Schema 中同名字段 ≥ 2 个时无法区分,仅提示
                None if ctx.fields.display_name_count(header) >= 2 => {
                    tracing::warn!(header = %header, "Schema 中存在同名字段");
                    report.entry(header).duplicate_header = true;
                }
                None => {}
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::domain::{FieldSchemaNode, FieldType};
    use crate::importer::schema_indexer::composite_name;

    fn context() -> ImportContext {
        let schema = vec![
            FieldSchemaNode::new("name", "名称", FieldType::Text),
            FieldSchemaNode::new("owner", "负责人", FieldType::User),
            FieldSchemaNode::new("score", "分值", FieldType::Number),
            FieldSchemaNode::new("desc_a", "描述", FieldType::Text),
            FieldSchemaNode::new("desc_b", "描述", FieldType::MultiText),
            FieldSchemaNode::new("steps", "用例步骤", FieldType::CompoundField)
                .with_compound_fields(vec![FieldSchemaNode::new("step", "步骤", FieldType::Text)]),
        ];
        ImportContext::new(&schema, ImportSettings::default())
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_errors() {
        let ctx = context();
        let report = HeaderValidator.validate_headers(&headers(&["名称", "不存在", "负责人", "分值"]), &ctx);

        assert!(!report.get("名称").unwrap().has_errors());
        assert_eq!(report.get("不存在").unwrap().messages, vec!["字段不存在".to_string()]);
        assert_eq!(report.get("负责人").unwrap().messages, vec!["系统字段不支持".to_string()]);
        assert_eq!(report.get("分值").unwrap().messages, vec!["该字段类型不支持".to_string()]);
    }

    #[test]
    fn test_duplicate_schema_names_flagged_without_error() {
        let ctx = context();
        let report = HeaderValidator.validate_headers(&headers(&["描述", "名称"]), &ctx);

        let column = report.get("描述").unwrap();
        assert!(column.duplicate_header);
        assert!(!column.has_errors());
        assert_eq!(report.duplicate_headers(), vec!["描述".to_string()]);
    }

    #[test]
    fn test_compound_child_headers_resolve() {
        let ctx = context();
        let composite = composite_name(Some("用例步骤"), "步骤");
        let report = HeaderValidator.validate_headers(&[composite.clone(), "步骤".to_string()], &ctx);

        assert!(!report.has_errors());
        assert!(report.get(&composite).is_some());
    }
}
