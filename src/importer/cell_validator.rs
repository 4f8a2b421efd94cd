// ==========================================
// 工作项批量导入 - 单元格校验器
// ==========================================
// 职责: 数字字段 / 单选限制 / 选项存在性
// 说明: 问题按列写入 ValidationReport,消息按行顺序追加
// ==========================================

use crate::domain::{CellValue, FlattenedField, SpreadsheetRow, ValidationReport};
use crate::importer::context::ImportContext;
use crate::importer::value_codec::split_tokens;
use crate::importer::work_item_importer_trait::CellValidator as CellValidatorTrait;

pub struct CellValidator;

impl CellValidator {
    fn check_cell(
        &self,
        field: &FlattenedField,
        value: &CellValue,
        ctx: &ImportContext,
        report: &mut ValidationReport,
        header: &str,
    ) {
        let field_type = &field.field_type;

        if field_type.requires_number() {
            if value.as_number().is_none() {
                let column = report.entry(header);
                column.push_message(ctx.message("validate.enter_number"));
                column.invalid_option = true;
            }
            return;
        }

        if !field_type.is_option_constrained() {
            return;
        }

        let raw = value.as_text();
        let tokens = split_tokens(&raw);

        if field_type.is_single_choice() && tokens.len() > 1 {
            let column = report.entry(header);
            column.push_message(ctx.message("validate.single_choice_only"));
            column.invalid_option = true;
        }

        if !field.has_options() {
            let joined = tokens.join(",");
            report.entry(header).push_message(
                ctx.message_with("validate.options_not_exist", &[("options", joined.as_str())]),
            );
            return;
        }

        for token in tokens {
            if field.resolve_option(token).is_none() {
                let column = report.entry(header);
                column.push_message(ctx.message_with("validate.option_not_exist", &[("option", token)]));
                column.invalid_option = true;
            }
        }
    }
}

impl CellValidatorTrait for CellValidator {
    fn validate_cells(&self, rows: &[SpreadsheetRow], ctx: &ImportContext) -> ValidationReport {
        let mut report = ValidationReport::new();

        for row in rows {
            for (header, value) in row.iter() {
                if let Some(field) = ctx.fields.field_for_column(header) {
                    self.check_cell(field, value, ctx, &mut report, header);
                }
            }
        }

        tracing::debug!(
            rows = rows.len(),
            error_columns = report.error_columns().len(),
            "单元格校验完成"
        );
        report
    }
}
