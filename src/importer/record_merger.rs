// ==========================================
// 工作项批量导入 - 行合并器
// ==========================================
// 职责: 数据行 → 创建记录
// 规则: 名称列非空为主行,新建记录; 否则为续行,
//       其复合字段值追加到上一条记录同名复合字段中
// ==========================================

use crate::domain::{CreationRecord, FieldType, FieldValue, FieldValuePair, SpreadsheetRow};
use crate::importer::context::ImportContext;
use crate::importer::value_codec::encode;
use crate::importer::work_item_importer_trait::RecordMerger as RecordMergerTrait;
use std::collections::HashMap;

/// 行分类（每行计算一次）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Primary { name: String },
    Continuation,
}

impl RowKind {
    pub fn classify(row: &SpreadsheetRow, name_field: Option<&str>) -> Self {
        match name_field.and_then(|name| row.get(name)) {
            Some(value) if !value.is_blank() => RowKind::Primary {
                name: value.as_text(),
            },
            _ => RowKind::Continuation,
        }
    }
}

/// 单行编码结果
struct ResolvedRow {
    pairs: Vec<FieldValuePair>,
    compound_keys: Vec<String>, // 本行出现的复合字段 key
}

pub struct RecordMerger;

impl RecordMerger {
    /// 编码一行中所有可导入列（名称列、模板列、复合字段本身除外）
    fn resolve_row(&self, row: &SpreadsheetRow, ctx: &ImportContext) -> ResolvedRow {
        let name_field = ctx.name_field();
        let mut pairs: Vec<FieldValuePair> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut compound_keys = Vec::new();

        for (header, value) in row.iter() {
            if Some(header) == name_field {
                continue;
            }
            let Some(field) = ctx.fields.supported_field_for_column(header) else {
                continue;
            };
            if matches!(
                field.field_type,
                FieldType::WorkItemTemplate | FieldType::CompoundField
            ) {
                continue;
            }

            let encoded = FieldValuePair::new(field.field_key.clone(), encode(field, value, &ctx.users));

            match &field.parent_key {
                Some(parent_key) => match positions.get(parent_key) {
                    Some(&idx) => {
                        if let FieldValue::Compound(groups) = &mut pairs[idx].field_value {
                            if let Some(group) = groups.first_mut() {
                                group.push(encoded);
                            }
                        }
                    }
                    None => {
                        positions.insert(parent_key.clone(), pairs.len());
                        compound_keys.push(parent_key.clone());
                        pairs.push(FieldValuePair::new(
                            parent_key.clone(),
                            FieldValue::Compound(vec![vec![encoded]]),
                        ));
                    }
                },
                None => match positions.get(&field.field_key) {
                    // 同一字段多列时后者覆盖
                    Some(&idx) => pairs[idx] = encoded,
                    None => {
                        positions.insert(field.field_key.clone(), pairs.len());
                        pairs.push(encoded);
                    }
                },
            }
        }

        ResolvedRow {
            pairs,
            compound_keys,
        }
    }

    /// 模板 ID: 模板列取值 → 模板表; 否则 Schema 中第一个模板
    fn template_id(&self, row: &SpreadsheetRow, ctx: &ImportContext) -> Option<i64> {
        let from_column = row.iter().find_map(|(header, value)| {
            ctx.fields
                .supported_field_for_column(header)
                .filter(|field| field.field_type == FieldType::WorkItemTemplate)
                .and_then(|_| ctx.fields.template_id(&value.as_text()))
                .and_then(parse_template_id)
        });

        from_column.or_else(|| ctx.fields.first_template_id().and_then(parse_template_id))
    }
}

fn parse_template_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id != 0)
}

impl RecordMergerTrait for RecordMerger {
    fn merge_rows(&self, rows: &[SpreadsheetRow], ctx: &ImportContext) -> Vec<CreationRecord> {
        let name_field = ctx.name_field();
        let mut records: Vec<CreationRecord> = Vec::new();
        let mut dropped = 0usize;

        for row in rows {
            let kind = RowKind::classify(row, name_field);
            let resolved = self.resolve_row(row, ctx);

            match kind {
                RowKind::Primary { name } => records.push(CreationRecord {
                    row_number: row.row_number,
                    name,
                    template_id: self.template_id(row, ctx),
                    field_value_pairs: resolved.pairs,
                }),
                RowKind::Continuation => {
                    let Some(target) = records.last_mut() else {
                        dropped += 1;
                        continue;
                    };
                    merge_continuation(target, resolved);
                }
            }
        }

        if dropped > 0 {
            tracing::debug!(dropped, "首条记录之前的续行被忽略");
        }
        records
    }
}

/// 续行的复合字段值追加到目标记录已有的复合字段
fn merge_continuation(target: &mut CreationRecord, resolved: ResolvedRow) {
    let ResolvedRow {
        pairs,
        compound_keys,
    } = resolved;
    let mut groups_by_key: HashMap<String, Vec<FieldValuePair>> = pairs
        .into_iter()
        .filter(|pair| compound_keys.contains(&pair.field_key))
        .filter_map(|pair| match pair.field_value {
            FieldValue::Compound(mut groups) if !groups.is_empty() => {
                Some((pair.field_key, groups.swap_remove(0)))
            }
            _ => None,
        })
        .collect();

    for pair in target.field_value_pairs.iter_mut() {
        if let FieldValue::Compound(groups) = &mut pair.field_value {
            if let Some(group) = groups_by_key.remove(&pair.field_key) {
                groups.push(group);
            }
        }
    }
}
