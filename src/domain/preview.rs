// ==========================================
// 工作项批量导入 - 预览结果
// ==========================================
// 职责: 一次导入运行的完整产物（供展示层与创建阶段使用）
// ==========================================

use crate::domain::record::CreationRecord;
use crate::domain::report::ValidationReport;
use crate::domain::sheet::SpreadsheetRow;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub run_id: String,
    pub headers: Vec<String>,
    pub report: ValidationReport,
    pub source_rows: Vec<SpreadsheetRow>, // 原始行数据（展示用）
    pub duplicate_headers: Vec<String>,
    pub is_over_limit: bool,
    pub name_field: String, // 名称列表头（Schema 缺少名称字段时为字段 key）
    pub is_name_field_exist: bool,
    pub records: Vec<CreationRecord>, // 已截断至上限
}

impl ImportPreview {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}
