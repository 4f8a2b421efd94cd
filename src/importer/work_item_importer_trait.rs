// ==========================================
// 工作项批量导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道及各阶段组件接口（不包含实现）
// ==========================================

use crate::domain::{
    CreationRecord, FieldSchemaNode, ImportPreview, ParsedSheet, SpreadsheetRow, ValidationReport,
};
use crate::importer::context::ImportContext;
use crate::importer::error::ImportResult;
use async_trait::async_trait;

// ==========================================
// WorkItemImporter Trait
// ==========================================
// 用途: 导入管道主接口
// 实现者: WorkItemImporterImpl
#[async_trait]
pub trait WorkItemImporter: Send + Sync {
    /// 解析并校验表格,生成创建记录预览
    ///
    /// # 参数
    /// - file_name: 原始文件名（用于判断格式）
    /// - bytes: 文件内容
    /// - schema: 本次运行的字段 Schema
    ///
    /// # 返回
    /// - Ok(ImportPreview): 表头、校验报告、原始行、记录（已截断）
    /// - Err: 空表格、文件不可读、用户查询失败
    ///
    /// # 流程
    /// 1. 文件解析
    /// 2. 字段索引
    /// 3. 用户批量查询
    /// 4. 表头校验 + 单元格校验
    /// 5. 行合并
    /// 6. 记录数截断
    async fn preview(
        &self,
        file_name: &str,
        bytes: &[u8],
        schema: &[FieldSchemaNode],
    ) -> ImportResult<ImportPreview>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析第一个工作表为表头 + 数据行
    fn parse_sheet(&self, bytes: &[u8]) -> ImportResult<ParsedSheet>;
}

// ==========================================
// HeaderValidator Trait
// ==========================================
// 实现者: HeaderValidatorImpl
pub trait HeaderValidator: Send + Sync {
    /// 校验表头: 字段存在性、系统字段、类型支持、Schema 重名
    fn validate_headers(&self, headers: &[String], ctx: &ImportContext) -> ValidationReport;
}

// ==========================================
// CellValidator Trait
// ==========================================
// 实现者: CellValidatorImpl
pub trait CellValidator: Send + Sync {
    /// 校验单元格: 数字字段、单选限制、选项存在性
    fn validate_cells(&self, rows: &[SpreadsheetRow], ctx: &ImportContext) -> ValidationReport;
}

// ==========================================
// RecordMerger Trait
// ==========================================
// 实现者: RecordMergerImpl
pub trait RecordMerger: Send + Sync {
    /// 主行生成记录,续行并入前一条记录的复合字段
    fn merge_rows(&self, rows: &[SpreadsheetRow], ctx: &ImportContext) -> Vec<CreationRecord>;
}
