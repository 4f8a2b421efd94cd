// ==========================================
// 工作项批量导入 - 领域模型层
// ==========================================
// 职责: 字段 Schema、表格数据、校验报告、创建记录
// 红线: 不含解析逻辑,不含网络访问
// ==========================================

pub mod field;
pub mod preview;
pub mod record;
pub mod report;
pub mod sheet;
pub mod template;
pub mod user;

// 重导出核心类型
pub use field::{FieldOption, FieldSchemaNode, FieldType, FlattenedField};
pub use preview::ImportPreview;
pub use record::{CreationRecord, FieldValue, FieldValuePair, OptionRef};
pub use report::{ColumnReport, ValidationReport};
pub use sheet::{CellValue, ParsedSheet, SheetCell, SpreadsheetRow};
pub use template::{enabled_templates, TemplateBrief};
pub use user::UserIdentity;
