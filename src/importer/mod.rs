// ==========================================
// 工作项批量导入 - 导入层
// ==========================================
// 职责: 表格 → 校验报告 + 工作项创建记录
// 支持: Excel (.xlsx), CSV
// ==========================================

// 模块声明
pub mod cell_validator;
pub mod context;
pub mod error;
pub mod file_parser;
pub mod header_validator;
pub mod record_merger;
pub mod schema_indexer;
pub mod user_resolver;
pub mod value_codec;
pub mod work_item_importer_impl;
pub mod work_item_importer_trait;

// 重导出核心类型
pub use cell_validator::CellValidator as CellValidatorImpl;
pub use context::ImportContext;
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileFormat, UniversalFileParser};
pub use header_validator::HeaderValidator as HeaderValidatorImpl;
pub use record_merger::{RecordMerger as RecordMergerImpl, RowKind};
pub use schema_indexer::{FieldIndex, SchemaIndexer, TREE_PATH_SEPARATOR};
pub use user_resolver::{UserCache, UserResolver};
pub use value_codec::{encode, split_tokens, MULTI_VALUE_DELIMITER};
pub use work_item_importer_impl::WorkItemImporterImpl;

// 重导出 Trait 接口
pub use work_item_importer_trait::{
    CellValidator, FileParser, HeaderValidator, RecordMerger, WorkItemImporter,
};
