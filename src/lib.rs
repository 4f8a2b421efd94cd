// ==========================================
// 工作项批量导入 - 核心库
// ==========================================
// 职责: 表格 → 字段 Schema 校验 → 工作项创建记录
// 技术栈: Rust + calamine/csv + tokio
// 定位: 导入核心; 展示层与 HTTP 传输由调用方提供
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 字段 Schema / 表格 / 记录
pub mod domain;

// 导入层 - 解析、校验、合并
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 外部协作方 - 字段/用户/创建接口
pub mod client;

// API 层 - 导入门面
pub mod api;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, CreationRecord, FieldOption, FieldSchemaNode, FieldType, FieldValue,
    FieldValuePair, FlattenedField, ImportPreview, OptionRef, SpreadsheetRow, TemplateBrief,
    UserIdentity, ValidationReport,
};

// 导入管道
pub use importer::{
    ImportContext, ImportError, ImportResult, WorkItemImporter, WorkItemImporterImpl,
};

// 配置
pub use config::{ConfigManager, ImportConfigReader, ImportSettings};

// 外部协作方
pub use client::{
    ClientError, JsonSchemaFile, SchemaSource, StaticUserDirectory, UserDirectory,
    WorkItemCreator,
};

// API
pub use api::{ApiError, ApiResult, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工作项批量导入";
