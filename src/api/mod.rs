// ==========================================
// 工作项批量导入 - API 层
// ==========================================
// 职责: 面向调用方的导入门面（加载 Schema → 预览 → 检查 → 逐条创建）
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{CreationFailure, CreationProgress, CreationSummary, ImportApi};
