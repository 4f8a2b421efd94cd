// ==========================================
// 工作项批量导入 - API 层错误类型
// ==========================================
// 职责: 汇总导入层 / 外部协作方错误,并定义创建前置检查失败原因
// ==========================================

use crate::client::ClientError;
use crate::importer::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 创建前置检查
    // ==========================================
    #[error("当前工作项类型没有启用的模板")]
    NoTemplateConfigured,

    #[error("表格缺少名称列: {0}")]
    NameFieldMissing(String),

    #[error("没有可创建的记录")]
    NoRecords,

    #[error("存在校验未通过的列: {}", .columns.join(", "))]
    ValidationFailed { columns: Vec<String> },

    // ==========================================
    // 下层错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("外部接口调用失败: {0}")]
    Client(#[from] ClientError),

    #[error("配置读取失败: {0}")]
    Config(String),
}

impl ApiError {
    /// 是否为创建前置检查失败（可由用户修正表格后重试）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ApiError::NoTemplateConfigured
                | ApiError::NameFieldMissing(_)
                | ApiError::NoRecords
                | ApiError::ValidationFailed { .. }
        )
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
