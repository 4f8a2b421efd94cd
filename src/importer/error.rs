// ==========================================
// 工作项批量导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 仅承载致命错误; 字段/单元格问题进入 ValidationReport
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("请勿传入空表格")]
    EmptyWorkbook,

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    // ===== 数据读取错误 =====
    #[error("数据获取失败，请刷新重试: {0}")]
    DataReadFailed(String),

    // ===== 外部协作错误 =====
    #[error("用户信息查询失败: {0}")]
    UserLookupFailed(String),

    #[error("配置读取失败: {0}")]
    ConfigReadError(String),
}

impl ImportError {
    /// 是否为文件本身不可读（损坏/格式）类错误
    pub fn is_unreadable_file(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::FileReadError(_)
                | ImportError::ExcelParseError(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
