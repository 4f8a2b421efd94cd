// ==========================================
// 工作项批量导入 - 外部协作方错误类型
// ==========================================
// 覆盖: 字段查询 / 用户查询 / 工作项创建
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("请求失败: {0}")]
    Transport(String),

    #[error("接口返回错误: code={code}, msg={msg}, logid={logid}")]
    Rejected { code: i64, msg: String, logid: String },

    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
