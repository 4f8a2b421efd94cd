// ==========================================
// 工作项批量导入 - 外部协作方 Trait
// ==========================================
// 职责: 定义导入核心消费的外部接口（不包含传输实现）
// 红线: 不重试; 失败原样上抛给调用方
// ==========================================

use crate::client::error::ClientResult;
use crate::domain::{FieldSchemaNode, FieldValuePair, TemplateBrief, UserIdentity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ==========================================
// SchemaSource Trait
// ==========================================
// 用途: 字段 Schema 与模板列表查询
// 实现者: JsonSchemaFile（本地文件）
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// 查询工作项类型的全部字段
    ///
    /// # 参数
    /// - project_key: 空间 key
    /// - work_item_type_key: 工作项类型 key
    async fn fetch_fields(
        &self,
        project_key: &str,
        work_item_type_key: &str,
    ) -> ClientResult<Vec<FieldSchemaNode>>;

    /// 查询工作项类型的模板列表（含已停用模板）
    async fn fetch_templates(
        &self,
        project_key: &str,
        work_item_type_key: &str,
    ) -> ClientResult<Vec<TemplateBrief>>;
}

// ==========================================
// UserDirectory Trait
// ==========================================
// 用途: 按邮箱批量查询用户
// 说明: 仅返回命中的用户,未命中的邮箱静默忽略
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn query_users(&self, emails: &[String]) -> ClientResult<Vec<UserIdentity>>;
}

// ==========================================
// WorkItemCreator Trait
// ==========================================
// 用途: 逐条创建工作项
#[async_trait]
pub trait WorkItemCreator: Send + Sync {
    async fn create_work_item(
        &self,
        request: CreateWorkItemRequest,
    ) -> ClientResult<CreateWorkItemResponse>;
}

/// 创建工作项请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkItemRequest {
    pub project_key: String,
    pub work_item_type_key: String,
    pub template_id: i64,
    pub name: String,
    pub field_value_pairs: Vec<FieldValuePair>,
}

/// 创建工作项响应（data 为新建工作项 ID）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkItemResponse {
    pub code: i64,
    #[serde(default)]
    pub data: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub logid: Option<String>,
}

impl CreateWorkItemResponse {
    pub fn created(work_item_id: i64) -> Self {
        Self {
            code: 0,
            data: work_item_id,
            msg: None,
            logid: None,
        }
    }

    /// code 非 0 或 data 为 0 均视为失败
    pub fn is_success(&self) -> bool {
        self.code == 0 && self.data != 0
    }
}
