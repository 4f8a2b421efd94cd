// ==========================================
// 工作项批量导入 - 本地协作方实现
// ==========================================
// 职责: 以本地 JSON 文件充当字段查询 / 用户查询接口（CLI 与测试使用）
// ==========================================

use crate::client::collaborator_trait::{
    CreateWorkItemRequest, CreateWorkItemResponse, SchemaSource, UserDirectory, WorkItemCreator,
};
use crate::client::error::{ClientError, ClientResult};
use crate::domain::{FieldSchemaNode, FieldType, TemplateBrief, UserIdentity};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::io::AsyncWriteExt;

/// Schema 文件的两种形态: 字段数组 / {fields, templates}
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaDocument {
    Fields(Vec<FieldSchemaNode>),
    Full {
        fields: Vec<FieldSchemaNode>,
        #[serde(default)]
        templates: Option<Vec<TemplateBrief>>,
    },
}

// ==========================================
// JsonSchemaFile - 从 JSON 文件读取字段 Schema
// ==========================================
pub struct JsonSchemaFile {
    path: PathBuf,
}

impl JsonSchemaFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    async fn load(&self) -> ClientResult<SchemaDocument> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| {
            ClientError::Decode(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// 未提供模板列表时,取模板字段的选项作为模板
fn templates_from_fields(fields: &[FieldSchemaNode]) -> Vec<TemplateBrief> {
    fields
        .iter()
        .filter(|f| f.field_type_key == FieldType::WorkItemTemplate)
        .flat_map(|f| f.options.iter().flatten())
        .filter_map(|option| {
            option
                .value
                .trim()
                .parse::<i64>()
                .ok()
                .map(|id| TemplateBrief::new(id, option.label.clone()))
        })
        .collect()
}

#[async_trait]
impl SchemaSource for JsonSchemaFile {
    async fn fetch_fields(
        &self,
        project_key: &str,
        work_item_type_key: &str,
    ) -> ClientResult<Vec<FieldSchemaNode>> {
        tracing::debug!(
            path = %self.path.display(),
            project_key,
            work_item_type_key,
            "从本地文件读取字段"
        );
        Ok(match self.load().await? {
            SchemaDocument::Fields(fields) => fields,
            SchemaDocument::Full { fields, .. } => fields,
        })
    }

    async fn fetch_templates(
        &self,
        _project_key: &str,
        _work_item_type_key: &str,
    ) -> ClientResult<Vec<TemplateBrief>> {
        Ok(match self.load().await? {
            SchemaDocument::Fields(fields) => templates_from_fields(&fields),
            SchemaDocument::Full {
                templates: Some(templates),
                ..
            } => templates,
            SchemaDocument::Full { fields, .. } => templates_from_fields(&fields),
        })
    }
}

// ==========================================
// StaticUserDirectory - 固定用户列表
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: Vec<UserIdentity>,
}

impl StaticUserDirectory {
    pub fn new(users: Vec<UserIdentity>) -> Self {
        Self { users }
    }

    /// 从 JSON 数组文件加载用户列表
    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let users: Vec<UserIdentity> = serde_json::from_str(&raw)?;
        tracing::debug!(path = %path.as_ref().display(), users = users.len(), "用户列表加载完成");
        Ok(Self::new(users))
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn query_users(&self, emails: &[String]) -> ClientResult<Vec<UserIdentity>> {
        Ok(self
            .users
            .iter()
            .filter(|user| emails.iter().any(|email| *email == user.email))
            .cloned()
            .collect())
    }
}

// ==========================================
// JsonLinesCreator - 创建请求导出为 JSON Lines
// ==========================================
// 用途: 离线生成创建请求,交由其他工具提交
// 说明: 每条请求一行,返回本地递增 ID
pub struct JsonLinesCreator {
    path: PathBuf,
    next_id: AtomicI64,
}

impl JsonLinesCreator {
    /// 创建（或清空）输出文件
    pub async fn create<P: AsRef<Path>>(path: P) -> ClientResult<Self> {
        tokio::fs::File::create(path.as_ref()).await?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            next_id: AtomicI64::new(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WorkItemCreator for JsonLinesCreator {
    async fn create_work_item(
        &self,
        request: CreateWorkItemRequest,
    ) -> ClientResult<CreateWorkItemResponse> {
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;

        Ok(CreateWorkItemResponse::created(
            self.next_id.fetch_add(1, Ordering::SeqCst),
        ))
    }
}
