// ==========================================
// 工作项批量导入 - 导入 API
// ==========================================
// 职责: 封装一次完整导入会话
// 流程: 加载 Schema → 预览 → 创建前检查 → 逐条创建
// 红线: 创建严格串行,单条失败不中断批次
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::client::{
    ClientError, CreateWorkItemRequest, SchemaSource, UserDirectory, WorkItemCreator,
};
use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::{enabled_templates, CreationRecord, FieldSchemaNode, ImportPreview, TemplateBrief};
use crate::i18n;
use crate::importer::{ImportError, WorkItemImporter, WorkItemImporterImpl};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// 创建进度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationProgress {
    pub done: usize,
    pub total: usize,
    pub percent: u8, // 最后一条完成时为 100
}

impl CreationProgress {
    fn after(done: usize, total: usize) -> Self {
        let percent = if total == 0 || done >= total {
            100
        } else {
            (done * 100 / total) as u8
        };
        Self {
            done,
            total,
            percent,
        }
    }
}

/// 单条创建失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationFailure {
    pub row_number: usize,
    pub name: String,
    pub msg: String,
    pub logid: Option<String>,
}

impl CreationFailure {
    /// 用于反馈排查的文本: "msg-logid"
    pub fn support_line(&self) -> String {
        format!("{}-{}", self.msg, self.logid.as_deref().unwrap_or_default())
    }

    /// 面向用户的失败说明（含表格行号）
    pub fn describe(&self, locale: &str) -> String {
        let row = self.row_number.to_string();
        i18n::t_with_args(
            locale,
            "create.failed_at_row",
            &[("row", row.as_str()), ("msg", self.msg.as_str())],
        )
    }
}

/// 批量创建汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationSummary {
    pub created: usize,
    pub failures: Vec<CreationFailure>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

// ==========================================
// ImportApi
// ==========================================
pub struct ImportApi<S, U, W, C>
where
    S: SchemaSource,
    U: UserDirectory,
    W: WorkItemCreator,
    C: ImportConfigReader,
{
    schema_source: S,
    creator: W,
    importer: WorkItemImporterImpl<U, C>,
}

impl<S, U, W, C> ImportApi<S, U, W, C>
where
    S: SchemaSource,
    U: UserDirectory,
    W: WorkItemCreator,
    C: ImportConfigReader,
{
    /// 创建 ImportApi 实例
    ///
    /// # 参数
    /// - schema_source: 字段 / 模板查询接口
    /// - user_directory: 用户批量查询接口
    /// - creator: 工作项创建接口
    /// - config: 配置读取器
    pub fn new(schema_source: S, user_directory: U, creator: W, config: C) -> Self {
        Self {
            schema_source,
            creator,
            importer: WorkItemImporterImpl::with_default_components(user_directory, config),
        }
    }

    fn check_keys(project_key: &str, work_item_type_key: &str) -> ApiResult<()> {
        if project_key.trim().is_empty() {
            return Err(ApiError::InvalidInput("project_key 不能为空".to_string()));
        }
        if work_item_type_key.trim().is_empty() {
            return Err(ApiError::InvalidInput("work_item_type_key 不能为空".to_string()));
        }
        Ok(())
    }

    /// 加载字段 Schema（失败直接返回,不重试）
    pub async fn load_schema(
        &self,
        project_key: &str,
        work_item_type_key: &str,
    ) -> ApiResult<Vec<FieldSchemaNode>> {
        Self::check_keys(project_key, work_item_type_key)?;
        let fields = self
            .schema_source
            .fetch_fields(project_key, work_item_type_key)
            .await?;
        info!(project_key, work_item_type_key, fields = fields.len(), "字段加载完成");
        Ok(fields)
    }

    /// 加载启用的模板列表
    pub async fn load_templates(
        &self,
        project_key: &str,
        work_item_type_key: &str,
    ) -> ApiResult<Vec<TemplateBrief>> {
        Self::check_keys(project_key, work_item_type_key)?;
        let templates = self
            .schema_source
            .fetch_templates(project_key, work_item_type_key)
            .await?;
        Ok(enabled_templates(&templates))
    }

    /// 解析并校验表格（每次调用均使用全新的运行上下文）
    pub async fn preview(
        &self,
        file_name: &str,
        bytes: &[u8],
        schema: &[FieldSchemaNode],
    ) -> ApiResult<ImportPreview> {
        if bytes.is_empty() {
            return Err(ApiError::Import(ImportError::EmptyWorkbook));
        }
        Ok(self.importer.preview(file_name, bytes, schema).await?)
    }

    /// 创建前检查
    ///
    /// # 参数
    /// - preview: 预览结果
    /// - templates: 启用的模板
    /// - ignore_errors: 是否忽略校验错误继续创建
    pub fn ensure_ready(
        &self,
        preview: &ImportPreview,
        templates: &[TemplateBrief],
        ignore_errors: bool,
    ) -> ApiResult<()> {
        if enabled_templates(templates).is_empty() {
            return Err(ApiError::NoTemplateConfigured);
        }
        if !preview.is_name_field_exist {
            return Err(ApiError::NameFieldMissing(preview.name_field.clone()));
        }
        if preview.records.is_empty() {
            return Err(ApiError::NoRecords);
        }
        if preview.has_errors() && !ignore_errors {
            return Err(ApiError::ValidationFailed {
                columns: preview.report.error_columns(),
            });
        }
        Ok(())
    }

    /// 逐条创建工作项
    ///
    /// # 参数
    /// - records: 预览产出的创建记录
    /// - templates: 启用的模板（记录无模板时取第一个）
    /// - on_progress: 每条完成后回调
    ///
    /// # 返回
    /// - Ok(CreationSummary): 成功条数 + 失败明细
    /// - Err: 记录缺少模板且没有任何可用模板（在创建任何记录之前返回）
    #[instrument(skip(self, records, templates, on_progress), fields(total = records.len()))]
    pub async fn execute<F>(
        &self,
        project_key: &str,
        work_item_type_key: &str,
        records: &[CreationRecord],
        templates: &[TemplateBrief],
        mut on_progress: F,
    ) -> ApiResult<CreationSummary>
    where
        F: FnMut(CreationProgress) + Send,
    {
        Self::check_keys(project_key, work_item_type_key)?;
        let settings = ImportSettings::load(self.importer.config())
            .await
            .map_err(|e| ApiError::Config(e.to_string()))?;

        let default_template = enabled_templates(templates)
            .first()
            .map(|t| t.id)
            .or(settings.fallback_template_id);

        if default_template.is_none() && records.iter().any(|r| r.template_id.is_none()) {
            return Err(ApiError::NoTemplateConfigured);
        }

        let total = records.len();
        let mut summary = CreationSummary {
            started_at: Some(Utc::now()),
            ..CreationSummary::default()
        };

        if total == 0 {
            on_progress(CreationProgress::after(0, 0));
            summary.finished_at = Some(Utc::now());
            return Ok(summary);
        }

        for (idx, record) in records.iter().enumerate() {
            let template_id = record.template_id.or(default_template).unwrap_or_default();

            let request = CreateWorkItemRequest {
                project_key: project_key.to_string(),
                work_item_type_key: work_item_type_key.to_string(),
                template_id,
                name: record.name.clone(),
                field_value_pairs: record.field_value_pairs.clone(),
            };

            let failure = match self.creator.create_work_item(request).await {
                Ok(response) if response.is_success() => {
                    debug!(row_number = record.row_number, work_item_id = response.data, "工作项创建成功");
                    None
                }
                Ok(response) => Some((response.msg, response.logid)),
                Err(ClientError::Rejected { msg, logid, .. }) => Some((Some(msg), Some(logid))),
                Err(e) => Some((Some(e.to_string()), None)),
            };

            match failure {
                None => summary.created += 1,
                Some((msg, logid)) => {
                    let msg = msg
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| i18n::t(&settings.locale, "create.failed"));
                    warn!(
                        row_number = record.row_number,
                        name = %record.name,
                        msg = %msg,
                        logid = logid.as_deref().unwrap_or(""),
                        "工作项创建失败"
                    );
                    summary.failures.push(CreationFailure {
                        row_number: record.row_number,
                        name: record.name.clone(),
                        msg,
                        logid,
                    });
                }
            }

            on_progress(CreationProgress::after(idx + 1, total));
        }

        summary.finished_at = Some(Utc::now());
        info!(
            created = summary.created,
            failed = summary.failures.len(),
            "批量创建完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percent() {
        assert_eq!(CreationProgress::after(1, 3).percent, 33);
        assert_eq!(CreationProgress::after(2, 3).percent, 66);
        assert_eq!(CreationProgress::after(3, 3).percent, 100);
        assert_eq!(CreationProgress::after(0, 0).percent, 100);
    }

    #[test]
    fn test_failure_rendering() {
        let failure = CreationFailure {
            row_number: 7,
            name: "用例".to_string(),
            msg: "Field invalid".to_string(),
            logid: None,
        };

        assert_eq!(failure.support_line(), "Field invalid-");
        assert_eq!(failure.describe("en"), "Creation failed at row 7: Field invalid.");
    }
}
