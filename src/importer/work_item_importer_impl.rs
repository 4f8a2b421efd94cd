// ==========================================
// 工作项批量导入 - 导入管道实现
// ==========================================
// 职责: 串联各阶段,从文件字节到创建记录预览
// 流程: 解析 → 索引 → 用户查询 → 表头/单元格校验 → 行合并 → 截断
// 红线: 各阶段严格顺序执行; 索引与缓存每次运行新建
// ==========================================

use crate::client::UserDirectory;
use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::{FieldSchemaNode, ImportPreview};
use crate::importer::cell_validator::CellValidator as CellValidatorImpl;
use crate::importer::context::ImportContext;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_validator::HeaderValidator as HeaderValidatorImpl;
use crate::importer::record_merger::RecordMerger as RecordMergerImpl;
use crate::importer::user_resolver::UserResolver;
use crate::importer::work_item_importer_trait::{
    CellValidator, HeaderValidator, RecordMerger, WorkItemImporter,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

// ==========================================
// WorkItemImporterImpl - 导入管道
// ==========================================
pub struct WorkItemImporterImpl<U, C>
where
    U: UserDirectory,
    C: ImportConfigReader,
{
    // 外部协作方
    user_directory: U,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: UniversalFileParser,
    header_validator: Box<dyn HeaderValidator>,
    cell_validator: Box<dyn CellValidator>,
    record_merger: Box<dyn RecordMerger>,
}

impl<U, C> WorkItemImporterImpl<U, C>
where
    U: UserDirectory,
    C: ImportConfigReader,
{
    /// 创建导入管道
    ///
    /// # 参数
    /// - user_directory: 用户批量查询接口
    /// - config: 配置读取器
    /// - header_validator: 表头校验器
    /// - cell_validator: 单元格校验器
    /// - record_merger: 行合并器
    pub fn new(
        user_directory: U,
        config: C,
        header_validator: Box<dyn HeaderValidator>,
        cell_validator: Box<dyn CellValidator>,
        record_merger: Box<dyn RecordMerger>,
    ) -> Self {
        Self {
            user_directory,
            config,
            file_parser: UniversalFileParser,
            header_validator,
            cell_validator,
            record_merger,
        }
    }

    /// 使用默认组件创建导入管道
    pub fn with_default_components(user_directory: U, config: C) -> Self {
        Self::new(
            user_directory,
            config,
            Box::new(HeaderValidatorImpl),
            Box::new(CellValidatorImpl),
            Box::new(RecordMergerImpl),
        )
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 读取本次运行的配置快照
    pub async fn load_settings(&self) -> ImportResult<ImportSettings> {
        ImportSettings::load(&self.config)
            .await
            .map_err(|e| ImportError::ConfigReadError(e.to_string()))
    }

    /// 以给定配置快照执行一次完整导入
    #[instrument(skip(self, bytes, schema, settings), fields(run_id = tracing::field::Empty))]
    pub async fn run(
        &self,
        file_name: &str,
        bytes: &[u8],
        schema: &[FieldSchemaNode],
        settings: ImportSettings,
    ) -> ImportResult<ImportPreview> {
        // === 阶段 1: 文件解析 ===
        let sheet = self.file_parser.parse(file_name, bytes)?;
        if sheet.rows.is_empty() {
            warn!(file_name, "表格无数据行");
            return Err(ImportError::EmptyWorkbook);
        }
        info!(
            headers = sheet.headers.len(),
            rows = sheet.rows.len(),
            "文件解析完成"
        );

        // === 阶段 2: 字段索引（本次运行专用）===
        let ctx = ImportContext::new(schema, settings);
        tracing::Span::current().record("run_id", ctx.run_id.as_str());
        debug!(fields = ctx.fields.len(), "字段索引完成");

        // === 阶段 3: 用户批量查询 ===
        let users = UserResolver
            .resolve(&self.user_directory, &sheet.rows, &ctx.fields)
            .await?;
        let ctx = ctx.with_users(users);

        // === 阶段 4: 表头校验 + 单元格校验 ===
        let mut report = self.header_validator.validate_headers(&sheet.headers, &ctx);
        report.merge(self.cell_validator.validate_cells(&sheet.rows, &ctx));
        let duplicate_headers = report.duplicate_headers();

        let name_field = ctx
            .name_field()
            .unwrap_or(&ctx.settings.name_field_key)
            .to_string();
        let is_name_field_exist = ctx
            .name_field()
            .is_some_and(|name| sheet.headers.iter().any(|h| h == name));
        if !is_name_field_exist {
            warn!(
                name_field_key = %ctx.settings.name_field_key,
                "表格缺少名称列"
            );
        }

        // === 阶段 5: 行合并 ===
        let mut records = self.record_merger.merge_rows(&sheet.rows, &ctx);

        // === 阶段 6: 记录数截断 ===
        let limit = ctx.settings.record_limit;
        let is_over_limit = records.len() > limit;
        if is_over_limit {
            warn!(total = records.len(), limit, "记录数超出上限，仅保留前部记录");
            records.truncate(limit);
        }

        info!(
            records = records.len(),
            error_columns = report.error_columns().len(),
            duplicate_headers = duplicate_headers.len(),
            is_over_limit,
            "导入预览生成完成"
        );

        Ok(ImportPreview {
            run_id: ctx.run_id,
            headers: sheet.headers,
            report,
            source_rows: sheet.rows,
            duplicate_headers,
            is_over_limit,
            name_field,
            is_name_field_exist,
            records,
        })
    }
}

#[async_trait]
impl<U, C> WorkItemImporter for WorkItemImporterImpl<U, C>
where
    U: UserDirectory,
    C: ImportConfigReader,
{
    async fn preview(
        &self,
        file_name: &str,
        bytes: &[u8],
        schema: &[FieldSchemaNode],
    ) -> ImportResult<ImportPreview> {
        let settings = self.load_settings().await?;
        self.run(file_name, bytes, schema, settings).await
    }
}
