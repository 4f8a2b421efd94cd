// ==========================================
// 工作项批量导入 - 命令行入口
// ==========================================
// 子命令:
//   preview  解析并校验表格,输出预览 JSON
//   export   校验通过后将创建请求逐条写入 JSON Lines
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use work_item_import::api::{ApiError, CreationProgress, ImportApi};
use work_item_import::client::{JsonLinesCreator, JsonSchemaFile, SchemaSource, StaticUserDirectory};
use work_item_import::config::{config_keys, ConfigManager, ImportConfigReader};
use work_item_import::importer::{ImportError, WorkItemImporter, WorkItemImporterImpl};
use work_item_import::{i18n, logging};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// 配置文件路径（默认: $WORK_ITEM_IMPORT_CONFIG 或用户配置目录）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 单次导入记录上限（覆盖配置）
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// 校验消息语言（zh-CN / en）
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// 表格与 Schema 输入
#[derive(clap::Args, Debug)]
struct SheetArgs {
    /// 字段 Schema JSON 文件
    #[arg(long)]
    schema: PathBuf,

    /// 待导入表格（.xlsx / .csv）
    #[arg(long)]
    file: PathBuf,

    /// 用户列表 JSON 文件（按邮箱匹配）
    #[arg(long)]
    users: Option<PathBuf>,

    /// 空间 key
    #[arg(long, default_value = "local")]
    project: String,

    /// 工作项类型 key
    #[arg(long, default_value = "local")]
    work_item_type: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 解析并校验表格,输出预览 JSON
    Preview {
        #[command(flatten)]
        sheet: SheetArgs,
    },
    /// 校验通过后,将创建请求逐条写入 JSON Lines 文件
    Export {
        #[command(flatten)]
        sheet: SheetArgs,

        /// 输出文件
        #[arg(long)]
        out: PathBuf,

        /// 忽略校验错误继续导出
        #[arg(long)]
        ignore_errors: bool,
    },
}

fn load_config(cli: &Cli) -> Result<ConfigManager> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::from_default_location(),
    }
    .map_err(|e| anyhow::anyhow!("{}", e))
    .context("读取配置失败")?;

    if let Some(limit) = cli.limit {
        config.set(config_keys::RECORD_LIMIT, limit.to_string());
    }
    if let Some(locale) = &cli.locale {
        if !i18n::is_available(locale) {
            bail!("不支持的语言: {}", locale);
        }
        config.set(config_keys::LOCALE, locale.clone());
    }
    Ok(config)
}

async fn load_users(path: Option<&Path>) -> Result<StaticUserDirectory> {
    match path {
        Some(path) => StaticUserDirectory::from_json_file(path)
            .await
            .with_context(|| format!("读取用户列表失败: {}", path.display())),
        None => Ok(StaticUserDirectory::default()),
    }
}

async fn read_sheet(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| import_failure(ImportError::from(e)))
        .with_context(|| format!("读取表格失败: {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok((file_name, bytes))
}

/// 文件不可读时附加提示
fn import_failure(err: ImportError) -> anyhow::Error {
    if err.is_unreadable_file() {
        anyhow::Error::new(err).context("无法读取表格，请确认文件为 .xlsx 或 .csv 且未损坏")
    } else {
        err.into()
    }
}

fn api_failure(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Import(e) => import_failure(e),
        other => other.into(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    tracing::info!("{} v{}", work_item_import::APP_NAME, work_item_import::VERSION);

    let config = load_config(&cli)?;
    let locale = config
        .get_locale()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    i18n::set_locale(&locale);

    match &cli.command {
        Commands::Preview { sheet } => {
            let schema = JsonSchemaFile::new(&sheet.schema)
                .fetch_fields(&sheet.project, &sheet.work_item_type)
                .await?;
            let importer = WorkItemImporterImpl::with_default_components(
                load_users(sheet.users.as_deref()).await?,
                config,
            );
            let (file_name, bytes) = read_sheet(&sheet.file).await?;
            let preview = importer
                .preview(&file_name, &bytes, &schema)
                .await
                .map_err(import_failure)?;

            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Commands::Export {
            sheet,
            out,
            ignore_errors,
        } => {
            let creator = JsonLinesCreator::create(out).await?;
            tracing::info!(path = %creator.path().display(), "创建请求导出文件");

            let api = ImportApi::new(
                JsonSchemaFile::new(&sheet.schema),
                load_users(sheet.users.as_deref()).await?,
                creator,
                config,
            );
            let schema = api.load_schema(&sheet.project, &sheet.work_item_type).await?;
            let templates = api
                .load_templates(&sheet.project, &sheet.work_item_type)
                .await?;
            let (file_name, bytes) = read_sheet(&sheet.file).await?;
            let preview = api
                .preview(&file_name, &bytes, &schema)
                .await
                .map_err(api_failure)?;

            api.ensure_ready(&preview, &templates, *ignore_errors)?;

            let summary = api
                .execute(
                    &sheet.project,
                    &sheet.work_item_type,
                    &preview.records,
                    &templates,
                    |progress: CreationProgress| {
                        tracing::debug!(
                            done = progress.done,
                            total = progress.total,
                            percent = progress.percent,
                            "导出进度"
                        );
                    },
                )
                .await?;

            for failure in &summary.failures {
                eprintln!("{}", failure.describe(&locale));
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
