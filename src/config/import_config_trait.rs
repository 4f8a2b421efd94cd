// ==========================================
// 工作项批量导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::i18n::DEFAULT_LOCALE;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误
pub type ConfigReadError = Box<dyn Error + Send + Sync>;

/// 默认单次导入记录上限
pub const DEFAULT_RECORD_LIMIT: usize = 1000;

/// 默认名称字段 key
pub const DEFAULT_NAME_FIELD_KEY: &str = "name";

/// 默认系统字段（不允许导入）
pub const DEFAULT_SYSTEM_FIELD_KEYS: &[&str] = &[
    "work_item_status",
    "abort_reason",
    "work_item_type_key",
    "deleted_by",
    "updated_by",
    "watchers",
    "current_status_operator",
    "owner",
    "abort_detail",
    "business",
    "current_status_operator_role",
];

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 JSON 键值文件读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取单次导入记录上限
    ///
    /// # 默认值
    /// - 1000
    async fn get_record_limit(&self) -> Result<usize, ConfigReadError>;

    /// 获取系统字段 key 列表
    ///
    /// # 默认值
    /// - DEFAULT_SYSTEM_FIELD_KEYS
    async fn get_system_field_keys(&self) -> Result<Vec<String>, ConfigReadError>;

    /// 获取名称字段 key（其显示名即名称列表头）
    ///
    /// # 默认值
    /// - "name"
    async fn get_name_field_key(&self) -> Result<String, ConfigReadError>;

    /// 获取校验消息语言
    ///
    /// # 默认值
    /// - "zh-CN"
    async fn get_locale(&self) -> Result<String, ConfigReadError>;

    /// 获取兜底模板 ID（Schema 与启用模板均缺失时使用）
    ///
    /// # 默认值
    /// - None
    async fn get_fallback_template_id(&self) -> Result<Option<i64>, ConfigReadError>;
}

// ==========================================
// ImportSettings - 单次运行的配置快照
// ==========================================
// 生命周期: 运行开始时读取一次,运行中不可变
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub record_limit: usize,
    pub system_field_keys: Vec<String>,
    pub name_field_key: String,
    pub locale: String,
    pub fallback_template_id: Option<i64>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            record_limit: DEFAULT_RECORD_LIMIT,
            system_field_keys: DEFAULT_SYSTEM_FIELD_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            name_field_key: DEFAULT_NAME_FIELD_KEY.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            fallback_template_id: None,
        }
    }
}

impl ImportSettings {
    /// 从配置读取器生成快照
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> Result<Self, ConfigReadError> {
        Ok(Self {
            record_limit: config.get_record_limit().await?,
            system_field_keys: config.get_system_field_keys().await?,
            name_field_key: config.get_name_field_key().await?,
            locale: config.get_locale().await?,
            fallback_template_id: config.get_fallback_template_id().await?,
        })
    }
}
