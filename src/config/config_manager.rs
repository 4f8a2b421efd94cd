// ==========================================
// 工作项批量导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: JSON 键值文件（key → value）
// ==========================================

use crate::config::import_config_trait::{
    ConfigReadError, ImportConfigReader, DEFAULT_NAME_FIELD_KEY, DEFAULT_RECORD_LIMIT,
    DEFAULT_SYSTEM_FIELD_KEYS,
};
use crate::i18n::{self, DEFAULT_LOCALE};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "WORK_ITEM_IMPORT_CONFIG";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 空配置（全部使用默认值）
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径（顶层须为 JSON 对象）
    ///
    /// # 说明
    /// 文件不存在时返回空配置
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::in_memory());
        }

        let raw = std::fs::read_to_string(path)?;
        let manager = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), keys = manager.values.len(), "配置加载完成");
        Ok(manager)
    }

    /// 从默认位置加载配置
    pub fn from_default_location() -> Result<Self, Box<dyn Error + Send + Sync>> {
        Self::new(default_config_path())
    }

    /// 从 JSON 字符串解析配置
    pub fn from_json_str(raw: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let root: Value = serde_json::from_str(raw)?;
        let object = root
            .as_object()
            .ok_or_else(|| "配置文件顶层必须是 JSON 对象".to_string())?;

        let mut values = HashMap::new();
        for (key, value) in object {
            if let Some(normalized) = normalize_value(value) {
                values.insert(key.clone(), normalized);
            }
        }
        Ok(Self { values })
    }

    /// 覆写单个配置项
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key).unwrap_or(default).to_string()
    }

    /// 获取所有配置的快照（JSON格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error + Send + Sync>> {
        let sorted: std::collections::BTreeMap<&String, &String> = self.values.iter().collect();
        Ok(serde_json::to_string(&sorted)?)
    }
}

/// 默认配置文件路径
///
/// 优先级: 环境变量 > 用户配置目录 > 当前目录
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("work-item-import").join("config.json"),
        None => PathBuf::from("./work-item-import.json"),
    }
}

fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(normalize_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_record_limit(&self) -> Result<usize, ConfigReadError> {
        let value = self.get_config_or_default(config_keys::RECORD_LIMIT, "1000");
        match value.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(limit),
            _ => {
                tracing::warn!(
                    config_key = config_keys::RECORD_LIMIT,
                    raw_value = %value,
                    "记录上限配置非法，使用默认值"
                );
                Ok(DEFAULT_RECORD_LIMIT)
            }
        }
    }

    async fn get_system_field_keys(&self) -> Result<Vec<String>, ConfigReadError> {
        let keys: Vec<String> = self
            .get_config_value(config_keys::SYSTEM_FIELD_KEYS)
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if keys.is_empty() {
            Ok(DEFAULT_SYSTEM_FIELD_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect())
        } else {
            Ok(keys)
        }
    }

    async fn get_name_field_key(&self) -> Result<String, ConfigReadError> {
        let value = self.get_config_or_default(config_keys::NAME_FIELD_KEY, DEFAULT_NAME_FIELD_KEY);
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_NAME_FIELD_KEY.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_locale(&self) -> Result<String, ConfigReadError> {
        let value = self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE);
        if i18n::is_available(value.trim()) {
            Ok(value.trim().to_string())
        } else {
            tracing::warn!(
                config_key = config_keys::LOCALE,
                raw_value = %value,
                "不支持的语言，使用默认语言"
            );
            Ok(DEFAULT_LOCALE.to_string())
        }
    }

    async fn get_fallback_template_id(&self) -> Result<Option<i64>, ConfigReadError> {
        Ok(self
            .get_config_value(config_keys::FALLBACK_TEMPLATE_ID)
            .and_then(|v| v.trim().parse::<i64>().ok()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 导入上限
    pub const RECORD_LIMIT: &str = "record_limit";

    // 字段过滤
    pub const SYSTEM_FIELD_KEYS: &str = "system_field_keys";
    pub const NAME_FIELD_KEY: &str = "name_field_key";

    // 消息语言
    pub const LOCALE: &str = "locale";

    // 模板兜底
    pub const FALLBACK_TEMPLATE_ID: &str = "fallback_template_id";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let config = ConfigManager::in_memory();
        let settings = ImportSettings::load(&config).await.unwrap();

        assert_eq!(settings, ImportSettings::default());
        assert_eq!(settings.record_limit, 1000);
        assert!(settings.system_field_keys.contains(&"owner".to_string()));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"record_limit": 50, "system_field_keys": ["owner", "watchers"], "locale": "en", "fallback_template_id": "12"}}"#
        )
        .unwrap();

        let config = ConfigManager::new(file.path()).unwrap();
        assert_eq!(config.get_record_limit().await.unwrap(), 50);
        assert_eq!(
            config.get_system_field_keys().await.unwrap(),
            vec!["owner".to_string(), "watchers".to_string()]
        );
        assert_eq!(config.get_locale().await.unwrap(), "en");
        assert_eq!(config.get_fallback_template_id().await.unwrap(), Some(12));
    }

    #[tokio::test]
    async fn test_invalid_values_fall_back() {
        let mut config = ConfigManager::in_memory();
        config.set(config_keys::RECORD_LIMIT, "zero");
        config.set(config_keys::LOCALE, "fr");
        config.set(config_keys::NAME_FIELD_KEY, "  ");

        assert_eq!(config.get_record_limit().await.unwrap(), DEFAULT_RECORD_LIMIT);
        assert_eq!(config.get_locale().await.unwrap(), "zh-CN");
        assert_eq!(config.get_name_field_key().await.unwrap(), "name");
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let config = ConfigManager::new("/nonexistent/work-item-import.json").unwrap();
        assert!(config.get_config_value(config_keys::RECORD_LIMIT).is_none());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(ConfigManager::from_json_str("[1, 2]").is_err());
    }

    #[test]
    fn test_snapshot_sorted() {
        let mut config = ConfigManager::in_memory();
        config.set("b", "2");
        config.set("a", "1");
        assert_eq!(config.get_config_snapshot().unwrap(), r#"{"a":"1","b":"2"}"#);
    }
}
