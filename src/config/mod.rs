// ==========================================
// 工作项批量导入 - 配置层
// ==========================================
// 职责: 导入配置加载与读取,缺省回落到内置默认值
// 存储: JSON 键值文件
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_path, ConfigManager, CONFIG_PATH_ENV};
pub use import_config_trait::{
    ConfigReadError, ImportConfigReader, ImportSettings, DEFAULT_NAME_FIELD_KEY,
    DEFAULT_RECORD_LIMIT, DEFAULT_SYSTEM_FIELD_KEYS,
};
