// ==========================================
// 工作项批量导入 - 运行上下文
// ==========================================
// 职责: 单次导入运行的全部索引与缓存
// 生命周期: 每次运行新建,运行结束即丢弃,不跨运行共享
// ==========================================

use crate::config::ImportSettings;
use crate::domain::FieldSchemaNode;
use crate::i18n;
use crate::importer::schema_indexer::{FieldIndex, SchemaIndexer};
use crate::importer::user_resolver::UserCache;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ImportContext {
    pub run_id: String,
    pub settings: ImportSettings,
    pub fields: FieldIndex,
    pub users: UserCache,
}

impl ImportContext {
    /// 基于本次 Schema 与配置快照新建上下文（用户缓存为空）
    pub fn new(schema: &[FieldSchemaNode], settings: ImportSettings) -> Self {
        let fields = SchemaIndexer::new(&settings.system_field_keys).build(schema);
        Self {
            run_id: Uuid::new_v4().to_string(),
            settings,
            fields,
            users: UserCache::default(),
        }
    }

    pub fn with_users(mut self, users: UserCache) -> Self {
        self.users = users;
        self
    }

    pub fn locale(&self) -> &str {
        &self.settings.locale
    }

    /// 名称列表头（名称字段的显示名）
    pub fn name_field(&self) -> Option<&str> {
        self.fields.top_level_name_of(&self.settings.name_field_key)
    }

    pub fn message(&self, key: &str) -> String {
        i18n::t(self.locale(), key)
    }

    pub fn message_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        i18n::t_with_args(self.locale(), key, args)
    }
}
