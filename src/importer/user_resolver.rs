// ==========================================
// 工作项批量导入 - 用户解析器
// ==========================================
// 职责: 收集全表用户引用 → 一次批量查询 → 会话级用户缓存
// 红线: 每次运行最多一次外部调用; 引用为空时不调用
// ==========================================

use crate::client::UserDirectory;
use crate::domain::{FieldType, SpreadsheetRow, UserIdentity};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::schema_indexer::FieldIndex;
use crate::importer::value_codec::split_tokens;
use std::collections::{HashMap, HashSet};

// ==========================================
// UserCache - 邮箱 → 用户
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct UserCache {
    by_email: HashMap<String, UserIdentity>,
}

impl UserCache {
    pub fn insert(&mut self, user: UserIdentity) {
        self.by_email.insert(user.email.clone(), user);
    }

    pub fn get(&self, email: &str) -> Option<&UserIdentity> {
        self.by_email.get(email)
    }

    /// 邮箱 → 稳定用户 key
    pub fn user_key(&self, email: &str) -> Option<&str> {
        self.get(email).map(|user| user.user_key.as_str())
    }

    pub fn len(&self) -> usize {
        self.by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_email.is_empty()
    }
}

impl FromIterator<UserIdentity> for UserCache {
    fn from_iter<I: IntoIterator<Item = UserIdentity>>(iter: I) -> Self {
        let mut cache = UserCache::default();
        for user in iter {
            cache.insert(user);
        }
        cache
    }
}

// ==========================================
// UserResolver
// ==========================================
pub struct UserResolver;

impl UserResolver {
    /// 收集用户邮箱（去重,保持首次出现顺序）
    ///
    /// # 规则
    /// - user: 仅第一个 `|` 分词计入
    /// - multi_user: 全部分词计入
    pub fn collect_emails(&self, rows: &[SpreadsheetRow], fields: &FieldIndex) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut emails = Vec::new();

        for row in rows {
            for (header, value) in row.iter() {
                let Some(field) = fields.field_for_column(header) else {
                    continue;
                };
                let raw = value.as_text();
                let tokens = split_tokens(&raw);
                let referenced: &[&str] = match field.field_type {
                    FieldType::User => &tokens[..tokens.len().min(1)],
                    FieldType::MultiUser => &tokens[..],
                    _ => continue,
                };
                for email in referenced {
                    if seen.insert(email.to_string()) {
                        emails.push(email.to_string());
                    }
                }
            }
        }

        emails
    }

    /// 批量解析用户并生成缓存
    pub async fn resolve<U: UserDirectory + ?Sized>(
        &self,
        directory: &U,
        rows: &[SpreadsheetRow],
        fields: &FieldIndex,
    ) -> ImportResult<UserCache> {
        let emails = self.collect_emails(rows, fields);
        if emails.is_empty() {
            tracing::debug!("表格中无用户引用，跳过用户查询");
            return Ok(UserCache::default());
        }

        let users = directory
            .query_users(&emails)
            .await
            .map_err(|e| ImportError::UserLookupFailed(e.to_string()))?;

        let cache: UserCache = users.into_iter().collect();
        tracing::info!(
            requested = emails.len(),
            resolved = cache.len(),
            "用户批量查询完成"
        );
        Ok(cache)
    }
}
