// ==========================================
// 工作项批量导入 - 用户身份模型
// ==========================================
// 职责: 用户批量查询接口返回的用户记录（按邮箱缓存）
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_key: String, // 稳定用户 key（写入字段值）
    pub email: String,    // 用户邮箱（查询键）
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub out_id: String,
    #[serde(default)]
    pub status: String, // resigned / frozen / activated
}

impl UserIdentity {
    pub fn new(user_key: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_key: user_key.into(),
            email: email.into(),
            username: String::new(),
            name_cn: String::new(),
            name_en: String::new(),
            avatar_url: String::new(),
            out_id: String::new(),
            status: String::new(),
        }
    }
}
