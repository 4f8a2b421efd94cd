// ==========================================
// 工作项批量导入 - 工作项模板
// ==========================================
// 职责: 工作项类型下可选模板的简要信息
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBrief {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
}

impl TemplateBrief {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// 过滤出启用的模板（保持原顺序）
pub fn enabled_templates(templates: &[TemplateBrief]) -> Vec<TemplateBrief> {
    templates.iter().filter(|t| !t.disabled).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_templates_keep_order() {
        let templates = vec![
            TemplateBrief::new(1, "旧模板").disabled(),
            TemplateBrief::new(2, "功能用例"),
            TemplateBrief::new(3, "性能用例"),
        ];

        let enabled = enabled_templates(&templates);
        let ids: Vec<i64> = enabled.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
