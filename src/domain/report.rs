// ==========================================
// 工作项批量导入 - 校验报告
// ==========================================
// 职责: 按列汇总表头级 + 单元格级问题
// 红线: 只追加,不丢弃
// ==========================================

use serde::{Deserialize, Serialize};

/// 单列校验结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub header: String,
    pub messages: Vec<String>,
    /// Schema 中存在同名字段（非阻断,无法区分具体字段）
    pub duplicate_header: bool,
    /// 单元格含非法选项/非法值
    pub invalid_option: bool,
}

impl ColumnReport {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Default::default()
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// 按表头顺序排列的校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub columns: Vec<ColumnReport>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按表头预建空条目
    pub fn for_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut report = Self::new();
        for header in headers {
            report.entry(header.as_ref());
        }
        report
    }

    /// 取得（或新建）某列的条目
    pub fn entry(&mut self, header: &str) -> &mut ColumnReport {
        let idx = match self.columns.iter().position(|c| c.header == header) {
            Some(idx) => idx,
            None => {
                self.columns.push(ColumnReport::new(header));
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx]
    }

    pub fn get(&self, header: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|c| c.header == header)
    }

    /// 合并另一份报告: 消息拼接,标志取或
    pub fn merge(&mut self, other: ValidationReport) {
        for column in other.columns {
            let target = self.entry(&column.header);
            target.messages.extend(column.messages);
            target.duplicate_header |= column.duplicate_header;
            target.invalid_option |= column.invalid_option;
        }
    }

    /// 是否存在任何阻断级消息
    pub fn has_errors(&self) -> bool {
        self.columns.iter().any(ColumnReport::has_errors)
    }

    /// 有消息的列
    pub fn error_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.has_errors())
            .map(|c| c.header.clone())
            .collect()
    }

    /// 被标记为重名的列（按表头顺序）
    pub fn duplicate_headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.duplicate_header)
            .map(|c| c.header.clone())
            .collect()
    }
}
