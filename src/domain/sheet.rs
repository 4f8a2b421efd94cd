// ==========================================
// 工作项批量导入 - 表格数据模型
// ==========================================
// 职责: 文件解析产物（表头 + 带行号的数据行）
// 红线: 解析后不可变,后续阶段只读
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// 空单元格不进入行数据,因此这里没有 Empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 文本形式（数字按整数优先格式化）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
        }
    }

    /// 数字强转（失败返回 None）
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Number(_) | CellValue::Bool(_) => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ==========================================
// SheetCell / SpreadsheetRow - 数据行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetCell {
    pub header: String,
    pub value: CellValue,
}

/// 一行数据（按表头顺序,仅含非空单元格）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetRow {
    pub row_number: usize, // 表格行号（表头为第 1 行,数据从第 2 行开始）
    pub cells: Vec<SheetCell>,
}

impl SpreadsheetRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: CellValue) -> Self {
        self.push(header, value);
        self
    }

    pub fn push(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.push(SheetCell {
            header: header.into(),
            value,
        });
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|cell| cell.header == header)
            .map(|cell| &cell.value)
    }

    /// 单元格是否有非空值
    pub fn has_value(&self, header: &str) -> bool {
        self.get(header).is_some_and(|v| !v.is_blank())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|cell| (cell.header.as_str(), &cell.value))
    }
}

// ==========================================
// ParsedSheet - 解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<SpreadsheetRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text_form() {
        assert_eq!(CellValue::Number(42.0).as_text(), "42");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Bool(true).as_text(), "true");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::text(" 12 ").as_number(), Some(12.0));
        assert_eq!(CellValue::text("abc").as_number(), None);
        assert_eq!(CellValue::Bool(false).as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_row_lookup_keeps_order() {
        let row = SpreadsheetRow::new(2)
            .with_cell("名称", CellValue::text("用例1"))
            .with_cell("步骤", CellValue::text("  "));

        assert!(row.has_value("名称"));
        assert!(!row.has_value("步骤"));
        assert!(!row.has_value("不存在"));
        let headers: Vec<&str> = row.iter().map(|(h, _)| h).collect();
        assert_eq!(headers, vec!["名称", "步骤"]);
    }
}
