// ==========================================
// 工作项批量导入 - 文件解析器实现
// ==========================================
// 职责: 工作簿字节 → 表头 + 带行号的数据行
// 支持: Excel (.xlsx) / CSV (.csv),仅读取第一个工作表
// ==========================================

use crate::domain::sheet::{CellValue, ParsedSheet, SpreadsheetRow};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::work_item_importer_trait::FileParser;
use calamine::{Data, Reader, Xlsx};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::io::Cursor;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// FileFormat - 文件格式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Csv,
}

impl FileFormat {
    /// 按文件扩展名判断格式
    pub fn from_file_name(file_name: &str) -> ImportResult<Self> {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Xlsx),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// 表头处理
// ==========================================
// 空表头列被忽略; 同名表头依次追加 _1, _2 后缀
fn normalize_headers<I>(raw: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .map(|header| {
            let header = header.trim().to_string();
            if header.is_empty() {
                return None;
            }
            let count = seen.entry(header.clone()).or_insert(0);
            let name = if *count == 0 {
                header.clone()
            } else {
                tracing::warn!(header = %header, occurrence = *count, "表头重复，追加序号后缀");
                format!("{}_{}", header, count)
            };
            *count += 1;
            Some(name)
        })
        .collect()
}

fn build_row<I>(row_number: usize, headers: &[Option<String>], cells: I) -> Option<SpreadsheetRow>
where
    I: IntoIterator<Item = Option<CellValue>>,
{
    let mut row = SpreadsheetRow::new(row_number);
    for (col_idx, cell) in cells.into_iter().enumerate() {
        let (Some(Some(header)), Some(value)) = (headers.get(col_idx), cell) else {
            continue;
        };
        row.push(header.clone(), value);
    }

    // 跳过完全空白的行
    if row.cells.is_empty() {
        None
    } else {
        Some(row)
    }
}

fn text_cell(raw: &str) -> Option<CellValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(CellValue::Text(trimmed.to_string()))
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

fn record_start(record: &StringRecord) -> usize {
    record.position().map(|pos| pos.byte() as usize).unwrap_or(0)
}

/// 记录起点处被 csv 跳过的空行数
///
/// 记录位置停在上一条记录的行终止符之后,被跳过的空行位于起点处
fn skipped_blank_lines(bytes: &[u8], start: usize) -> usize {
    let rest = bytes.get(start..).unwrap_or_default();
    // CRLF 的 LF 可能尚未被上一条记录消费
    let rest = if start > 0 && bytes.get(start - 1) == Some(&b'\r') {
        rest.strip_prefix(b"\n").unwrap_or(rest)
    } else {
        rest
    };
    rest.iter()
        .take_while(|b| matches!(b, b'\n' | b'\r'))
        .filter(|b| **b == b'\n')
        .count()
}

impl FileParser for CsvParser {
    fn parse_sheet(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        let mut records = reader.records();

        // 读取表头（csv 会跳过表头之前的纯空行）
        let header_record = match records.next() {
            Some(record) => record.map_err(|e| ImportError::DataReadFailed(e.to_string()))?,
            None => return Ok(ParsedSheet::default()),
        };
        let header_slots = normalize_headers(header_record.iter().map(str::to_string));

        let mut row_number = 1 + skipped_blank_lines(bytes, record_start(&header_record));

        // 读取数据行（按记录计数,单元格内换行不占行; 被跳过的空行单独补回）
        let mut rows = Vec::new();
        for result in records {
            let record = result.map_err(|e| ImportError::DataReadFailed(e.to_string()))?;
            row_number += 1 + skipped_blank_lines(bytes, record_start(&record));

            if let Some(row) = build_row(row_number, &header_slots, record.iter().map(text_cell)) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet {
            headers: header_slots.into_iter().flatten().collect(),
            rows,
        })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

fn excel_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => text_cell(s),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        other => text_cell(&other.to_string()),
    }
}

impl FileParser for ExcelParser {
    fn parse_sheet(&self, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::DataReadFailed(e.to_string()))?;
        // 区域起点（0 基）,用于换算真实行号
        let start_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        // 提取表头（区域第一行）
        let mut sheet_rows = range.rows();
        let header_row = match sheet_rows.next() {
            Some(row) => row,
            None => return Ok(ParsedSheet::default()),
        };
        let header_slots = normalize_headers(header_row.iter().map(|cell| cell.to_string()));

        // 读取数据行
        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let row_number = start_row + idx + 2;
            if let Some(row) = build_row(row_number, &header_slots, data_row.iter().map(excel_cell)) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet {
            headers: header_slots.into_iter().flatten().collect(),
            rows,
        })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ParsedSheet> {
        match FileFormat::from_file_name(file_name)? {
            FileFormat::Csv => CsvParser.parse_sheet(bytes),
            FileFormat::Xlsx => ExcelParser.parse_sheet(bytes),
        }
    }
}
