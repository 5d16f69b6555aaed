// ==========================================
// 路线表批量导入 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls/.xlsm/.xlsb) / CSV (.csv)
// Excel 读取全部工作表；CSV 视为单工作表工作簿，表名取文件名主干
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, Grid, RawSheet};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

const EXCEL_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsm", "xlsb"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Excel 序列日期 → NaiveDateTime（1900 日期系统）
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// calamine 单元格 → CellValue
fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let grid = workbook
                .worksheet_range(&sheet_name)
                .map(|range| {
                    range
                        .rows()
                        .map(|row| row.iter().map(cell_from_data).collect())
                        .collect::<Grid>()
                })
                .map_err(|e| ImportError::ExcelParseError(format!("{}: {}", sheet_name, e)));

            sheets.push(RawSheet {
                name: sheet_name,
                grid,
            });
        }

        Ok(sheets)
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let sheet_name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("csv")
            .to_string();

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let grid = reader
            .records()
            .map(|record| {
                record.map(|r| {
                    r.iter()
                        .map(|v| {
                            if v.trim().is_empty() {
                                CellValue::Null
                            } else {
                                CellValue::Text(v.to_string())
                            }
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Result<Grid, csv::Error>>()
            .map_err(ImportError::from);

        Ok(vec![RawSheet {
            name: sheet_name,
            grid,
        }])
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_workbook(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse_workbook(file_path),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.parse_workbook(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_csv_parser_reads_single_sheet() {
        let mut temp_file = Builder::new()
            .prefix("CLB_Monday_")
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(temp_file, "Lat,Lon,Stop").unwrap();
        writeln!(temp_file, "30.1,-95.2,1").unwrap();
        writeln!(temp_file, ",,").unwrap();

        let sheets = CsvParser.parse_workbook(temp_file.path()).unwrap();
        assert_eq!(sheets.len(), 1);
        assert!(sheets[0].name.starts_with("CLB_Monday_"));

        let grid = sheets[0].grid.as_ref().unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0][0], CellValue::from("Lat"));
        assert_eq!(grid[1][1], CellValue::from("-95.2"));
        assert_eq!(grid[2], vec![CellValue::Null, CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn test_parser_file_not_found() {
        let result = UniversalFileParser.parse_workbook(Path::new("non_existent.xlsx"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_parser_unsupported_extension() {
        let result = UniversalFileParser.parse_workbook(Path::new("notes.txt"));
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_excel_serial_to_datetime() {
        let dt = excel_serial_to_datetime(45_170.5).unwrap();
        assert_eq!(dt.to_string(), "2023-09-01 12:00:00");
        assert!(excel_serial_to_datetime(-1.0).is_none());
    }

    #[test]
    fn test_cell_from_data() {
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Null);
        assert_eq!(cell_from_data(&Data::String("  ".to_string())), CellValue::Null);
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Integer(7));
        assert_eq!(cell_from_data(&Data::Float(-95.2)), CellValue::Number(-95.2));
    }
}
