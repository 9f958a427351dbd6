use crate::domain::model::{Column, ExportRow};
use crate::domain::ports::TableSink;
use crate::utils::error::{EtlError, Result};
use rust_xlsxwriter::Workbook;

pub const SHEET_NAME: &str = "Sheet1";

/// 單一工作表，第一列為表頭
pub struct XlsxSink {
    file_name: String,
}

impl XlsxSink {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl TableSink for XlsxSink {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn render(&self, rows: &[ExportRow], columns: &[Column]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, column) in columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, column.header)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, column) in columns.iter().enumerate() {
                let value = row.get(column.field);
                if !value.is_empty() {
                    worksheet.write_string(row_num, col as u16, value)?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

pub struct CsvSink {
    file_name: String,
}

impl CsvSink {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl TableSink for CsvSink {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn render(&self, rows: &[ExportRow], columns: &[Column]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(columns.iter().map(|c| c.header))?;
        for row in rows {
            writer.write_record(columns.iter().map(|c| row.get(c.field)))?;
        }
        writer
            .into_inner()
            .map_err(|e| EtlError::IoError(e.into_error()))
    }
}
