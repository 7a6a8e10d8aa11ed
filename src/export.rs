// ==========================================
// 医院寄售库存优化 - 结果导出
// ==========================================
// 支持: CSV（原始报表列名）/ JSON（完整报告）
// ==========================================

use crate::domain::recommendation::{PivotTable, RecommendationRow};
use crate::engine::RecommendationReport;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// 结果表列名（与 RecommendationRow 序列化字段一致）
pub const RESULT_COLUMNS: &[&str] = &[
    "Hospital_ID",
    "Hospital_Name",
    "Product_ID",
    "Product_Name",
    "Product_Category",
    "Usage_Family",
    "Consumption_Window",
    "Avg_Weekly",
    "Days_Active",
    "Number_of_Consumptions",
    "Max_Consumption",
    "Mean_Interval_Days",
    "Activity_Quotient",
    "Class",
    "SafetyStock",
    "Current_Stock",
    "Recommended",
    "Difference",
    "Expiry_Date",
    "Days_To_Expiry",
    "Expiry_Status",
    "Expiry_Risk",
    "Action",
];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("不支持的导出格式: {0}（仅支持 csv/json）")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 结果行 → CSV（空结果也输出表头）
pub fn write_rows_csv<W: Write>(rows: &[RecommendationRow], writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(RESULT_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// 完整报告 → JSON
pub fn write_report_json<W: Write>(report: &RecommendationReport, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// 透视表 → CSV（首列为行标签,末列为行合计）
pub fn write_pivot_csv<W: Write>(pivot: &PivotTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    let mut header = vec![pivot.row_field.clone()];
    header.extend(pivot.columns.iter().cloned());
    header.push("Total".to_string());
    wtr.write_record(&header)?;

    for row in &pivot.rows {
        let mut record = vec![row.clone()];
        record.extend(pivot.columns.iter().map(|c| pivot.value(row, c).to_string()));
        record.push(pivot.row_total(row).to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// 透视表 → JSON
pub fn write_pivot_json<W: Write>(pivot: &PivotTable, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, pivot)?;
    Ok(())
}

/// 透视表按格式输出
pub fn write_pivot<W: Write>(
    pivot: &PivotTable,
    writer: W,
    format: ExportFormat,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Csv => write_pivot_csv(pivot, writer),
        ExportFormat::Json => write_pivot_json(pivot, writer),
    }
}

/// 按格式导出到文件
pub fn export_to_path<P: AsRef<Path>>(
    report: &RecommendationReport,
    path: P,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    match format {
        ExportFormat::Csv => write_rows_csv(&report.rows, writer)?,
        ExportFormat::Json => write_report_json(report, writer)?,
    }
    info!(path = %path.display(), format = ?format, rows = report.rows.len(), "结果已导出");
    Ok(())
}
