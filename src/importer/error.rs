// ==========================================
// 医院寄售库存优化 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 结构错误必须中止,不允许带着残缺数据继续计算
// ==========================================

use crate::domain::types::SchemaVariant;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构错误 =====
    #[error("数据集缺少必需列 ({variant}): {}", .missing.join(", "))]
    MissingColumns {
        variant: SchemaVariant,
        missing: Vec<String>,
    },

    #[error("无法识别数据集结构，表头: {}", .headers.join(", "))]
    UnknownSchema { headers: Vec<String> },

    #[error("数据集为空")]
    EmptyDataset,
}

impl ImportError {
    /// 缺失列清单（仅结构错误有值）
    pub fn missing_columns(&self) -> &[String] {
        match self {
            ImportError::MissingColumns { missing, .. } => missing,
            _ => &[],
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
