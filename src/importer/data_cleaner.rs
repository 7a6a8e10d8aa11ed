// ==========================================
// 医院寄售库存优化 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 容错日期解析 / 数量解析
// 红线: 单元格级问题只降级为"未知",不中止批次
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// 支持的日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%m/%d/%Y"];

/// 支持的日期时间格式（取日期部分）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Excel 序列日期的合理区间（1950-01-01 ~ 2100-01-01）
const EXCEL_SERIAL_MIN: f64 = 18_264.0;
const EXCEL_SERIAL_MAX: f64 = 73_051.0;

/// 单行数量绝对值上限,超出按无法解析处理
pub const MAX_QUANTITY: i64 = 1_000_000_000;

pub struct DataCleaner;

impl DataCleaner {
    /// 空白/NULL 字面量统一为 None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            match trimmed.to_lowercase().as_str() {
                "" | "nan" | "nat" | "null" | "none" | "n/a" => None,
                _ => Some(trimmed.to_string()),
            }
        })
    }

    /// 容错日期解析
    ///
    /// 支持 ISO / 斜杠 / 紧凑 / 欧式格式、带时间的格式、Excel 序列日期
    /// 无法解析 → None（由调用方记录 DataIssue）
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
                return Some(date);
            }
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
                return Some(dt.date());
            }
        }

        // Excel 序列日期（calamine 以数值文本输出）
        if let Ok(serial) = value.parse::<f64>() {
            if (EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
                let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
                return epoch.checked_add_signed(Duration::days(serial.floor() as i64));
            }
        }

        None
    }

    /// 数量解析（兼容 "5" / "5.0" / "1,200"）
    ///
    /// 小数按四舍五入取整；绝对值超过 MAX_QUANTITY 返回 None
    pub fn parse_quantity(&self, value: &str) -> Option<i64> {
        let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
        let parsed = match cleaned.parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                let f = cleaned.parse::<f64>().ok()?.round();
                if !f.is_finite() || f.abs() > MAX_QUANTITY as f64 {
                    return None;
                }
                f as i64
            }
        };
        (parsed.unsigned_abs() <= MAX_QUANTITY as u64).then_some(parsed)
    }

    /// 浮点解析（平均周消耗/平均间隔）
    pub fn parse_decimal(&self, value: &str) -> Option<f64> {
        let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
        cleaned.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}
