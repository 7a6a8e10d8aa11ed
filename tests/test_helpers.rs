// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 固定 as_of、构造统一结构 CSV、写入临时文件
// ==========================================

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use consignment_optimizer::{ConsignmentDataset, DatasetLoader};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

pub const UNIFIED_HEADER: &str = "Record_Type,Hospital_ID,Hospital_Name,Product_ID,Product_Name,Product_Category,Usage_Family,Movement_Date,Movement_Qty,Current_Stock,Expiry_Date,Consignment_Start_Date";

/// 固定计算时间点: 2025-06-30 10:00:00
pub fn as_of() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 30)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// as_of 之前/之后的日期文本（负数为过去）
pub fn day(offset: i64) -> String {
    (as_of().date() + Duration::days(offset))
        .format("%Y-%m-%d")
        .to_string()
}

// ==========================================
// 统一结构 CSV 构建器
// ==========================================
pub struct DatasetCsvBuilder {
    lines: Vec<String>,
}

impl Default for DatasetCsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCsvBuilder {
    pub fn new() -> Self {
        Self {
            lines: vec![UNIFIED_HEADER.to_string()],
        }
    }

    /// 动销行（医院/产品名称由 ID 派生）
    pub fn movement(self, hospital: &str, product: &str, days_ago: i64, qty: i64) -> Self {
        self.movement_in(hospital, product, "Diagnostics", "high", days_ago, qty)
    }

    pub fn movement_in(
        mut self,
        hospital: &str,
        product: &str,
        category: &str,
        family: &str,
        days_ago: i64,
        qty: i64,
    ) -> Self {
        self.lines.push(format!(
            "movement,{h},{h} Hospital,{p},{p} Kit,{c},{f},{d},{q},,,",
            h = hospital,
            p = product,
            c = category,
            f = family,
            d = day(-days_ago),
            q = qty
        ));
        self
    }

    /// 库存行；expiry_in 为距 as_of 的天数
    pub fn inventory(self, hospital: &str, product: &str, stock: i64, expiry_in: Option<i64>) -> Self {
        self.inventory_in(hospital, product, "Diagnostics", "high", stock, expiry_in)
    }

    pub fn inventory_in(
        mut self,
        hospital: &str,
        product: &str,
        category: &str,
        family: &str,
        stock: i64,
        expiry_in: Option<i64>,
    ) -> Self {
        self.lines.push(format!(
            "inventory,{h},{h} Hospital,{p},{p} Kit,{c},{f},,,{s},{e},{start}",
            h = hospital,
            p = product,
            c = category,
            f = family,
            s = stock,
            e = expiry_in.map(day).unwrap_or_default(),
            start = day(-400)
        ));
        self
    }

    /// 原样追加一行
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut csv = self.lines.join("\n");
        csv.push('\n');
        csv
    }

    pub fn load(&self) -> ConsignmentDataset {
        DatasetLoader::default()
            .load_csv_reader(self.build().as_bytes())
            .expect("fixture dataset should load")
    }
}

/// 写入临时文件（保持返回值存活）
pub fn write_temp_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut temp_file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}
