// ==========================================
// 医院寄售库存优化 - 补货建议领域模型
// ==========================================
// 派生实体: 聚合统计 → 分级结果 → 建议行 → 汇总/透视
// 红线: 派生实体只读,每个阶段生成新表,不原地修改
// ==========================================

use crate::domain::types::{ActivityClass, ExpiryRisk, ExpiryStatus, StockAction, UsageFamily};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

// ==========================================
// AggregateStats - 时间窗聚合统计
// ==========================================
// 不变量: 窗口内无动销时,和/计数为 0 而非缺失
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub consumption_window: i64,              // 近 W 天消耗合计
    pub first_activity: Option<NaiveDate>,    // 近 L 天首次动销日期
    pub days_active: Option<i64>,             // as_of - first_activity（整天）
    pub movement_count: usize,                // 近 L 天动销次数
    pub max_movement_qty: i64,                // 近 L 天单次最大动销量
    pub mean_interval_days: Option<f64>,      // 近 L 天相邻动销平均间隔（少于 2 次为 None）
}

// ==========================================
// ClassificationResult - 活跃度分级结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub activity_quotient: f64, // 活跃商（天/次,无动销为哨兵值）
    pub class: ActivityClass,
    pub safety_stock: i64,
}

// ==========================================
// RecommendationRow - 补货建议输出行
// ==========================================
// 字段命名对齐原始报表列名,透视/着色所需字段齐全
// 差值口径: Difference = Current_Stock - Recommended（正=过剩,负=短缺）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRow {
    // ===== 标识 =====
    #[serde(rename = "Hospital_ID")]
    pub hospital_id: String,
    #[serde(rename = "Hospital_Name")]
    pub hospital_name: String,
    #[serde(rename = "Product_ID")]
    pub product_id: String,
    #[serde(rename = "Product_Name")]
    pub product_name: String,
    #[serde(rename = "Product_Category")]
    pub product_category: String,
    #[serde(rename = "Usage_Family")]
    pub usage_family: UsageFamily,

    // ===== 聚合 =====
    #[serde(rename = "Consumption_Window")]
    pub consumption_window: i64,
    #[serde(rename = "Avg_Weekly")]
    pub weekly_consumption: f64,
    #[serde(rename = "Days_Active")]
    pub days_active: Option<i64>,
    #[serde(rename = "Number_of_Consumptions")]
    pub movement_count: usize,
    #[serde(rename = "Max_Consumption")]
    pub max_movement_qty: i64,
    #[serde(rename = "Mean_Interval_Days")]
    pub mean_interval_days: Option<f64>,

    // ===== 分级 =====
    #[serde(rename = "Activity_Quotient")]
    pub activity_quotient: f64,
    #[serde(rename = "Class")]
    pub class: ActivityClass,
    #[serde(rename = "SafetyStock")]
    pub safety_stock: i64,

    // ===== 建议 =====
    #[serde(rename = "Current_Stock")]
    pub current_stock: i64,
    #[serde(rename = "Recommended")]
    pub recommended: i64,
    #[serde(rename = "Difference")]
    pub difference: i64,

    // ===== 效期 =====
    #[serde(rename = "Expiry_Date")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(rename = "Days_To_Expiry")]
    pub days_to_expiry: Option<i64>,
    #[serde(rename = "Expiry_Status")]
    pub expiry_status: ExpiryStatus,
    #[serde(rename = "Expiry_Risk")]
    pub expiry_risk: ExpiryRisk,

    // ===== 动作 =====
    #[serde(rename = "Action")]
    pub action: StockAction,
}

// ==========================================
// RecommendationSummary - 关键指标汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationSummary {
    pub item_count: usize,
    pub total_consumption_window: i64,
    pub total_current_stock: i64,
    pub total_recommended: i64,
    pub reduction_needed: i64, // 正差值合计
    pub increase_needed: i64,  // 负差值合计取反
    pub expired_count: usize,
    pub expiring_soon_count: usize,
}

// ==========================================
// PivotTable - 透视表
// ==========================================
// 行/列标签有序,缺失单元格视为 0
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PivotTable {
    pub row_field: String,
    pub column_field: String,
    pub value_field: String,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub cells: BTreeMap<String, BTreeMap<String, i64>>,
}

impl PivotTable {
    /// 读取单元格值（缺失为 0）
    pub fn value(&self, row: &str, column: &str) -> i64 {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// 行合计
    pub fn row_total(&self, row: &str) -> i64 {
        self.cells
            .get(row)
            .map(|r| r.values().fold(0i64, |acc, v| acc.saturating_add(*v)))
            .unwrap_or(0)
    }
}
