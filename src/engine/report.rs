// ==========================================
// 医院寄售库存优化 - 汇总与透视
// ==========================================
// 职责: 关键指标汇总 + 品类×医院 / 产品×医院透视
// 红线: 行/列标签有序,缺失单元格为 0
// ==========================================

use crate::domain::recommendation::{PivotTable, RecommendationRow, RecommendationSummary};
use crate::domain::types::ExpiryStatus;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// 产品×医院透视的单元格取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotValue {
    #[default]
    Difference,
    Recommended,
    CurrentStock,
}

impl PivotValue {
    fn extract(&self, row: &RecommendationRow) -> i64 {
        match self {
            PivotValue::Difference => row.difference,
            PivotValue::Recommended => row.recommended,
            PivotValue::CurrentStock => row.current_stock,
        }
    }

    /// 对应输出列名
    pub fn column_name(&self) -> &'static str {
        match self {
            PivotValue::Difference => "Difference",
            PivotValue::Recommended => "Recommended",
            PivotValue::CurrentStock => "Current_Stock",
        }
    }
}

impl fmt::Display for PivotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// 关键指标汇总
pub fn summarize(rows: &[RecommendationRow]) -> RecommendationSummary {
    rows.iter().fold(
        RecommendationSummary {
            item_count: rows.len(),
            ..Default::default()
        },
        |mut acc, row| {
            acc.total_consumption_window =
                acc.total_consumption_window.saturating_add(row.consumption_window);
            acc.total_current_stock = acc.total_current_stock.saturating_add(row.current_stock);
            acc.total_recommended = acc.total_recommended.saturating_add(row.recommended);
            if row.difference > 0 {
                acc.reduction_needed = acc.reduction_needed.saturating_add(row.difference);
            } else {
                acc.increase_needed = acc.increase_needed.saturating_sub(row.difference);
            }
            match row.expiry_status {
                ExpiryStatus::Expired => acc.expired_count += 1,
                ExpiryStatus::ExpiringSoon => acc.expiring_soon_count += 1,
                ExpiryStatus::Ok => {}
            }
            acc
        },
    )
}

/// 透视轴
#[derive(Debug, Clone, Copy)]
enum PivotAxis {
    Category,
    Product,
    Hospital,
}

impl PivotAxis {
    fn field(&self) -> &'static str {
        match self {
            PivotAxis::Category => "Product_Category",
            PivotAxis::Product => "Product_Name",
            PivotAxis::Hospital => "Hospital_Name",
        }
    }

    fn label<'r>(&self, row: &'r RecommendationRow) -> &'r str {
        match self {
            PivotAxis::Category => &row.product_category,
            PivotAxis::Product => &row.product_name,
            PivotAxis::Hospital => &row.hospital_name,
        }
    }
}

/// 品类 × 医院（差值合计）
pub fn category_hospital_pivot(rows: &[RecommendationRow]) -> PivotTable {
    build_pivot(rows, PivotAxis::Category, PivotAxis::Hospital, PivotValue::Difference)
}

/// 产品 × 医院（单一取值；同名产品合计）
pub fn product_hospital_pivot(rows: &[RecommendationRow], value: PivotValue) -> PivotTable {
    build_pivot(rows, PivotAxis::Product, PivotAxis::Hospital, value)
}

fn build_pivot(
    rows: &[RecommendationRow],
    row_axis: PivotAxis,
    column_axis: PivotAxis,
    value: PivotValue,
) -> PivotTable {
    let mut cells: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    let mut columns: BTreeSet<String> = BTreeSet::new();

    for row in rows {
        let r = row_axis.label(row).to_string();
        let c = column_axis.label(row).to_string();
        columns.insert(c.clone());
        let cell = cells.entry(r).or_default().entry(c).or_insert(0);
        *cell = cell.saturating_add(value.extract(row));
    }

    PivotTable {
        row_field: row_axis.field().to_string(),
        column_field: column_axis.field().to_string(),
        value_field: value.column_name().to_string(),
        rows: cells.keys().cloned().collect(),
        columns: columns.into_iter().collect(),
        cells,
    }
}
