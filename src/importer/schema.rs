// ==========================================
// 医院寄售库存优化 - 数据集结构校验
// ==========================================
// 职责: 识别结构变体 + 必需列校验
// 红线: 缺列即中止,返回全部缺失列名
// ==========================================

use crate::domain::types::SchemaVariant;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;

// ==========================================
// 列名常量
// ==========================================
pub mod columns {
    // 动销/库存统一结构
    pub const RECORD_TYPE: &str = "Record_Type";
    pub const HOSPITAL_ID: &str = "Hospital_ID";
    pub const HOSPITAL_NAME: &str = "Hospital_Name";
    pub const PRODUCT_ID: &str = "Product_ID";
    pub const PRODUCT_NAME: &str = "Product_Name";
    pub const PRODUCT_CATEGORY: &str = "Product_Category";
    pub const USAGE_FAMILY: &str = "Usage_Family";
    pub const MOVEMENT_DATE: &str = "Movement_Date";
    pub const MOVEMENT_QTY: &str = "Movement_Qty";
    pub const CURRENT_STOCK: &str = "Current_Stock";
    pub const EXPIRY_DATE: &str = "Expiry_Date";
    pub const CONSIGNMENT_START_DATE: &str = "Consignment_Start_Date";

    // 扁平快照结构
    pub const HOSPITAL: &str = "Hospital";
    pub const PRODUCT: &str = "Product";
    pub const CURRENT_INVENTORY: &str = "Current_Inventory";
    pub const AVG_WEEKLY_CONSUMPTION: &str = "Avg_Weekly_Consumption";
    pub const CATEGORY: &str = "Category";
    pub const AVG_INTERVAL_DAYS: &str = "Avg_Interval_Days";
}

/// 动销/库存统一结构必需列
pub const MOVEMENT_INVENTORY_COLUMNS: &[&str] = &[
    columns::RECORD_TYPE,
    columns::HOSPITAL_ID,
    columns::HOSPITAL_NAME,
    columns::PRODUCT_ID,
    columns::PRODUCT_NAME,
    columns::PRODUCT_CATEGORY,
    columns::USAGE_FAMILY,
    columns::MOVEMENT_DATE,
    columns::MOVEMENT_QTY,
    columns::CURRENT_STOCK,
    columns::EXPIRY_DATE,
    columns::CONSIGNMENT_START_DATE,
];

/// 扁平快照结构必需列
pub const FLAT_SNAPSHOT_COLUMNS: &[&str] = &[
    columns::HOSPITAL,
    columns::PRODUCT,
    columns::CURRENT_INVENTORY,
    columns::AVG_WEEKLY_CONSUMPTION,
    columns::EXPIRY_DATE,
];

impl SchemaVariant {
    /// 该结构变体的必需列
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SchemaVariant::MovementInventory => MOVEMENT_INVENTORY_COLUMNS,
            SchemaVariant::FlatSnapshot => FLAT_SNAPSHOT_COLUMNS,
        }
    }
}

// ==========================================
// SchemaValidator - 结构校验器
// ==========================================
pub struct SchemaValidator;

impl SchemaValidator {
    /// 识别结构变体
    ///
    /// 规则:
    /// 1) 含判别列 Record_Type → 统一结构
    /// 2) 含 Avg_Weekly_Consumption 或 Current_Inventory → 扁平结构
    /// 3) 否则取命中必需列更多的一方; 均未命中 → UnknownSchema
    pub fn detect_variant(&self, headers: &[String]) -> ImportResult<SchemaVariant> {
        let present: HashSet<&str> = headers.iter().map(|h| h.as_str()).collect();

        if present.contains(columns::RECORD_TYPE) {
            return Ok(SchemaVariant::MovementInventory);
        }
        if present.contains(columns::AVG_WEEKLY_CONSUMPTION)
            || present.contains(columns::CURRENT_INVENTORY)
        {
            return Ok(SchemaVariant::FlatSnapshot);
        }

        let hits = |cols: &[&str]| cols.iter().filter(|c| present.contains(*c)).count();
        let movement_hits = hits(MOVEMENT_INVENTORY_COLUMNS);
        let flat_hits = hits(FLAT_SNAPSHOT_COLUMNS);

        match (movement_hits, flat_hits) {
            (0, 0) => Err(ImportError::UnknownSchema {
                headers: headers.to_vec(),
            }),
            (m, f) if m >= f => Ok(SchemaVariant::MovementInventory),
            _ => Ok(SchemaVariant::FlatSnapshot),
        }
    }

    /// 校验必需列（缺失列按定义顺序全部列出）
    pub fn validate(&self, variant: SchemaVariant, headers: &[String]) -> ImportResult<()> {
        let present: HashSet<&str> = headers.iter().map(|h| h.as_str()).collect();
        let missing: Vec<String> = variant
            .required_columns()
            .iter()
            .filter(|c| !present.contains(*c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns { variant, missing })
        }
    }

    /// 识别 + 校验
    pub fn detect_and_validate(&self, headers: &[String]) -> ImportResult<SchemaVariant> {
        let variant = self.detect_variant(headers)?;
        self.validate(variant, headers)?;
        Ok(variant)
    }
}
