// ==========================================
// 医院寄售库存优化 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 领域记录 + 类型转换
// 容错: 日期/数量无法解析 → 未知/0,记录 DataIssue,行保留
// ==========================================

use crate::domain::record::{DataIssue, DataIssueKind, InventorySnapshot, MovementRecord};
use crate::domain::types::{RecordType, UsageFamily};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, RawRow};
use crate::importer::schema::columns;
use chrono::NaiveDate;
use tracing::warn;

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 提取字符串字段（空白/NULL 字面量视为缺失）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        self.cleaner.normalize_null(row.get(key).map(|s| s.as_str()))
    }

    /// 提取主键字段，缺失时记录 MissingKey
    fn get_key(
        &self,
        row: &RawRow,
        key: &str,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<String> {
        let value = self.get_string(row, key);
        if value.is_none() {
            warn!(row_number, field = key, "标识字段为空，行被跳过");
            issues.push(DataIssue::new(row_number, key, DataIssueKind::MissingKey, ""));
        }
        value
    }

    /// 容错日期：缺失 → None（无问题），无法解析 → None + DateCoerced
    fn get_date(
        &self,
        row: &RawRow,
        key: &str,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<NaiveDate> {
        let raw = self.get_string(row, key)?;
        let parsed = self.cleaner.parse_date(&raw);
        if parsed.is_none() {
            warn!(row_number, field = key, value = %raw, "日期无法解析，按未知处理");
            issues.push(DataIssue::new(row_number, key, DataIssueKind::DateCoerced, &raw));
        }
        parsed
    }

    /// 容错数量：缺失或无法解析 → 0 + QuantityCoerced
    fn get_quantity(
        &self,
        row: &RawRow,
        key: &str,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> i64 {
        let raw = self.get_string(row, key).unwrap_or_default();
        match self.cleaner.parse_quantity(&raw) {
            Some(qty) => qty,
            None => {
                warn!(row_number, field = key, value = %raw, "数量无法解析，按 0 处理");
                issues.push(DataIssue::new(
                    row_number,
                    key,
                    DataIssueKind::QuantityCoerced,
                    &raw,
                ));
                0
            }
        }
    }

    /// 可选浮点字段：缺失 → None，无法解析 → None + QuantityCoerced
    fn get_decimal(
        &self,
        row: &RawRow,
        key: &str,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<f64> {
        let raw = self.get_string(row, key)?;
        let parsed = self.cleaner.parse_decimal(&raw);
        if parsed.is_none() {
            warn!(row_number, field = key, value = %raw, "数值无法解析，按缺失处理");
            issues.push(DataIssue::new(
                row_number,
                key,
                DataIssueKind::QuantityCoerced,
                &raw,
            ));
        }
        parsed
    }

    /// 使用族：缺失或无法识别 → Unknown + UnknownUsageFamily
    fn get_usage_family(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> UsageFamily {
        let raw = self.get_string(row, columns::USAGE_FAMILY).unwrap_or_default();
        let family = UsageFamily::parse(&raw);
        if family == UsageFamily::Unknown {
            warn!(row_number, value = %raw, "使用族无法识别，按保守口径处理");
            issues.push(DataIssue::new(
                row_number,
                columns::USAGE_FAMILY,
                DataIssueKind::UnknownUsageFamily,
                &raw,
            ));
        }
        family
    }
}

impl FieldMapperTrait for FieldMapper {
    fn record_type(&self, row: &RawRow) -> Option<RecordType> {
        self.get_string(row, columns::RECORD_TYPE)
            .and_then(|raw| RecordType::parse(&raw))
    }

    fn map_movement(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<MovementRecord> {
        let hospital_id = self.get_key(row, columns::HOSPITAL_ID, row_number, issues)?;
        let product_id = self.get_key(row, columns::PRODUCT_ID, row_number, issues)?;

        Some(MovementRecord {
            hospital_name: self
                .get_string(row, columns::HOSPITAL_NAME)
                .unwrap_or_else(|| hospital_id.clone()),
            product_name: self
                .get_string(row, columns::PRODUCT_NAME)
                .unwrap_or_else(|| product_id.clone()),
            product_category: self
                .get_string(row, columns::PRODUCT_CATEGORY)
                .unwrap_or_default(),
            usage_family: self.get_usage_family(row, row_number, issues),
            movement_date: self.get_date(row, columns::MOVEMENT_DATE, row_number, issues),
            movement_qty: self.get_quantity(row, columns::MOVEMENT_QTY, row_number, issues),
            hospital_id,
            product_id,
            row_number,
        })
    }

    fn map_inventory(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<InventorySnapshot> {
        let hospital_id = self.get_key(row, columns::HOSPITAL_ID, row_number, issues)?;
        let product_id = self.get_key(row, columns::PRODUCT_ID, row_number, issues)?;

        Some(InventorySnapshot {
            hospital_name: self
                .get_string(row, columns::HOSPITAL_NAME)
                .unwrap_or_else(|| hospital_id.clone()),
            product_name: self
                .get_string(row, columns::PRODUCT_NAME)
                .unwrap_or_else(|| product_id.clone()),
            product_category: self
                .get_string(row, columns::PRODUCT_CATEGORY)
                .unwrap_or_default(),
            usage_family: self.get_usage_family(row, row_number, issues),
            current_stock: self.get_quantity(row, columns::CURRENT_STOCK, row_number, issues),
            expiry_date: self.get_date(row, columns::EXPIRY_DATE, row_number, issues),
            consignment_start_date: self.get_date(
                row,
                columns::CONSIGNMENT_START_DATE,
                row_number,
                issues,
            ),
            avg_weekly_consumption: None,
            avg_interval_days: None,
            hospital_id,
            product_id,
            row_number,
        })
    }

    fn map_flat_snapshot(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<InventorySnapshot> {
        let hospital = self.get_key(row, columns::HOSPITAL, row_number, issues)?;
        let product = self.get_key(row, columns::PRODUCT, row_number, issues)?;

        // 扁平结构可无使用族列,此时不重复上报
        let usage_family = if row.contains_key(columns::USAGE_FAMILY) {
            self.get_usage_family(row, row_number, issues)
        } else {
            UsageFamily::Unknown
        };

        Some(InventorySnapshot {
            hospital_id: hospital.clone(),
            hospital_name: hospital,
            product_id: product.clone(),
            product_name: product,
            product_category: self.get_string(row, columns::CATEGORY).unwrap_or_default(),
            usage_family,
            current_stock: self.get_quantity(
                row,
                columns::CURRENT_INVENTORY,
                row_number,
                issues,
            ),
            expiry_date: self.get_date(row, columns::EXPIRY_DATE, row_number, issues),
            consignment_start_date: None,
            avg_weekly_consumption: Some(
                self.get_decimal(row, columns::AVG_WEEKLY_CONSUMPTION, row_number, issues)
                    .unwrap_or(0.0),
            ),
            avg_interval_days: self.get_decimal(
                row,
                columns::AVG_INTERVAL_DAYS,
                row_number,
                issues,
            ),
            row_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn movement_row(date: &str, qty: &str) -> RawRow {
        row(&[
            ("Record_Type", "movement"),
            ("Hospital_ID", "H1"),
            ("Hospital_Name", "St. Mary"),
            ("Product_ID", "P1"),
            ("Product_Name", "Glucose Kit"),
            ("Product_Category", "Diagnostics"),
            ("Usage_Family", "high"),
            ("Movement_Date", date),
            ("Movement_Qty", qty),
        ])
    }

    #[test]
    fn test_map_movement_basic() {
        let mapper = FieldMapper::new();
        let mut issues = Vec::new();

        let record = mapper
            .map_movement(&movement_row("2025-01-20", "5"), 2, &mut issues)
            .unwrap();

        assert_eq!(record.hospital_id, "H1");
        assert_eq!(record.product_name, "Glucose Kit");
        assert_eq!(record.usage_family, UsageFamily::High);
        assert_eq!(record.movement_date, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(record.movement_qty, 5);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unparseable_date_is_coerced_not_fatal() {
        let mapper = FieldMapper::new();
        let mut issues = Vec::new();

        let record = mapper
            .map_movement(&movement_row("yesterday-ish", "5"), 7, &mut issues)
            .unwrap();

        assert_eq!(record.movement_date, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DataIssueKind::DateCoerced);
        assert_eq!(issues[0].row_number, 7);
        assert_eq!(issues[0].column, "Movement_Date");
    }

    #[test]
    fn test_missing_key_skips_row() {
        let mapper = FieldMapper::new();
        let mut issues = Vec::new();
        let mut r = movement_row("2025-01-20", "5");
        r.insert("Product_ID".to_string(), "  ".to_string());

        assert!(mapper.map_movement(&r, 3, &mut issues).is_none());
        assert_eq!(issues[0].kind, DataIssueKind::MissingKey);
    }

    #[test]
    fn test_map_inventory_missing_stock_coerced_to_zero() {
        let mapper = FieldMapper::new();
        let mut issues = Vec::new();
        let r = row(&[
            ("Record_Type", "inventory"),
            ("Hospital_ID", "H1"),
            ("Product_ID", "P1"),
            ("Usage_Family", "low"),
            ("Current_Stock", ""),
            ("Expiry_Date", "2026-03-01"),
            ("Consignment_Start_Date", ""),
        ]);

        let snapshot = mapper.map_inventory(&r, 4, &mut issues).unwrap();

        assert_eq!(snapshot.current_stock, 0);
        assert_eq!(snapshot.hospital_name, "H1");
        assert_eq!(snapshot.expiry_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(snapshot.consignment_start_date, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, DataIssueKind::QuantityCoerced);
    }

    #[test]
    fn test_map_flat_snapshot() {
        let mapper = FieldMapper::new();
        let mut issues = Vec::new();
        let r = row(&[
            ("Hospital", "General"),
            ("Product", "Troponin"),
            ("Current_Inventory", "12"),
            ("Avg_Weekly_Consumption", "3.5"),
            ("Expiry_Date", ""),
            ("Category", "Cardiac"),
        ]);

        let snapshot = mapper.map_flat_snapshot(&r, 2, &mut issues).unwrap();

        assert_eq!(snapshot.hospital_id, "General");
        assert_eq!(snapshot.product_name, "Troponin");
        assert_eq!(snapshot.product_category, "Cardiac");
        assert_eq!(snapshot.current_stock, 12);
        assert_eq!(snapshot.avg_weekly_consumption, Some(3.5));
        assert_eq!(snapshot.usage_family, UsageFamily::Unknown);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_record_type_discriminator() {
        let mapper = FieldMapper::new();
        assert_eq!(
            mapper.record_type(&movement_row("2025-01-20", "1")),
            Some(RecordType::Movement)
        );
        assert_eq!(mapper.record_type(&row(&[("Record_Type", "other")])), None);
    }
}
