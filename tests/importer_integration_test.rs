// ==========================================
// DatasetLoader 集成测试
// ==========================================
// 测试目标: 文件 → 结构校验 → 字段映射 → 数据集
// ==========================================

mod test_helpers;

use consignment_optimizer::config::DuplicatePolicy;
use consignment_optimizer::importer::{DatasetLoader, ImportError};
use consignment_optimizer::{logging, DataIssueKind, SchemaVariant};
use test_helpers::{day, write_temp_file, DatasetCsvBuilder, UNIFIED_HEADER};

#[test]
fn test_load_csv_file_basic() {
    logging::init_test();

    let csv = DatasetCsvBuilder::new()
        .movement("H1", "P1", 7, 5)
        .movement("H1", "P1", 14, 3)
        .movement("H2", "P2", 3, 1)
        .inventory("H1", "P1", 10, Some(90))
        .inventory("H2", "P2", 0, None)
        .build();
    let file = write_temp_file(&csv, ".csv");

    let dataset = DatasetLoader::default().load_file(file.path()).unwrap();

    assert_eq!(dataset.variant, SchemaVariant::MovementInventory);
    assert_eq!(dataset.movements.len(), 3);
    assert_eq!(dataset.inventory.len(), 2);
    assert!(dataset.issues.is_empty());
    assert!(!dataset.batch_id.is_empty());
}

#[test]
fn test_each_load_gets_new_batch_id() {
    let builder = DatasetCsvBuilder::new().inventory("H1", "P1", 1, None);
    assert_ne!(builder.load().batch_id, builder.load().batch_id);
}

#[test]
fn test_missing_columns_reports_all_names() {
    let csv = "Record_Type,Hospital_ID,Hospital_Name,Product_ID,Product_Name,Movement_Date,Movement_Qty,Current_Stock\n\
               movement,H1,General,P1,Kit,2025-01-01,3,\n";
    let file = write_temp_file(csv, ".csv");

    let err = DatasetLoader::default().load_file(file.path()).unwrap_err();

    match &err {
        ImportError::MissingColumns { variant, missing } => {
            assert_eq!(*variant, SchemaVariant::MovementInventory);
            assert_eq!(
                missing,
                &vec![
                    "Product_Category".to_string(),
                    "Usage_Family".to_string(),
                    "Expiry_Date".to_string(),
                    "Consignment_Start_Date".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("Consignment_Start_Date"));
}

#[test]
fn test_malformed_rows_are_recovered_and_reported() {
    let dataset = DatasetCsvBuilder::new()
        .movement("H1", "P1", 7, 5)
        .raw("movement,H1,H1 Hospital,P1,P1 Kit,Diagnostics,high,not-a-date,4,,,")
        .raw("movement,H1,H1 Hospital,P1,P1 Kit,Diagnostics,high,2025-06-01,lots,,,")
        .raw("transfer,H1,H1 Hospital,P1,P1 Kit,Diagnostics,high,2025-06-01,1,,,")
        .raw("inventory,H1,H1 Hospital,P1,P1 Kit,Diagnostics,mystery,,,7,31/02/2026,")
        .load();

    // 日期/数量无法解析的行保留
    assert_eq!(dataset.movements.len(), 3);
    assert_eq!(dataset.movements[1].movement_date, None);
    assert_eq!(dataset.movements[2].movement_qty, 0);
    assert_eq!(dataset.inventory.len(), 1);
    assert_eq!(dataset.inventory[0].expiry_date, None);

    assert_eq!(dataset.issue_count(DataIssueKind::DateCoerced), 2);
    assert_eq!(dataset.issue_count(DataIssueKind::QuantityCoerced), 1);
    assert_eq!(dataset.issue_count(DataIssueKind::UnknownRecordType), 1);
    assert_eq!(dataset.issue_count(DataIssueKind::UnknownUsageFamily), 1);

    // 行号按文件行计
    let record_type_issue = dataset
        .issues
        .iter()
        .find(|i| i.kind == DataIssueKind::UnknownRecordType)
        .unwrap();
    assert_eq!(record_type_issue.row_number, 5);
    assert_eq!(record_type_issue.value, "transfer");
}

#[test]
fn test_duplicate_snapshots_follow_policy() {
    let csv = DatasetCsvBuilder::new()
        .inventory("H1", "P1", 6, Some(100))
        .inventory("H1", "P1", 2, Some(40))
        .build();

    let keep_last = DatasetLoader::new(DuplicatePolicy::KeepLast)
        .load_csv_reader(csv.as_bytes())
        .unwrap();
    let summed = DatasetLoader::new(DuplicatePolicy::Sum)
        .load_csv_reader(csv.as_bytes())
        .unwrap();

    assert_eq!(keep_last.inventory.len(), 1);
    assert_eq!(keep_last.inventory[0].current_stock, 2);
    assert_eq!(summed.inventory[0].current_stock, 8);
    assert_eq!(summed.inventory[0].expiry_date.map(|d| d.to_string()), Some(day(40)));
    assert_eq!(summed.issue_count(DataIssueKind::DuplicateSnapshot), 1);
}

#[test]
fn test_flat_snapshot_file() {
    let csv = "Hospital,Product,Current_Inventory,Avg_Weekly_Consumption,Expiry_Date,Category\n\
               General,Troponin,12,3.5,2026-01-15,Cardiac\n\
               County,Troponin,,1.0,,Cardiac\n";
    let file = write_temp_file(csv, ".csv");

    let dataset = DatasetLoader::default().load_file(file.path()).unwrap();

    assert_eq!(dataset.variant, SchemaVariant::FlatSnapshot);
    assert_eq!(dataset.inventory.len(), 2);
    assert_eq!(dataset.inventory[0].product_category, "Cardiac");
    assert_eq!(dataset.inventory[1].current_stock, 0);
    assert_eq!(dataset.issue_count(DataIssueKind::QuantityCoerced), 1);
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp_file(UNIFIED_HEADER, ".txt");
    let err = DatasetLoader::default().load_file(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
}

#[test]
fn test_unknown_schema() {
    let err = DatasetLoader::default()
        .load_csv_reader("alpha,beta\n1,2\n".as_bytes())
        .unwrap_err();
    assert!(matches!(err, ImportError::UnknownSchema { .. }));
}
