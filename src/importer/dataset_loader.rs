// ==========================================
// 医院寄售库存优化 - 数据集加载器
// ==========================================
// 职责: 整合导入流程，从文件到已校验数据集
// 流程: 解析 → 结构校验 → 字段映射 → 拆分动销/库存 → 快照去重
// 红线: 结构错误中止; 单行问题降级并上报
// ==========================================

use crate::config::DuplicatePolicy;
use crate::domain::record::{ConsignmentDataset, DataIssue, DataIssueKind, InventorySnapshot, ItemKey};
use crate::domain::types::{RecordType, SchemaVariant};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::{CsvParser, UniversalFileParser};
use crate::importer::importer_trait::{FieldMapper, FileParser, RawRow};
use crate::importer::schema::{columns, SchemaValidator};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// DatasetLoader - 数据集加载器
// ==========================================
pub struct DatasetLoader {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    validator: SchemaValidator,
    duplicate_policy: DuplicatePolicy,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl DatasetLoader {
    /// 创建默认组件的加载器（按扩展名解析 CSV/Excel）
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        Self::with_components(
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl::new()),
            duplicate_policy,
        )
    }

    /// 注入自定义组件
    pub fn with_components(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        duplicate_policy: DuplicatePolicy,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            validator: SchemaValidator,
            duplicate_policy,
        }
    }

    /// 从文件加载数据集
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn load_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ConsignmentDataset> {
        let (headers, rows) = self.file_parser.parse_to_raw_rows(file_path.as_ref())?;
        info!(total_rows = rows.len(), "文件解析完成");
        self.load_rows(headers, rows)
    }

    /// 从 CSV 流加载数据集（内存数据/上传流）
    pub fn load_csv_reader<R: Read>(&self, reader: R) -> ImportResult<ConsignmentDataset> {
        let (headers, rows) = CsvParser.parse_reader(reader)?;
        self.load_rows(headers, rows)
    }

    /// 从已解析的原始行加载数据集
    pub fn load_rows(
        &self,
        headers: Vec<String>,
        rows: Vec<RawRow>,
    ) -> ImportResult<ConsignmentDataset> {
        let batch_id = Uuid::new_v4().to_string();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::EmptyDataset);
        }

        // === 步骤 1: 结构校验 ===
        let variant = self.validator.detect_and_validate(&headers)?;
        info!(batch_id = %batch_id, variant = %variant, rows = rows.len(), "结构校验通过");

        // === 步骤 2: 字段映射 + 拆分 ===
        let mut issues = Vec::new();
        let mut movements = Vec::new();
        let mut inventory = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            // 行号按文件行计（表头为第 1 行）
            let row_number = idx + 2;

            match variant {
                SchemaVariant::FlatSnapshot => {
                    if let Some(snapshot) =
                        self.field_mapper.map_flat_snapshot(row, row_number, &mut issues)
                    {
                        inventory.push(snapshot);
                    }
                }
                SchemaVariant::MovementInventory => match self.field_mapper.record_type(row) {
                    Some(RecordType::Movement) => {
                        if let Some(movement) =
                            self.field_mapper.map_movement(row, row_number, &mut issues)
                        {
                            movements.push(movement);
                        }
                    }
                    Some(RecordType::Inventory) => {
                        if let Some(snapshot) =
                            self.field_mapper.map_inventory(row, row_number, &mut issues)
                        {
                            inventory.push(snapshot);
                        }
                    }
                    None => {
                        let raw = row.get(columns::RECORD_TYPE).cloned().unwrap_or_default();
                        warn!(row_number, value = %raw, "未知记录类型，行被跳过");
                        issues.push(DataIssue::new(
                            row_number,
                            columns::RECORD_TYPE,
                            DataIssueKind::UnknownRecordType,
                            &raw,
                        ));
                    }
                },
            }
        }
        debug!(
            movements = movements.len(),
            inventory = inventory.len(),
            "字段映射完成"
        );

        // === 步骤 3: 快照去重 ===
        let inventory = self.dedup_snapshots(inventory, &mut issues);

        info!(
            batch_id = %batch_id,
            movements = movements.len(),
            inventory = inventory.len(),
            issues = issues.len(),
            "数据集加载完成"
        );

        Ok(ConsignmentDataset {
            batch_id,
            variant,
            movements,
            inventory,
            issues,
        })
    }

    /// 同键多条快照按策略合并（保持首次出现的顺序）
    ///
    /// - KeepLast: 后出现的整行覆盖
    /// - Sum: 库存相加,效期取较早者
    fn dedup_snapshots(
        &self,
        snapshots: Vec<InventorySnapshot>,
        issues: &mut Vec<DataIssue>,
    ) -> Vec<InventorySnapshot> {
        let mut index: HashMap<ItemKey, usize> = HashMap::new();
        let mut merged: Vec<InventorySnapshot> = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            let key = snapshot.key();
            match index.get(&key) {
                None => {
                    index.insert(key, merged.len());
                    merged.push(snapshot);
                }
                Some(&pos) => {
                    warn!(key = %key, row_number = snapshot.row_number, policy = ?self.duplicate_policy, "重复库存快照");
                    issues.push(DataIssue::new(
                        snapshot.row_number,
                        columns::PRODUCT_ID,
                        DataIssueKind::DuplicateSnapshot,
                        &key.to_string(),
                    ));

                    let existing = &mut merged[pos];
                    match self.duplicate_policy {
                        DuplicatePolicy::KeepLast => *existing = snapshot,
                        DuplicatePolicy::Sum => {
                            existing.current_stock =
                                existing.current_stock.saturating_add(snapshot.current_stock);
                            existing.expiry_date = match (existing.expiry_date, snapshot.expiry_date) {
                                (Some(a), Some(b)) => Some(a.min(b)),
                                (a, b) => a.or(b),
                            };
                        }
                    }
                }
            }
        }

        merged
    }
}
