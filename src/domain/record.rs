// ==========================================
// 医院寄售库存优化 - 记录领域模型
// ==========================================
// 用途: 导入层写入,引擎层只读
// 红线: 记录导入后不可变,每次计算重新生成派生实体
// ==========================================

use crate::domain::types::{SchemaVariant, UsageFamily};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ItemKey - 医院 + 产品 联合键
// ==========================================
// Ord 派生保证输出顺序确定
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub hospital_id: String,
    pub product_id: String,
}

impl ItemKey {
    pub fn new(hospital_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            product_id: product_id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hospital_id, self.product_id)
    }
}

// ==========================================
// MovementRecord - 动销记录
// ==========================================
// 每个 (医院, 产品) 多条,按日期排序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    // ===== 标识 =====
    pub hospital_id: String,
    pub hospital_name: String,
    pub product_id: String,
    pub product_name: String,
    pub product_category: String,
    pub usage_family: UsageFamily,

    // ===== 动销 =====
    pub movement_date: Option<NaiveDate>, // 无法解析 → None,不参与任何时间窗
    pub movement_qty: i64,

    // ===== 元信息 =====
    pub row_number: usize,
}

impl MovementRecord {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.hospital_id.clone(), self.product_id.clone())
    }
}

// ==========================================
// InventorySnapshot - 库存快照
// ==========================================
// 每个 (医院, 产品) 至多一条有效快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    // ===== 标识 =====
    pub hospital_id: String,
    pub hospital_name: String,
    pub product_id: String,
    pub product_name: String,
    pub product_category: String,
    pub usage_family: UsageFamily,

    // ===== 库存 =====
    pub current_stock: i64,
    pub expiry_date: Option<NaiveDate>,
    pub consignment_start_date: Option<NaiveDate>,

    // ===== 扁平快照专用字段 =====
    pub avg_weekly_consumption: Option<f64>, // 内嵌平均周消耗
    pub avg_interval_days: Option<f64>,      // 内嵌平均动销间隔（天）

    // ===== 元信息 =====
    pub row_number: usize,
}

impl InventorySnapshot {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.hospital_id.clone(), self.product_id.clone())
    }
}

// ==========================================
// DataIssue - 已恢复的数据问题
// ==========================================
// 单行问题不阻断批次,但必须结构化上报,不允许静默丢失
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataIssueKind {
    DateCoerced,        // 日期无法解析 → 未知
    QuantityCoerced,    // 数量无法解析 → 0
    UnknownRecordType,  // 判别字段非 movement/inventory,行被跳过
    UnknownUsageFamily, // 使用族无法识别 → 保守口径
    DuplicateSnapshot,  // 同键重复快照,按策略合并
    MissingKey,         // 医院或产品标识为空,行被跳过
}

impl fmt::Display for DataIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIssueKind::DateCoerced => write!(f, "DATE_COERCED"),
            DataIssueKind::QuantityCoerced => write!(f, "QUANTITY_COERCED"),
            DataIssueKind::UnknownRecordType => write!(f, "UNKNOWN_RECORD_TYPE"),
            DataIssueKind::UnknownUsageFamily => write!(f, "UNKNOWN_USAGE_FAMILY"),
            DataIssueKind::DuplicateSnapshot => write!(f, "DUPLICATE_SNAPSHOT"),
            DataIssueKind::MissingKey => write!(f, "MISSING_KEY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIssue {
    pub row_number: usize,
    pub column: String,
    pub kind: DataIssueKind,
    pub value: String,
}

impl DataIssue {
    pub fn new(row_number: usize, column: &str, kind: DataIssueKind, value: &str) -> Self {
        Self {
            row_number,
            column: column.to_string(),
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for DataIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (行 {}, 字段 {}): '{}'",
            self.kind, self.row_number, self.column, self.value
        )
    }
}

// ==========================================
// ConsignmentDataset - 已校验数据集
// ==========================================
// 生命周期: 一次加载,多次计算(筛选条件变化时重算)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsignmentDataset {
    pub batch_id: String,
    pub variant: SchemaVariant,
    pub movements: Vec<MovementRecord>,
    pub inventory: Vec<InventorySnapshot>,
    pub issues: Vec<DataIssue>,
}

impl ConsignmentDataset {
    /// 统计某类问题数量
    pub fn issue_count(&self, kind: DataIssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}
