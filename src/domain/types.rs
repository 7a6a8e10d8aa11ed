// ==========================================
// 医院寄售库存优化 - 领域类型定义
// ==========================================
// 职责: 活跃度分级 / 使用族 / 效期状态 / 补货动作
// 红线: 分级是"等级制",不是评分制
// ==========================================

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ==========================================
// 活跃度等级 (Activity Class)
// ==========================================
// 顺序: A(最活跃) < B < C < D(最不活跃/无动销)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityClass {
    A,
    B,
    C,
    D,
}

impl ActivityClass {
    pub const ALL: [ActivityClass; 4] = [
        ActivityClass::A,
        ActivityClass::B,
        ActivityClass::C,
        ActivityClass::D,
    ];

    /// 按 A/B/C 升序阈值分级，超出最后一档为 D
    ///
    /// 边界值归入较活跃一档（value <= cutoff）
    pub fn from_cutoffs(value: f64, cutoffs: &[f64; 3]) -> Self {
        if value.is_nan() {
            return ActivityClass::D;
        }
        if value <= cutoffs[0] {
            ActivityClass::A
        } else if value <= cutoffs[1] {
            ActivityClass::B
        } else if value <= cutoffs[2] {
            ActivityClass::C
        } else {
            ActivityClass::D
        }
    }
}

impl fmt::Display for ActivityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityClass::A => write!(f, "A"),
            ActivityClass::B => write!(f, "B"),
            ActivityClass::C => write!(f, "C"),
            ActivityClass::D => write!(f, "D"),
        }
    }
}

// ==========================================
// 使用族 (Usage Family)
// ==========================================
// 描述产品预期消耗速度，用于选择分级/倍数表
// Unknown: 未识别的族，按最保守口径处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageFamily {
    High,
    Medium,
    Low,
    Unknown,
}

impl UsageFamily {
    /// 从源字段解析（大小写不敏感，兼容常见写法）
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" | "h" | "high_usage" | "fast" => UsageFamily::High,
            "medium" | "med" | "m" | "mid" | "medium_usage" => UsageFamily::Medium,
            "low" | "l" | "low_usage" | "slow" => UsageFamily::Low,
            _ => UsageFamily::Unknown,
        }
    }
}

impl fmt::Display for UsageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageFamily::High => write!(f, "high"),
            UsageFamily::Medium => write!(f, "medium"),
            UsageFamily::Low => write!(f, "low"),
            UsageFamily::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 效期状态 (Expiry Status)
// ==========================================
// 粗粒度状态: 用于强制移除判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryStatus {
    Ok,
    ExpiringSoon,
    Expired,
}

impl fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryStatus::Ok => write!(f, "OK"),
            ExpiryStatus::ExpiringSoon => write!(f, "Expiring Soon"),
            ExpiryStatus::Expired => write!(f, "EXPIRED"),
        }
    }
}

impl Serialize for ExpiryStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ==========================================
// 效期风险层级 (Expiry Risk)
// ==========================================
// 细粒度层级: 用于热力图展示，与 ExpiryStatus 不冗余
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpiryRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for ExpiryRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryRisk::Low => write!(f, "Low"),
            ExpiryRisk::Medium => write!(f, "Medium"),
            ExpiryRisk::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 补货动作 (Stock Action)
// ==========================================
// 全函数: 每一行必有动作
// expiring_soon: 追加 "(Expiring Soon)" 后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockAction {
    Increase { expiring_soon: bool },
    Reduce { expiring_soon: bool },
    Ok,
    RemoveExpired,
}

impl StockAction {
    /// 动作基础类别（不含后缀）
    pub fn base_label(&self) -> &'static str {
        match self {
            StockAction::Increase { .. } => "Increase",
            StockAction::Reduce { .. } => "Reduce",
            StockAction::Ok => "OK",
            StockAction::RemoveExpired => "Remove – Expired",
        }
    }
}

impl fmt::Display for StockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockAction::Increase { expiring_soon: true }
            | StockAction::Reduce { expiring_soon: true } => {
                write!(f, "{} (Expiring Soon)", self.base_label())
            }
            _ => write!(f, "{}", self.base_label()),
        }
    }
}

impl Serialize for StockAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ==========================================
// 记录类型 (Record Type)
// ==========================================
// 统一数据集中的判别字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Movement,
    Inventory,
}

impl RecordType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "movement" => Some(RecordType::Movement),
            "inventory" => Some(RecordType::Inventory),
            _ => None,
        }
    }
}

// ==========================================
// 数据集结构变体 (Schema Variant)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    /// 动销/库存统一结构（含 Record_Type 判别字段）
    MovementInventory,
    /// 扁平快照结构（内嵌平均周消耗）
    FlatSnapshot,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVariant::MovementInventory => write!(f, "movement/inventory"),
            SchemaVariant::FlatSnapshot => write!(f, "flat snapshot"),
        }
    }
}
