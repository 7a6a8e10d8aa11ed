// ==========================================
// 医院寄售库存优化 - 导入层 Trait 定义
// ==========================================
// 职责: 定义导入管道各环节接口（不包含实现）
// 流程: 解析 → 结构校验 → 字段映射 → 拆分
// ==========================================

use crate::domain::record::{DataIssue, InventorySnapshot, MovementRecord};
use crate::domain::types::RecordType;
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行：表头 → 单元格文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → 原始行
// 实现者: CsvParser / ExcelParser
pub trait FileParser {
    /// 解析文件为原始行
    ///
    /// # 返回
    /// - (表头, 行列表)；完全空白的行已跳过
    fn parse_to_raw_rows(&self, file_path: &Path) -> ImportResult<(Vec<String>, Vec<RawRow>)>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 原始行 → 领域记录（类型转换 + 日期容错）
// 约定: 单行问题写入 issues,不返回错误
pub trait FieldMapper {
    /// 读取动销/库存统一结构的判别字段
    fn record_type(&self, row: &RawRow) -> Option<RecordType>;

    /// 映射为动销记录
    fn map_movement(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<MovementRecord>;

    /// 映射为库存快照（统一结构）
    fn map_inventory(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<InventorySnapshot>;

    /// 映射为库存快照（扁平结构）
    fn map_flat_snapshot(
        &self,
        row: &RawRow,
        row_number: usize,
        issues: &mut Vec<DataIssue>,
    ) -> Option<InventorySnapshot>;
}
