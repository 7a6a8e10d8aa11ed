// ==========================================
// 医院寄售库存优化 - 记录筛选
// ==========================================
// 多选筛选: 医院名称 / 产品品类 / 产品名称
// 同时作用于动销与库存两个子集,空条件 = 不限制
// ==========================================

use crate::domain::record::{ConsignmentDataset, InventorySnapshot, MovementRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    pub hospitals: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        self.hospitals.is_empty() && self.categories.is_empty() && self.products.is_empty()
    }

    pub fn matches(&self, hospital_name: &str, category: &str, product_name: &str) -> bool {
        accepts(&self.hospitals, hospital_name)
            && accepts(&self.categories, category)
            && accepts(&self.products, product_name)
    }

    pub fn matches_movement(&self, m: &MovementRecord) -> bool {
        self.matches(&m.hospital_name, &m.product_category, &m.product_name)
    }

    pub fn matches_snapshot(&self, s: &InventorySnapshot) -> bool {
        self.matches(&s.hospital_name, &s.product_category, &s.product_name)
    }
}

fn accepts(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|a| a == value)
}

/// 数据集中可供筛选的取值（去重排序）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub hospitals: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &ConsignmentDataset) -> Self {
        let mut hospitals = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut products = BTreeSet::new();

        let identities = dataset
            .movements
            .iter()
            .map(|m| (&m.hospital_name, &m.product_category, &m.product_name))
            .chain(
                dataset
                    .inventory
                    .iter()
                    .map(|s| (&s.hospital_name, &s.product_category, &s.product_name)),
            );

        for (hospital, category, product) in identities {
            hospitals.insert(hospital.clone());
            if !category.is_empty() {
                categories.insert(category.clone());
            }
            products.insert(product.clone());
        }

        Self {
            hospitals: hospitals.into_iter().collect(),
            categories: categories.into_iter().collect(),
            products: products.into_iter().collect(),
        }
    }
}
