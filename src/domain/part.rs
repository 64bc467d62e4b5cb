// ==========================================
// 扁平化 BOM 生成器 - 零件与 BOM 行
// ==========================================
// 职责: 宿主库存系统中本引擎需要消费的最小字段集
// 注: 其余零件字段不属于本引擎关心的范围
// ==========================================

use serde::{Deserialize, Serialize};

/// 零件 ID (宿主系统主键)
pub type PartId = i64;

// ==========================================
// PartRecord - 零件主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub part_id: PartId,
    pub name: String,
    pub ipn: String,
    pub description: String,
    pub unit: String,
    pub is_assembly: bool,
    pub is_active: bool,
    pub purchaseable: bool,
    pub default_supplier_id: Option<i64>,
    /// 宿主零件分类目录 ID
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl PartRecord {
    /// 构造一个启用状态、无供应商的零件
    pub fn new(part_id: PartId, name: impl Into<String>, is_assembly: bool) -> Self {
        Self {
            part_id,
            name: name.into(),
            ipn: String::new(),
            description: String::new(),
            unit: String::new(),
            is_assembly,
            is_active: true,
            purchaseable: !is_assembly,
            default_supplier_id: None,
            category_id: None,
        }
    }

    pub fn with_ipn(mut self, ipn: impl Into<String>) -> Self {
        self.ipn = ipn.into();
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_default_supplier(mut self, supplier_id: i64) -> Self {
        self.default_supplier_id = Some(supplier_id);
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

// ==========================================
// BomRow - 装配件的一条 BOM 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomRow {
    pub child_id: PartId,
    pub quantity: f64,
    pub reference: String,
    pub notes: String,
    pub unit_override: Option<String>,
    pub optional: bool,
    pub consumable: bool,
}

impl BomRow {
    pub fn new(child_id: PartId, quantity: f64) -> Self {
        Self {
            child_id,
            quantity,
            reference: String::new(),
            notes: String::new(),
            unit_override: None,
            optional: false,
            consumable: false,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_unit_override(mut self, unit: impl Into<String>) -> Self {
        self.unit_override = Some(unit.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn consumable(mut self) -> Self {
        self.consumable = true;
        self
    }
}

// ==========================================
// StockLevel - 库存数据(仅透传给展示层)
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    pub in_stock: f64,
    pub allocated: f64,
    pub on_order: f64,
}
