// ==========================================
// 扁平化 BOM 生成器 - BOM 树与扁平行
// ==========================================
// 生命周期:
// - AssemblyNode / LeafOccurrence: 单次 flatten 调用内临时创建并丢弃
// - AggregatedLine: 作为调用返回值交给调用方
// ==========================================

use crate::domain::part::PartId;
use crate::domain::types::Category;
use serde::{Deserialize, Serialize};

// ==========================================
// BomTreeNode - 树节点(带标签的变体)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node_type", rename_all = "snake_case")]
pub enum BomTreeNode {
    Part(AssemblyNode),
    CircularReference(CycleMarker),
    MissingPart(MissingPartMarker),
}

impl BomTreeNode {
    pub fn as_part(&self) -> Option<&AssemblyNode> {
        match self {
            BomTreeNode::Part(node) => Some(node),
            _ => None,
        }
    }
}

// ==========================================
// AssemblyNode - 已展开的零件节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyNode {
    pub part_id: PartId,
    pub ipn: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub category: Category,
    pub depth: u32,

    /// 本次出现在父 BOM 中的数量(根节点为 None)
    pub bom_quantity: Option<f64>,
    /// 父链路累计数量 × 本行数量
    pub cumulative_quantity: f64,

    pub is_assembly: bool,
    pub is_active: bool,
    pub purchaseable: bool,
    pub has_default_supplier: bool,

    // BOM 行属性
    pub reference: String,
    pub notes: String,
    pub optional: bool,
    pub consumable: bool,

    /// 定尺下料长度(仅 CutToLength)
    pub cut_length: Option<f64>,
    /// 下料单位: BOM 行覆盖单位 > 备注单位 > 零件单位(后两者仅 CutToLength)
    pub cut_unit: Option<String>,

    pub from_internal_fab_parent: bool,
    pub max_depth_exceeded: bool,
    pub assembly_no_children: bool,

    pub children: Vec<BomTreeNode>,
}

// ==========================================
// CycleMarker - 循环引用截断标记
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleMarker {
    pub part_id: PartId,
    pub ipn: String,
    pub name: String,
    pub parent_part_id: PartId,
    pub depth: u32,
}

// ==========================================
// MissingPartMarker - 缺失零件的零数量节点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingPartMarker {
    pub part_id: PartId,
    pub parent_part_id: PartId,
    pub depth: u32,
    pub cumulative_quantity: f64,
}

// ==========================================
// LeafOccurrence - 单次终端出现
// ==========================================
// 红线: 聚合之前绝不合并,菱形汇聚的同一零件会出现多次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafOccurrence {
    pub part_id: PartId,
    pub ipn: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub category: Category,
    pub depth: u32,

    /// 本次出现自身的累计数量
    pub cumulative_quantity: f64,

    /// 下料长度(存在时该次出现按长度 × 1 计入)
    pub cut_length: Option<f64>,
    pub cut_unit: Option<String>,

    pub from_internal_fab_parent: bool,
    pub max_depth_exceeded: bool,
    pub assembly_no_children: bool,

    pub is_assembly: bool,
    pub purchaseable: bool,
    pub has_default_supplier: bool,
    pub optional: bool,
    pub consumable: bool,
    pub reference: String,
}

// ==========================================
// CutListEntry - 下料清单桶
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutListEntry {
    pub length: f64,
    pub count: u32,
    pub unit: String,
}

// ==========================================
// AggregatedLine - 扁平 BOM 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedLine {
    pub part_id: PartId,
    pub ipn: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub unit: String,

    /// 所有贡献出现的累计数量之和
    pub total_quantity: f64,
    pub occurrence_count: u32,
    pub cut_list: Vec<CutListEntry>,

    // 展示标记
    pub is_assembly: bool,
    pub purchaseable: bool,
    pub has_default_supplier: bool,
    pub optional: bool,
    pub consumable: bool,
    pub from_internal_fab_parent: bool,
    pub max_depth_exceeded: bool,
    pub assembly_no_children: bool,
    pub references: Vec<String>,
}
