// ==========================================
// 扁平化 BOM 生成器 - 领域层
// ==========================================
// 职责: 定义核心实体和类型
// ==========================================

pub mod bom;
pub mod part;
pub mod types;
pub mod warning;

// 重导出核心类型
pub use bom::{
    AggregatedLine, AssemblyNode, BomTreeNode, CutListEntry, CycleMarker, LeafOccurrence,
    MissingPartMarker,
};
pub use part::{BomRow, PartId, PartRecord, StockLevel};
pub use types::{Category, WarningKind};
pub use warning::BomWarning;
