// ==========================================
// 扁平化 BOM 生成器 - 领域类型定义
// ==========================================
// 红线: 分类是显式枚举,下游按枚举分派,不做字符串比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 零件分类 (Category)
// ==========================================
// 分类唯一决定下游"终端 / 展开"行为
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Tla,                  // 顶层装配(根节点)
    Fab,                  // 自制件(非装配)
    Commercial,           // 外购标准件(非装配)
    CutToLength,          // 定尺下料原材料(非装配,长度写在 BOM 备注中)
    PurchaseableAssembly, // 外购总成(有外部默认供应商)
    InternalFab,          // 内部制造件(展开,子件计入下料清单)
    Assembly,             // 普通装配(展开)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tla => write!(f, "TLA"),
            Category::Fab => write!(f, "FAB"),
            Category::Commercial => write!(f, "COMMERCIAL"),
            Category::CutToLength => write!(f, "CUT_TO_LENGTH"),
            Category::PurchaseableAssembly => write!(f, "PURCHASEABLE_ASSEMBLY"),
            Category::InternalFab => write!(f, "INTERNAL_FAB"),
            Category::Assembly => write!(f, "ASSEMBLY"),
        }
    }
}

// ==========================================
// 告警类型 (Warning Kind)
// ==========================================
// 序列化格式: snake_case (与前端约定一致,不随语言切换)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InactivePart,       // 引用了停用零件
    MissingPart,        // BOM 行引用的零件不存在
    CircularReference,  // 同一血缘链上的循环引用
    AssemblyNoChildren, // 装配件没有任何 BOM 行
    UnitMismatch,       // BOM 行单位与零件原生单位冲突
    MaxDepthReached,    // 深度上限截断了展开(汇总告警)
    MixedQuantityBasis, // 同一零件既有下料长度又有件数贡献
    MissingStockData,   // 库存数据缺失(仅 API 富化阶段)
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::InactivePart => "inactive_part",
            WarningKind::MissingPart => "missing_part",
            WarningKind::CircularReference => "circular_reference",
            WarningKind::AssemblyNoChildren => "assembly_no_children",
            WarningKind::UnitMismatch => "unit_mismatch",
            WarningKind::MaxDepthReached => "max_depth_reached",
            WarningKind::MixedQuantityBasis => "mixed_quantity_basis",
            WarningKind::MissingStockData => "missing_stock_data",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
