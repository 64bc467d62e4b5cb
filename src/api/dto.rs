// ==========================================
// 扁平化 BOM 生成器 - API 数据传输对象
// ==========================================
// 职责: 面向展示层的序列化结构
// ==========================================

use crate::domain::bom::AggregatedLine;
use crate::domain::part::{PartId, StockLevel};
use crate::domain::warning::BomWarning;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 扁平 BOM 行 + 库存数字
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBomLine {
    #[serde(flatten)]
    pub line: AggregatedLine,
    #[serde(flatten)]
    pub stock: StockLevel,
}

// ==========================================
// FlatBomResponse - 扁平 BOM 查询响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatBomResponse {
    /// 请求 ID (uuid v4)
    pub request_id: String,
    pub generated_at: DateTime<Utc>,

    // 根零件
    pub part_id: PartId,
    pub ipn: String,
    pub part_name: String,

    /// 实际生效的最大深度(None = 不限)
    pub max_depth: Option<u32>,
    pub depth_reached: u32,
    pub internal_fab_count: usize,

    pub total_unique_parts: usize,
    pub bom_items: Vec<FlatBomLine>,
    pub warnings: Vec<BomWarning>,
}
