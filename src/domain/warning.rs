// ==========================================
// 扁平化 BOM 生成器 - 告警实体
// ==========================================
// 红线: 告警永远是非致命的,不中断处理
// ==========================================

use crate::domain::part::PartId;
use crate::domain::types::WarningKind;
use serde::{Deserialize, Serialize};

/// BOM 告警
///
/// 汇总类告警(如 max_depth_reached)没有关联零件, `part_id` 为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub part_id: Option<PartId>,
    pub part_name: String,
    pub message: String,
}

impl BomWarning {
    pub fn new(
        kind: WarningKind,
        part_id: Option<PartId>,
        part_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            part_id,
            part_name: part_name.into(),
            message: message.into(),
        }
    }
}
