// ==========================================
// 扁平化 BOM 生成器 - 引擎层错误类型
// ==========================================
// 错误分级:
// - 提示类(停用零件/空装配): 记为 BomWarning,不走错误通道
// - 结构类(循环引用): 截断该边,记为 BomWarning
// - 数据完整性类(下料单位冲突/缺失下料长度): 立即返回错误
// ==========================================

use crate::domain::part::PartId;
use crate::domain::types::Category;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("零件不存在: part_id={part_id}")]
    PartNotFound { part_id: PartId },

    #[error("零件目录查询失败: {0}")]
    Catalog(String),

    // ===== 数据完整性错误 =====
    #[error("下料单位冲突: part_id={part_id}, length={cut_length}, expected={expected}, found={}", .found.as_deref().unwrap_or("<none>"))]
    CutUnitMismatch {
        part_id: PartId,
        cut_length: f64,
        expected: String,
        found: Option<String>,
    },

    #[error("下料单位缺失: part_id={part_id}")]
    MissingCutUnit { part_id: PartId },

    #[error("下料长度缺失: part_id={part_id}, category={category}")]
    MissingCutLength { part_id: PartId, category: Category },
}

impl EngineError {
    /// 是否为数据完整性错误(调用方不得吞掉)
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            EngineError::CutUnitMismatch { .. }
                | EngineError::MissingCutUnit { .. }
                | EngineError::MissingCutLength { .. }
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
