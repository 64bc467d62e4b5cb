// ==========================================
// 扁平化 BOM 生成器 - API 层
// ==========================================
// 职责: 面向宿主的业务接口(校验、富化、导出)
// ==========================================

pub mod dto;
pub mod error;
pub mod export;
pub mod flat_bom_api;

// 重导出核心类型
pub use dto::{FlatBomLine, FlatBomResponse};
pub use error::{ApiError, ApiResult};
pub use export::{format_cut_list, write_flat_bom_csv};
pub use flat_bom_api::{parse_max_depth, FlatBomApi};
