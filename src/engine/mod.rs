// ==========================================
// 扁平化 BOM 生成器 - 引擎层
// ==========================================
// 职责: BOM 遍历、终端件提取、聚合与告警收集
// 红线: Engine 不拼 SQL,零件数据只经由 PartCatalog 获取
// 红线: 无全局状态,每次调用相互独立
// ==========================================

pub mod aggregator;
pub mod catalog;
pub mod categorizer;
pub mod error;
pub mod leaf_extractor;
pub mod orchestrator;
pub mod tree_walker;
pub mod warnings;

// 重导出核心引擎
pub use aggregator::{aggregate, AggregationOutcome, Aggregator};
pub use catalog::{InMemoryPartCatalog, PartCatalog};
pub use categorizer::{categorize, extract_length, extract_length_with_unit, Categorizer};
pub use error::{EngineError, EngineResult};
pub use leaf_extractor::{extract_leaves, LeafExtractor};
pub use orchestrator::{flatten, FlatBomOrchestrator, FlatBomResult};
pub use tree_walker::{TraversalPath, TreeWalker, WalkOutcome};
pub use warnings::WarningCollector;
