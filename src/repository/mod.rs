// ==========================================
// 扁平化 BOM 生成器 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

/// 单条 IN (...) 查询的最大参数个数(低于 SQLite 默认变量上限)
pub(crate) const IN_CLAUSE_CHUNK: usize = 500;

pub mod error;
pub mod part_repo;
pub mod stock_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use part_repo::SqlitePartCatalog;
pub use stock_repo::StockRepository;
