// ==========================================
// 扁平化 BOM 生成器 - 核心库
// ==========================================
// 职责: 多层 BOM → 扁平采购/下料清单
// 技术栈: Rust + SQLite
// 分层: domain → engine(纯逻辑) → repository/config → api
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 遍历/提取/聚合
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Category, WarningKind};

// 领域实体
pub use domain::{AggregatedLine, BomRow, BomWarning, CutListEntry, PartId, PartRecord};

// 配置
pub use config::FlattenConfig;

// 引擎
pub use engine::{flatten, FlatBomOrchestrator, FlatBomResult, PartCatalog};

// API
pub use api::{FlatBomApi, FlatBomResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "扁平化 BOM 生成器";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
