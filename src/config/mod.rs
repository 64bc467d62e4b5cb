// ==========================================
// 扁平化 BOM 生成器 - 配置层
// ==========================================
// 职责: 展开配置值对象 + 设置持久化
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod flat_bom_config_trait;
pub mod flatten_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use flat_bom_config_trait::FlatBomConfigReader;
pub use flatten_config::{CategoryRules, FlattenConfig, DEFAULT_INTERNAL_FAB_CUT_UNITS};
