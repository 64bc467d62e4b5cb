// ==========================================
// 扁平化 BOM 生成器 - 展开配置读取 Trait
// ==========================================
// 职责: 定义 API 层所需的配置读取接口(不包含实现)
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::flatten_config::{CategoryRules, FlattenConfig};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// FlatBomConfigReader Trait
// ==========================================
// 实现者: ConfigManager(从 config_kv 表读取)
#[async_trait]
pub trait FlatBomConfigReader: Send + Sync {
    // ===== 展开策略 =====

    /// 是否展开外购总成
    ///
    /// # 默认值
    /// - false
    async fn get_expand_purchased_assemblies(&self) -> RepositoryResult<bool>;

    /// 内部制造件子件是否生成下料清单
    ///
    /// # 默认值
    /// - true
    async fn get_include_internal_fab_in_cutlist(&self) -> RepositoryResult<bool>;

    /// 是否展开内部制造件
    ///
    /// # 默认值
    /// - true
    async fn get_expand_internal_fab(&self) -> RepositoryResult<bool>;

    /// 允许生成下料清单的长度单位
    ///
    /// # 默认值
    /// - ["mm", "cm", "m", "in", "ft"]
    async fn get_internal_fab_cut_units(&self) -> RepositoryResult<Vec<String>>;

    // ===== 分类规则 =====

    /// 名称前缀、内部供应商列表与分类目录映射
    ///
    /// 分类目录只含配置的目录本身,子目录由调用方按目录树展开
    async fn get_category_rules(&self) -> RepositoryResult<CategoryRules>;

    // ===== 遍历 =====

    /// 调用方未指定 max_depth 时使用的默认深度
    ///
    /// # 返回
    /// - 0 表示不限
    async fn get_default_max_depth(&self) -> RepositoryResult<u32>;

    /// 组装完整的展开配置快照
    async fn load_flatten_config(&self) -> RepositoryResult<FlattenConfig> {
        Ok(FlattenConfig {
            expand_purchased_assemblies: self.get_expand_purchased_assemblies().await?,
            include_internal_fab_in_cutlist: self.get_include_internal_fab_in_cutlist().await?,
            expand_internal_fab: self.get_expand_internal_fab().await?,
            internal_fab_cut_units: self.get_internal_fab_cut_units().await?,
            category_rules: self.get_category_rules().await?,
        })
    }
}
