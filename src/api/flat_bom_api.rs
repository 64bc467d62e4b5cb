// ==========================================
// 扁平化 BOM 生成器 - 扁平 BOM API
// ==========================================
// 职责: 参数校验 → 加载配置 → 调用引擎 → 库存富化 → 组装响应
// 红线: 库存数字只透传,不做缺口计算
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::dto::{FlatBomLine, FlatBomResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::config::flat_bom_config_trait::FlatBomConfigReader;
use crate::config::flatten_config::CategoryRules;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::part::{PartId, StockLevel};
use crate::engine::orchestrator::FlatBomOrchestrator;
use crate::engine::warnings::WarningCollector;
use crate::repository::part_repo::SqlitePartCatalog;
use crate::repository::stock_repo::StockRepository;

// ==========================================
// FlatBomApi - 扁平 BOM API
// ==========================================
pub struct FlatBomApi<C>
where
    C: FlatBomConfigReader,
{
    catalog: Arc<SqlitePartCatalog>,
    stock_repo: Arc<StockRepository>,
    config: Arc<C>,
}

impl FlatBomApi<ConfigManager> {
    /// 打开数据库并创建 API(共享同一连接,建表幂等)
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let conn = Arc::new(Mutex::new(conn));
        let config = ConfigManager::from_connection(conn.clone())?;

        Ok(Self::new(
            Arc::new(SqlitePartCatalog::from_connection(conn.clone())),
            Arc::new(StockRepository::from_connection(conn)),
            Arc::new(config),
        ))
    }
}

impl<C> FlatBomApi<C>
where
    C: FlatBomConfigReader,
{
    /// 创建新的 FlatBomApi 实例
    pub fn new(
        catalog: Arc<SqlitePartCatalog>,
        stock_repo: Arc<StockRepository>,
        config: Arc<C>,
    ) -> Self {
        Self {
            catalog,
            stock_repo,
            config,
        }
    }

    /// 生成扁平 BOM
    ///
    /// # 参数
    /// - part_id: 根装配件 ID
    /// - max_depth_param: 调用方传入的原始 max_depth 字符串(None/空串 = 使用配置默认值)
    ///
    /// # 返回
    /// - Ok(FlatBomResponse)
    /// - Err(InvalidInput): max_depth 非法 / 根零件不是装配件
    /// - Err(NotFound): 根零件不存在
    /// - Err(DataIntegrity): 下料单位冲突或缺失
    pub async fn get_flat_bom(
        &self,
        part_id: PartId,
        max_depth_param: Option<&str>,
    ) -> ApiResult<FlatBomResponse> {
        let request_id = Uuid::new_v4().to_string();

        // 1. 参数校验
        let max_depth = match parse_max_depth(max_depth_param)? {
            Some(depth) => Some(depth),
            None => Some(self.config.get_default_max_depth().await?),
        }
        .filter(|d| *d > 0);

        let root = self
            .catalog
            .find_part(part_id)?
            .ok_or_else(|| ApiError::NotFound(format!("零件(id={})不存在", part_id)))?;

        if !root.is_assembly {
            return Err(ApiError::InvalidInput(format!(
                "零件 {} (id={}) 不是装配件",
                root.name, part_id
            )));
        }

        // 2. 加载配置并调用引擎
        let mut config = self.config.load_flatten_config().await?;
        self.resolve_category_descendants(&mut config.category_rules)?;
        debug!(request_id = %request_id, config = ?config, "展开配置已加载");

        let result =
            FlatBomOrchestrator::new(self.catalog.as_ref(), &config).flatten(part_id, max_depth)?;

        // 3. 库存富化
        let part_ids: Vec<PartId> = result.flat_bom.iter().map(|l| l.part_id).collect();
        let stock_levels = self.stock_repo.find_stock_levels(&part_ids)?;

        let mut warnings = WarningCollector::new();
        warnings.extend(result.warnings);

        let bom_items: Vec<FlatBomLine> = result
            .flat_bom
            .into_iter()
            .map(|line| {
                let stock = match stock_levels.get(&line.part_id) {
                    Some(stock) => *stock,
                    None => {
                        warnings.missing_stock_data(line.part_id, &line.name);
                        StockLevel::default()
                    }
                };
                FlatBomLine { line, stock }
            })
            .collect();

        if bom_items.is_empty() {
            warn!(request_id = %request_id, part_id, "扁平 BOM 为空");
        }

        info!(
            request_id = %request_id,
            part_id,
            unique_parts = bom_items.len(),
            depth_reached = result.depth_reached,
            warning_count = warnings.count(),
            "扁平 BOM 请求完成"
        );

        Ok(FlatBomResponse {
            request_id,
            generated_at: Utc::now(),
            part_id,
            ipn: root.ipn,
            part_name: root.name,
            max_depth,
            depth_reached: result.depth_reached,
            internal_fab_count: result.internal_fab_count,
            total_unique_parts: bom_items.len(),
            bom_items,
            warnings: warnings.into_warnings(),
        })
    }

    // 配置的分类目录按目录树补齐子孙目录
    fn resolve_category_descendants(&self, rules: &mut CategoryRules) -> ApiResult<()> {
        for ids in rules.category_id_lists_mut() {
            if !ids.is_empty() {
                *ids = self.catalog.find_category_descendants(ids)?;
            }
        }
        Ok(())
    }
}

/// 解析调用方传入的 max_depth
///
/// # 返回
/// - Ok(None): 未传入或空串
/// - Ok(Some(n)): 非负整数(0 = 不限)
/// - Err(InvalidInput): 非数字或负数
pub fn parse_max_depth(raw: Option<&str>) -> ApiResult<Option<u32>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let value: i64 = raw
        .parse()
        .map_err(|_| ApiError::InvalidInput(format!("max_depth 必须是整数: {}", raw)))?;

    if value < 0 {
        return Err(ApiError::InvalidInput(format!(
            "max_depth 不能为负数: {}",
            value
        )));
    }

    u32::try_from(value)
        .map(Some)
        .map_err(|_| ApiError::InvalidInput(format!("max_depth 超出范围: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_max_depth() {
        assert_eq!(parse_max_depth(None).unwrap(), None);
        assert_eq!(parse_max_depth(Some("  ")).unwrap(), None);
        assert_eq!(parse_max_depth(Some("3")).unwrap(), Some(3));
        assert_eq!(parse_max_depth(Some("0")).unwrap(), Some(0));

        assert!(matches!(
            parse_max_depth(Some("abc")),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_max_depth(Some("-1")),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_max_depth(Some("2.5")),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
