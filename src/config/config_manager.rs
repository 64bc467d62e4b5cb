// ==========================================
// 扁平化 BOM 生成器 - 配置管理器
// ==========================================
// 职责: 设置的加载、查询、持久化
// 存储: config_kv 表 (key-value + scope)
// 红线: 配置值格式错误时回退默认值并记录 warn,不让调用失败
// ==========================================

use crate::config::flat_bom_config_trait::FlatBomConfigReader;
use crate::config::flatten_config::{CategoryRules, DEFAULT_INTERNAL_FAB_CUT_UNITS};
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA(幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入 global scope 的配置值(UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取 global 配置快照(按键排序)
    pub fn get_config_snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    fn get_bool_or_default(&self, key: &str, default: bool) -> RepositoryResult<bool> {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => {
                warn!(config_key = key, raw_value = %raw, "布尔配置格式错误,使用默认值");
                Ok(default)
            }
        }
    }

    fn get_string_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 名称前缀: 未配置 → 默认值; 显式配置为空串 → 停用该前缀规则
    fn get_prefix_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 逗号分隔的 ID 列表(无法解析的项记录 warn 后忽略)
    fn get_id_list(&self, key: &str) -> RepositoryResult<Vec<i64>> {
        let raw = self.get_string_or_default(key, "")?;
        let mut ids = Vec::new();
        for item in split_list(&raw) {
            match item.parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(config_key = key, raw_value = item, "ID 列表配置项格式错误,已忽略"),
            }
        }
        Ok(ids)
    }

    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> RepositoryResult<T>
    where
        T: FromStr,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(config_key = key, raw_value = %raw, "数值配置格式错误,使用默认值");
                Ok(default)
            }
        }
    }
}

/// 逗号分隔列表
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

// ==========================================
// FlatBomConfigReader Trait 实现
// ==========================================
#[async_trait]
impl FlatBomConfigReader for ConfigManager {
    async fn get_expand_purchased_assemblies(&self) -> RepositoryResult<bool> {
        self.get_bool_or_default(config_keys::EXPAND_PURCHASED_ASSEMBLIES, false)
    }

    async fn get_include_internal_fab_in_cutlist(&self) -> RepositoryResult<bool> {
        self.get_bool_or_default(config_keys::INCLUDE_INTERNAL_FAB_IN_CUTLIST, true)
    }

    async fn get_expand_internal_fab(&self) -> RepositoryResult<bool> {
        self.get_bool_or_default(config_keys::EXPAND_INTERNAL_FAB, true)
    }

    async fn get_internal_fab_cut_units(&self) -> RepositoryResult<Vec<String>> {
        let default = DEFAULT_INTERNAL_FAB_CUT_UNITS.join(",");
        let value = self.get_string_or_default(config_keys::INTERNAL_FAB_CUT_UNITS, &default)?;

        let units: Vec<String> = split_list(&value).map(|u| u.to_lowercase()).collect();
        if units.is_empty() {
            Ok(DEFAULT_INTERNAL_FAB_CUT_UNITS
                .iter()
                .map(|u| u.to_string())
                .collect())
        } else {
            Ok(units)
        }
    }

    async fn get_category_rules(&self) -> RepositoryResult<CategoryRules> {
        let defaults = CategoryRules::default();

        Ok(CategoryRules {
            fab_prefix: self.get_prefix_or_default(config_keys::FAB_PREFIX, &defaults.fab_prefix)?,
            coml_prefix: self
                .get_prefix_or_default(config_keys::COML_PREFIX, &defaults.coml_prefix)?,
            ctl_prefix: self.get_prefix_or_default(config_keys::CTL_PREFIX, &defaults.ctl_prefix)?,
            internal_supplier_ids: self.get_id_list(config_keys::INTERNAL_SUPPLIER_IDS)?,
            fab_category_ids: self.get_id_list(config_keys::FAB_CATEGORY_IDS)?,
            coml_category_ids: self.get_id_list(config_keys::COML_CATEGORY_IDS)?,
            ctl_category_ids: self.get_id_list(config_keys::CTL_CATEGORY_IDS)?,
            assembly_category_ids: self.get_id_list(config_keys::ASSEMBLY_CATEGORY_IDS)?,
        })
    }

    async fn get_default_max_depth(&self) -> RepositoryResult<u32> {
        self.get_parsed_or_default(config_keys::DEFAULT_MAX_DEPTH, 0u32)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 展开策略
    pub const EXPAND_PURCHASED_ASSEMBLIES: &str = "expand_purchased_assemblies";
    pub const INCLUDE_INTERNAL_FAB_IN_CUTLIST: &str = "include_internal_fab_in_cutlist";
    pub const EXPAND_INTERNAL_FAB: &str = "expand_internal_fab";
    pub const INTERNAL_FAB_CUT_UNITS: &str = "internal_fab_cut_units"; // 逗号分隔

    // 分类规则
    pub const FAB_PREFIX: &str = "fab_prefix";
    pub const COML_PREFIX: &str = "coml_prefix";
    pub const CTL_PREFIX: &str = "ctl_prefix";
    pub const INTERNAL_SUPPLIER_IDS: &str = "internal_supplier_ids"; // 逗号分隔

    // 分类目录映射(逗号分隔,子目录自动包含)
    pub const FAB_CATEGORY_IDS: &str = "fab_category_ids";
    pub const COML_CATEGORY_IDS: &str = "coml_category_ids";
    pub const CTL_CATEGORY_IDS: &str = "ctl_category_ids";
    pub const ASSEMBLY_CATEGORY_IDS: &str = "assembly_category_ids";

    // 遍历
    pub const DEFAULT_MAX_DEPTH: &str = "default_max_depth"; // 0 = 不限
}
