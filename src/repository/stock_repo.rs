use crate::db::open_sqlite_connection;
use crate::domain::part::{PartId, StockLevel};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::IN_CLAUSE_CHUNK;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// StockRepository - 库存数据仓储
// ==========================================
/// 职责: 读写 part_stock 表
/// 红线: 只透传库存数字,不做缺口计算
pub struct StockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入(覆盖)一个零件的库存数据
    pub fn upsert_stock(&self, part_id: PartId, stock: StockLevel) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO part_stock (part_id, in_stock, allocated, on_order, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT(part_id) DO UPDATE SET
                in_stock = excluded.in_stock,
                allocated = excluded.allocated,
                on_order = excluded.on_order,
                updated_at = excluded.updated_at
            "#,
            params![part_id, stock.in_stock, stock.allocated, stock.on_order],
        )?;
        Ok(())
    }

    /// 批量查询库存(IN 查询,按块拆分)
    ///
    /// # 返回
    /// - 没有库存记录的零件不出现在结果中
    pub fn find_stock_levels(
        &self,
        part_ids: &[PartId],
    ) -> RepositoryResult<HashMap<PartId, StockLevel>> {
        let mut levels = HashMap::new();
        if part_ids.is_empty() {
            return Ok(levels);
        }

        let mut unique_ids = part_ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();

        let conn = self.get_conn()?;
        for chunk in unique_ids.chunks(IN_CLAUSE_CHUNK) {
            let placeholders = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let query = format!(
                "SELECT part_id, in_stock, allocated, on_order FROM part_stock WHERE part_id IN ({})",
                placeholders
            );

            let mut stmt = conn.prepare(&query)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                chunk.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok((
                        row.get::<_, PartId>(0)?,
                        StockLevel {
                            in_stock: row.get(1)?,
                            allocated: row.get(2)?,
                            on_order: row.get(3)?,
                        },
                    ))
                })?
                .collect::<SqliteResult<Vec<_>>>()?;
            levels.extend(rows);
        }

        debug!(
            requested = unique_ids.len(),
            found = levels.len(),
            "批量查询库存"
        );
        Ok(levels)
    }
}
