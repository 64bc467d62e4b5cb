use crate::db::open_sqlite_connection;
use crate::domain::part::{BomRow, PartId, PartRecord};
use crate::engine::catalog::PartCatalog;
use crate::engine::error::EngineResult;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::IN_CLAUSE_CHUNK;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

const PART_COLUMNS: &str = "part_id, ipn, name, description, units, is_assembly, is_active, \
                            purchaseable, default_supplier_id, category_id";

// ==========================================
// SqlitePartCatalog - 零件与 BOM 数据仓储
// ==========================================
/// 零件目录的 SQLite 实现
/// 职责: 读写 part / bom_item 表
/// 红线: 不含业务逻辑,分类与展开规则全部在引擎层
pub struct SqlitePartCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePartCatalog {
    /// 创建新的 SqlitePartCatalog 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 插入或替换零件
    pub fn upsert_part(&self, part: &PartRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO part (
                part_id, ipn, name, description, units,
                is_assembly, is_active, purchaseable, default_supplier_id, category_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                part.part_id,
                part.ipn,
                part.name,
                part.description,
                part.unit,
                part.is_assembly,
                part.is_active,
                part.purchaseable,
                part.default_supplier_id,
                part.category_id,
            ],
        )?;
        Ok(())
    }

    /// 追加一条 BOM 行
    ///
    /// # 返回
    /// - Ok(i64): 新 BOM 行 ID
    pub fn insert_bom_row(
        &self,
        parent_id: PartId,
        row: &BomRow,
        sort_order: i64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO bom_item (
                parent_id, child_id, quantity, reference, notes,
                unit_override, optional, consumable, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                parent_id,
                row.child_id,
                row.quantity,
                row.reference,
                row.notes,
                row.unit_override,
                row.optional,
                row.consumable,
                sort_order,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 插入或替换分类目录节点
    ///
    /// # 参数
    /// - parent_id: 上级目录(None = 顶级目录)
    pub fn upsert_category(
        &self,
        category_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO part_category (category_id, parent_id, name) VALUES (?1, ?2, ?3)",
            params![category_id, parent_id, name],
        )?;
        Ok(())
    }

    /// 删除零件(BOM 行保留,宿主删除零件后残留引用即为此状态)
    pub fn delete_part(&self, part_id: PartId) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM part WHERE part_id = ?1", params![part_id])?;
        Ok(affected)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按 part_id 查询零件
    ///
    /// # 返回
    /// - Ok(Some(PartRecord)): 找到记录
    /// - Ok(None): 未找到记录
    /// - Err: 数据库错误
    pub fn find_part(&self, part_id: PartId) -> RepositoryResult<Option<PartRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM part WHERE part_id = ?1",
            PART_COLUMNS
        ))?;

        match stmt.query_row(params![part_id], map_part_row) {
            Ok(part) => Ok(Some(part)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 批量查询零件(IN 查询,按块拆分)
    pub fn find_parts(&self, part_ids: &[PartId]) -> RepositoryResult<HashMap<PartId, PartRecord>> {
        let mut parts = HashMap::with_capacity(part_ids.len());
        if part_ids.is_empty() {
            return Ok(parts);
        }

        let mut unique_ids = part_ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();

        let conn = self.get_conn()?;
        for chunk in unique_ids.chunks(IN_CLAUSE_CHUNK) {
            let placeholders = chunk.iter().map(|_| "?").collect::<Vec<_>>().join(",");
            let query = format!(
                "SELECT {} FROM part WHERE part_id IN ({})",
                PART_COLUMNS, placeholders
            );

            let mut stmt = conn.prepare(&query)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                chunk.iter().map(|id| id as &dyn rusqlite::ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), map_part_row)?
                .collect::<SqliteResult<Vec<PartRecord>>>()?;
            for part in rows {
                parts.insert(part.part_id, part);
            }
        }

        debug!(
            requested = unique_ids.len(),
            found = parts.len(),
            "批量查询零件"
        );
        Ok(parts)
    }

    /// 展开分类目录: 返回给定目录及其全部子孙目录
    ///
    /// 给定目录本身总在结果中(即使目录表中没有该记录),结果去重
    pub fn find_category_descendants(&self, category_ids: &[i64]) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            WITH RECURSIVE subtree(category_id) AS (
                SELECT ?1
                UNION
                SELECT c.category_id
                FROM part_category c
                JOIN subtree s ON c.parent_id = s.category_id
            )
            SELECT category_id FROM subtree
            "#,
        )?;

        let mut expanded: Vec<i64> = Vec::with_capacity(category_ids.len());
        for &root in category_ids {
            let ids = stmt
                .query_map(params![root], |row| row.get::<_, i64>(0))?
                .collect::<SqliteResult<Vec<i64>>>()?;
            for id in ids {
                if !expanded.contains(&id) {
                    expanded.push(id);
                }
            }
        }

        debug!(
            configured = category_ids.len(),
            expanded = expanded.len(),
            "展开分类目录"
        );
        Ok(expanded)
    }

    /// 查询装配件的 BOM 行(按 sort_order, id 排序)
    pub fn find_bom_rows(&self, parent_id: PartId) -> RepositoryResult<Vec<BomRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT child_id, quantity, reference, notes, unit_override, optional, consumable
            FROM bom_item
            WHERE parent_id = ?1
            ORDER BY sort_order, id
            "#,
        )?;

        let rows = stmt
            .query_map(params![parent_id], |row| {
                Ok(BomRow {
                    child_id: row.get(0)?,
                    quantity: row.get(1)?,
                    reference: row.get(2)?,
                    notes: row.get(3)?,
                    unit_override: row.get(4)?,
                    optional: row.get(5)?,
                    consumable: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<BomRow>>>()?;

        Ok(rows)
    }
}

fn map_part_row(row: &Row<'_>) -> SqliteResult<PartRecord> {
    Ok(PartRecord {
        part_id: row.get(0)?,
        ipn: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        unit: row.get(4)?,
        is_assembly: row.get(5)?,
        is_active: row.get(6)?,
        purchaseable: row.get(7)?,
        default_supplier_id: row.get(8)?,
        category_id: row.get(9)?,
    })
}

// ==========================================
// PartCatalog Trait 实现
// ==========================================
impl PartCatalog for SqlitePartCatalog {
    fn get_part(&self, part_id: PartId) -> EngineResult<Option<PartRecord>> {
        Ok(self.find_part(part_id)?)
    }

    fn get_bom_rows(&self, assembly_id: PartId) -> EngineResult<Vec<BomRow>> {
        Ok(self.find_bom_rows(assembly_id)?)
    }

    fn get_parts(&self, part_ids: &[PartId]) -> EngineResult<HashMap<PartId, PartRecord>> {
        Ok(self.find_parts(part_ids)?)
    }
}
