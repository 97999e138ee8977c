// ==========================================
// 车队管理系统 - 维修工单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::types::MaintenanceStatus;
use crate::engine::stores::MaintenanceStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};

/// maintenance_order 表的原始行 (状态列未解析)
struct OrderRow {
    order_id: String,
    vehicle_id: String,
    description: Option<String>,
    status_raw: String,
    start_date: NaiveDate,
    estimated_completion_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// ==========================================
// MaintenanceOrderRepository - 维修工单仓储
// ==========================================
/// 维修工单仓储
/// 职责: 管理 maintenance_order 表的查询与状态更新
pub struct MaintenanceOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceOrderRepository {
    /// 创建新的 MaintenanceOrderRepository 实例
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

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 枚举类型转换辅助方法
    // ==========================================

    /// MaintenanceStatus 转字符串
    fn status_to_str(status: &MaintenanceStatus) -> &'static str {
        match status {
            MaintenanceStatus::PendingAuthorization => "PENDING_AUTHORIZATION",
            MaintenanceStatus::Scheduled => "SCHEDULED",
            MaintenanceStatus::Active => "ACTIVE",
            MaintenanceStatus::Completed => "COMPLETED",
        }
    }

    /// 字符串转 MaintenanceStatus
    fn str_to_status(s: &str) -> RepositoryResult<MaintenanceStatus> {
        match s {
            "PENDING_AUTHORIZATION" => Ok(MaintenanceStatus::PendingAuthorization),
            "SCHEDULED" => Ok(MaintenanceStatus::Scheduled),
            "ACTIVE" => Ok(MaintenanceStatus::Active),
            "COMPLETED" => Ok(MaintenanceStatus::Completed),
            other => Err(RepositoryError::ValidationError(format!(
                "未知的维修工单状态: {}",
                other
            ))),
        }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<OrderRow> {
        Ok(OrderRow {
            order_id: row.get("order_id")?,
            vehicle_id: row.get("vehicle_id")?,
            description: row.get("description")?,
            status_raw: row.get("status")?,
            start_date: row.get("start_date")?,
            estimated_completion_date: row.get("estimated_completion_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_order(row: OrderRow) -> RepositoryResult<MaintenanceOrder> {
        Ok(MaintenanceOrder {
            status: Self::str_to_status(&row.status_raw)?,
            order_id: row.order_id,
            vehicle_id: row.vehicle_id,
            description: row.description,
            start_date: row.start_date,
            estimated_completion_date: row.estimated_completion_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    const SELECT_COLS: &'static str =
        "SELECT order_id, vehicle_id, description, status, start_date, \
         estimated_completion_date, created_at, updated_at FROM maintenance_order";

    // ==========================================
    // 查询方法
    // ==========================================

    /// 读取全部维修工单
    pub fn list_all(&self) -> RepositoryResult<Vec<MaintenanceOrder>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("{} ORDER BY start_date, order_id", Self::SELECT_COLS))?;

        let rows = stmt.query_map([], Self::map_row)?;
        let mut orders = Vec::new();
        for row in rows {
            orders.push(Self::into_order(row?)?);
        }
        Ok(orders)
    }

    /// 按状态集合读取维修工单
    pub fn list_by_statuses(
        &self,
        statuses: &[MaintenanceStatus],
    ) -> RepositoryResult<Vec<MaintenanceOrder>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = statuses.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "{} WHERE status IN ({}) ORDER BY start_date, order_id",
            Self::SELECT_COLS,
            placeholders
        );

        let status_strs: Vec<&str> = statuses.iter().map(Self::status_to_str).collect();

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(status_strs), Self::map_row)?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(Self::into_order(row?)?);
        }
        Ok(orders)
    }

    // ==========================================
    // 写入方法
    // ==========================================

    /// 插入维修工单
    pub fn insert(&self, order: &MaintenanceOrder) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO maintenance_order
                 (order_id, vehicle_id, description, status, start_date,
                  estimated_completion_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                order.order_id,
                order.vehicle_id,
                order.description,
                Self::status_to_str(&order.status),
                order.start_date,
                order.estimated_completion_date,
                order.created_at,
                order.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID更新工单状态 (仅状态列 + updated_at, 单行原子)
    pub fn update_status(
        &self,
        order_id: &str,
        status: MaintenanceStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE maintenance_order SET status = ?1, updated_at = ?2 WHERE order_id = ?3",
            params![Self::status_to_str(&status), Utc::now(), order_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "MaintenanceOrder".to_string(),
                id: order_id.to_string(),
            });
        }
        Ok(())
    }
}

// Engine 层 MaintenanceStore 适配
#[async_trait]
impl MaintenanceStore for MaintenanceOrderRepository {
    async fn list_orders(
        &self,
        statuses: Option<&[MaintenanceStatus]>,
    ) -> RepositoryResult<Vec<MaintenanceOrder>> {
        match statuses {
            Some(filter) => self.list_by_statuses(filter),
            None => self.list_all(),
        }
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: MaintenanceStatus,
    ) -> RepositoryResult<()> {
        self.update_status(order_id, status)
    }
}
