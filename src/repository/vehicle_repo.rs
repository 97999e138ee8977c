// ==========================================
// 车队管理系统 - 车辆/司机仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::types::VehicleStatus;
use crate::domain::vehicle::{Driver, Vehicle};
use crate::engine::stores::{DriverStore, VehicleStatePatch, VehicleStore};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, ToSql};
use std::sync::{Arc, Mutex};

/// vehicle 表的原始行 (状态列未解析)
struct VehicleRow {
    vehicle_id: String,
    plate_no: String,
    model: Option<String>,
    status_raw: String,
    assigned_driver_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// ==========================================
// VehicleRepository - 车辆仓储
// ==========================================
/// 车辆仓储
/// 职责: 管理 vehicle 表的读取与按ID部分更新
/// 红线: 部分更新只写入变化的列, 且始终刷新 updated_at
pub struct VehicleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VehicleRepository {
    /// 创建新的 VehicleRepository 实例
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
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 枚举类型转换辅助方法
    // ==========================================

    /// VehicleStatus 转字符串
    fn status_to_str(status: &VehicleStatus) -> &'static str {
        match status {
            VehicleStatus::Active => "ACTIVE",
            VehicleStatus::Maintenance => "MAINTENANCE",
            VehicleStatus::Idle => "IDLE",
        }
    }

    /// 字符串转 VehicleStatus
    fn str_to_status(s: &str) -> RepositoryResult<VehicleStatus> {
        match s {
            "ACTIVE" => Ok(VehicleStatus::Active),
            "MAINTENANCE" => Ok(VehicleStatus::Maintenance),
            "IDLE" => Ok(VehicleStatus::Idle),
            other => Err(RepositoryError::ValidationError(format!(
                "未知的车辆状态: {}",
                other
            ))),
        }
    }

    /// 行映射 (状态列保持原始字符串, 解析在调用方完成以便返回仓储错误)
    fn map_row(row: &Row<'_>) -> rusqlite::Result<VehicleRow> {
        Ok(VehicleRow {
            vehicle_id: row.get("vehicle_id")?,
            plate_no: row.get("plate_no")?,
            model: row.get("model")?,
            status_raw: row.get("status")?,
            assigned_driver_id: row.get("assigned_driver_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// VehicleRow → Vehicle
    fn into_vehicle(row: VehicleRow) -> RepositoryResult<Vehicle> {
        Ok(Vehicle {
            status: Self::str_to_status(&row.status_raw)?,
            vehicle_id: row.vehicle_id,
            plate_no: row.plate_no,
            model: row.model,
            assigned_driver_id: row.assigned_driver_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    // ==========================================
    // 查询方法
    // ==========================================

    /// 读取全部车辆
    pub fn list_all(&self) -> RepositoryResult<Vec<Vehicle>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT vehicle_id, plate_no, model, status, assigned_driver_id, created_at, updated_at
             FROM vehicle ORDER BY vehicle_id",
        )?;

        let rows = stmt.query_map([], Self::map_row)?;

        let mut vehicles = Vec::new();
        for row in rows {
            vehicles.push(Self::into_vehicle(row?)?);
        }
        Ok(vehicles)
    }

    /// 按ID查询车辆
    pub fn find_by_id(&self, vehicle_id: &str) -> RepositoryResult<Option<Vehicle>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT vehicle_id, plate_no, model, status, assigned_driver_id, created_at, updated_at
             FROM vehicle WHERE vehicle_id = ?1",
        )?;

        let mut rows = stmt.query_map(params![vehicle_id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(Self::into_vehicle(row?)?)),
            None => Ok(None),
        }
    }

    // ==========================================
    // 写入方法
    // ==========================================

    /// 插入车辆
    pub fn insert(&self, vehicle: &Vehicle) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO vehicle
                 (vehicle_id, plate_no, model, status, assigned_driver_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                vehicle.vehicle_id,
                vehicle.plate_no,
                vehicle.model,
                Self::status_to_str(&vehicle.status),
                vehicle.assigned_driver_id,
                vehicle.created_at,
                vehicle.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID部分更新车辆状态/司机指派
    ///
    /// # 说明
    /// - 仅写入 patch 中出现的列, 单行单语句, 天然原子
    /// - 空 patch 直接返回, 不发起数据库调用
    pub fn update_state(&self, vehicle_id: &str, patch: &VehicleStatePatch) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut set_clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = &patch.status {
            set_clauses.push(format!("status = ?{}", values.len() + 1));
            values.push(Box::new(Self::status_to_str(status).to_string()));
        }
        if let Some(driver_id) = &patch.assigned_driver_id {
            set_clauses.push(format!("assigned_driver_id = ?{}", values.len() + 1));
            values.push(Box::new(driver_id.clone()));
        }

        set_clauses.push(format!("updated_at = ?{}", values.len() + 1));
        values.push(Box::new(Utc::now()));

        let sql = format!(
            "UPDATE vehicle SET {} WHERE vehicle_id = ?{}",
            set_clauses.join(", "),
            values.len() + 1
        );
        values.push(Box::new(vehicle_id.to_string()));

        let conn = self.get_conn()?;
        let affected = conn.execute(
            &sql,
            rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Vehicle".to_string(),
                id: vehicle_id.to_string(),
            });
        }
        Ok(())
    }
}

// Engine 层 VehicleStore 适配
#[async_trait]
impl VehicleStore for VehicleRepository {
    async fn list_vehicles(&self) -> RepositoryResult<Vec<Vehicle>> {
        self.list_all()
    }

    async fn update_vehicle(
        &self,
        vehicle_id: &str,
        patch: VehicleStatePatch,
    ) -> RepositoryResult<()> {
        self.update_state(vehicle_id, &patch)
    }
}

// ==========================================
// DriverRepository - 司机仓储
// ==========================================
/// 司机仓储
/// 职责: 管理 driver 表; 引擎侧只读
pub struct DriverRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DriverRepository {
    /// 创建新的 DriverRepository 实例
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

    /// 读取全部司机
    pub fn list_all(&self) -> RepositoryResult<Vec<Driver>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT driver_id, name, license_no, phone, created_at, updated_at
             FROM driver ORDER BY driver_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Driver {
                driver_id: row.get("driver_id")?,
                name: row.get("name")?,
                license_no: row.get("license_no")?,
                phone: row.get("phone")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            })
        })?;

        let mut drivers = Vec::new();
        for row in rows {
            drivers.push(row?);
        }
        Ok(drivers)
    }

    /// 插入司机
    pub fn insert(&self, driver: &Driver) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO driver (driver_id, name, license_no, phone, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                driver.driver_id,
                driver.name,
                driver.license_no,
                driver.phone,
                driver.created_at,
                driver.updated_at,
            ],
        )?;
        Ok(())
    }
}

// Engine 层 DriverStore 适配
#[async_trait]
impl DriverStore for DriverRepository {
    async fn list_drivers(&self) -> RepositoryResult<Vec<Driver>> {
        self.list_all()
    }
}
