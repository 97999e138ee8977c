// ==========================================
// 车队管理系统 - 排班仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::schedule::VehicleSchedule;
use crate::domain::types::ScheduleStatus;
use crate::engine::stores::ScheduleStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::sync::{Arc, Mutex};

/// vehicle_schedule 表的原始行 (状态列未解析)
struct ScheduleRow {
    schedule_id: String,
    vehicle_id: String,
    driver_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status_raw: String,
    remark: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// ==========================================
// ScheduleRepository - 排班仓储
// ==========================================
/// 排班仓储
/// 职责: 管理 vehicle_schedule 表的查询与状态更新
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的 ScheduleRepository 实例
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

    /// ScheduleStatus 转字符串
    fn status_to_str(status: &ScheduleStatus) -> &'static str {
        match status {
            ScheduleStatus::Scheduled => "SCHEDULED",
            ScheduleStatus::Active => "ACTIVE",
            ScheduleStatus::Completed => "COMPLETED",
        }
    }

    /// 字符串转 ScheduleStatus
    fn str_to_status(s: &str) -> RepositoryResult<ScheduleStatus> {
        match s {
            "SCHEDULED" => Ok(ScheduleStatus::Scheduled),
            "ACTIVE" => Ok(ScheduleStatus::Active),
            "COMPLETED" => Ok(ScheduleStatus::Completed),
            other => Err(RepositoryError::ValidationError(format!(
                "未知的排班状态: {}",
                other
            ))),
        }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ScheduleRow> {
        Ok(ScheduleRow {
            schedule_id: row.get("schedule_id")?,
            vehicle_id: row.get("vehicle_id")?,
            driver_id: row.get("driver_id")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            status_raw: row.get("status")?,
            remark: row.get("remark")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_schedule(row: ScheduleRow) -> RepositoryResult<VehicleSchedule> {
        Ok(VehicleSchedule {
            status: Self::str_to_status(&row.status_raw)?,
            schedule_id: row.schedule_id,
            vehicle_id: row.vehicle_id,
            driver_id: row.driver_id,
            start_date: row.start_date,
            end_date: row.end_date,
            remark: row.remark,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    const SELECT_COLS: &'static str =
        "SELECT schedule_id, vehicle_id, driver_id, start_date, end_date, status, remark, \
         created_at, updated_at FROM vehicle_schedule";

    // ==========================================
    // 查询方法
    // ==========================================

    /// 读取全部排班
    pub fn list_all(&self) -> RepositoryResult<Vec<VehicleSchedule>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY start_date, schedule_id", Self::SELECT_COLS))?;

        let rows = stmt.query_map([], Self::map_row)?;
        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(Self::into_schedule(row?)?);
        }
        Ok(schedules)
    }

    /// 按状态集合读取排班
    pub fn list_by_statuses(
        &self,
        statuses: &[ScheduleStatus],
    ) -> RepositoryResult<Vec<VehicleSchedule>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = statuses.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "{} WHERE status IN ({}) ORDER BY start_date, schedule_id",
            Self::SELECT_COLS,
            placeholders
        );

        let status_strs: Vec<&str> = statuses.iter().map(Self::status_to_str).collect();

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(status_strs), Self::map_row)?;

        let mut schedules = Vec::new();
        for row in rows {
            schedules.push(Self::into_schedule(row?)?);
        }
        Ok(schedules)
    }

    // ==========================================
    // 写入方法
    // ==========================================

    /// 插入排班
    pub fn insert(&self, schedule: &VehicleSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO vehicle_schedule
                 (schedule_id, vehicle_id, driver_id, start_date, end_date, status, remark,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                schedule.schedule_id,
                schedule.vehicle_id,
                schedule.driver_id,
                schedule.start_date,
                schedule.end_date,
                Self::status_to_str(&schedule.status),
                schedule.remark,
                schedule.created_at,
                schedule.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 按ID更新排班状态 (仅状态列 + updated_at, 单行原子)
    pub fn update_status(
        &self,
        schedule_id: &str,
        status: ScheduleStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE vehicle_schedule SET status = ?1, updated_at = ?2 WHERE schedule_id = ?3",
            params![Self::status_to_str(&status), Utc::now(), schedule_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "VehicleSchedule".to_string(),
                id: schedule_id.to_string(),
            });
        }
        Ok(())
    }
}

// Engine 层 ScheduleStore 适配
#[async_trait]
impl ScheduleStore for ScheduleRepository {
    async fn list_schedules(
        &self,
        statuses: Option<&[ScheduleStatus]>,
    ) -> RepositoryResult<Vec<VehicleSchedule>> {
        match statuses {
            Some(filter) => self.list_by_statuses(filter),
            None => self.list_all(),
        }
    }

    async fn update_schedule_status(
        &self,
        schedule_id: &str,
        status: ScheduleStatus,
    ) -> RepositoryResult<()> {
        self.update_status(schedule_id, status)
    }
}
