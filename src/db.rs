// ==========================================
// 车队管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供 schema 引导，保证空库可直接启动
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 数据库文件路径环境变量
pub const DB_PATH_ENV: &str = "FLEET_DB_PATH";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 获取默认数据库路径
///
/// 优先级: FLEET_DB_PATH 环境变量 > 系统数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return path;
        }
    }

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("fleet-management");
        // 目录创建失败时回落到当前目录, 不让路径探测阻断启动
        if std::fs::create_dir_all(&app_dir).is_ok() {
            return app_dir.join("fleet.db").to_string_lossy().to_string();
        }
    }

    "fleet.db".to_string()
}

/// 初始化数据库 schema（幂等）
///
/// # 说明
/// - 仅创建缺失的表, 已有数据不受影响
/// - 枚举列以 TEXT 存储, 取值为 SCREAMING_SNAKE_CASE, 与领域类型的 Display 一致
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS driver (
            driver_id   TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            license_no  TEXT NOT NULL,
            phone       TEXT,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vehicle (
            vehicle_id          TEXT PRIMARY KEY,
            plate_no            TEXT NOT NULL,
            model               TEXT,
            status              TEXT NOT NULL,
            assigned_driver_id  TEXT REFERENCES driver(driver_id),
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vehicle_schedule (
            schedule_id  TEXT PRIMARY KEY,
            vehicle_id   TEXT NOT NULL REFERENCES vehicle(vehicle_id),
            driver_id    TEXT NOT NULL REFERENCES driver(driver_id),
            start_date   TEXT NOT NULL,
            end_date     TEXT NOT NULL,
            status       TEXT NOT NULL,
            remark       TEXT,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_vehicle_schedule_vehicle_status
            ON vehicle_schedule(vehicle_id, status);

        CREATE TABLE IF NOT EXISTS maintenance_order (
            order_id                   TEXT PRIMARY KEY,
            vehicle_id                 TEXT NOT NULL REFERENCES vehicle(vehicle_id),
            description                TEXT,
            status                     TEXT NOT NULL,
            start_date                 TEXT NOT NULL,
            estimated_completion_date  TEXT NOT NULL,
            created_at                 TEXT NOT NULL,
            updated_at                 TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_maintenance_order_vehicle_status
            ON maintenance_order(vehicle_id, status);

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id    TEXT NOT NULL,
            key         TEXT NOT NULL,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;
    Ok(())
}
