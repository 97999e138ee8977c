// ==========================================
// 车队管理系统 - 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 用途: 启动时执行一个完整同步周期并输出对账摘要
// ==========================================

use fleet_management::api::FleetSyncApi;
use fleet_management::config::ConfigManager;
use fleet_management::db;
use fleet_management::engine::{FleetStores, FleetSyncOrchestrator};
use fleet_management::repository::{
    DriverRepository, MaintenanceOrderRepository, ScheduleRepository, VehicleRepository,
};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() {
    // 初始化日志系统
    fleet_management::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 状态一致性与对账引擎", fleet_management::APP_NAME);
    tracing::info!("系统版本: {}", fleet_management::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = db::get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 打开连接并引导 schema
    let conn = match db::open_sqlite_connection(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("数据库连接失败: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = db::init_schema(&conn) {
        tracing::error!("schema 初始化失败: {}", e);
        std::process::exit(1);
    }
    let conn = Arc::new(Mutex::new(conn));

    // 读取配置
    let config = ConfigManager::from_connection(conn.clone());
    let call_timeout = match config.get_repository_timeout() {
        Ok(timeout) => timeout,
        Err(e) => {
            tracing::warn!("读取配置失败, 使用默认超时: {}", e);
            std::time::Duration::from_secs(
                fleet_management::config::DEFAULT_REPOSITORY_TIMEOUT_SECS,
            )
        }
    };

    // 组装仓储与编排器
    let stores = FleetStores::new(
        Arc::new(VehicleRepository::from_connection(conn.clone())),
        Arc::new(DriverRepository::from_connection(conn.clone())),
        Arc::new(ScheduleRepository::from_connection(conn.clone())),
        Arc::new(MaintenanceOrderRepository::from_connection(conn)),
    );
    let orchestrator = Arc::new(FleetSyncOrchestrator::new(stores, call_timeout));
    let api = FleetSyncApi::new(orchestrator);

    // 执行一个同步周期
    match api.sync_now().await {
        Ok(snapshot) => {
            tracing::info!(
                vehicles = snapshot.vehicles.len(),
                drivers = snapshot.drivers.len(),
                schedules = snapshot.schedules.len(),
                maintenance_orders = snapshot.maintenance_orders.len(),
                "同步完成: {}",
                snapshot.reconciliation.summary_text()
            );
            for err in &snapshot.reconciliation.errors {
                tracing::warn!("局部失败: {}", err);
            }
        }
        Err(e) => {
            tracing::error!("同步失败: {}", e);
            std::process::exit(1);
        }
    }
}
