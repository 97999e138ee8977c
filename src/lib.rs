// ==========================================
// 车队管理系统 - 核心库
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - 系统宪法
// 技术栈: Rust + SQLite
// 系统定位: 车队状态一致性与对账引擎 (界面层只消费快照)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 一致性与对账
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema 引导）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    InconsistencyKind, MaintenanceStatus, ReconcileActionKind, ScheduleStatus, VehicleStatus,
};

// 领域实体
pub use domain::{
    Driver, FleetSnapshot, Inconsistency, MaintenanceOrder, ReconciliationAction,
    ReconciliationSummary, Vehicle, VehicleSchedule,
};

// 引擎
pub use engine::{
    FleetIndex, FleetStores, FleetSyncOrchestrator, InconsistencyDetector, Reconciler, SyncPhase,
    TransitionApplier, VehicleStatePatch,
};

// API
pub use api::FleetSyncApi;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车队管理系统";
