// ==========================================
// 车队管理系统 - 领域层
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART A 数据模型
// 红线: 领域模型不访问数据库, 不包含业务流程
// ==========================================

pub mod maintenance;
pub mod reconciliation;
pub mod schedule;
pub mod types;
pub mod vehicle;

// 重导出核心实体
pub use maintenance::MaintenanceOrder;
pub use reconciliation::{
    FleetSnapshot, Inconsistency, ReconciliationAction, ReconciliationSummary,
};
pub use schedule::VehicleSchedule;
pub use vehicle::{Driver, Vehicle};

// 重导出核心类型
pub use types::{
    InconsistencyKind, MaintenanceStatus, ReconcileActionKind, ScheduleStatus, VehicleStatus,
};
