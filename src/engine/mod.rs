// ==========================================
// 车队管理系统 - 引擎层
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART C/D 一致性与对账引擎
// ==========================================
// 职责: 实现状态一致性规则, 不拼 SQL
// 红线: Engine 不拼 SQL; 所有修复必须输出 reason; 策略以规则表显式表达
// ==========================================

pub mod inconsistency_detector;
pub mod orchestrator;
pub mod reconciler;
pub mod stores;
pub mod time_window;
pub mod transition_applier;
pub mod transition_rules;

// 重导出核心引擎
pub use inconsistency_detector::{FleetIndex, InconsistencyDetector, DETECTION_RULES};
pub use orchestrator::{FleetSyncOrchestrator, SyncPhase};
pub use reconciler::{ReconcileOutcome, Reconciler, StaleRepairKind, STALE_REPAIR_POLICY};
pub use stores::{
    DriverStore, FleetStores, MaintenanceStore, ScheduleStore, VehicleStatePatch, VehicleStore,
};
pub use time_window::ActivityWindow;
pub use transition_applier::{TransitionApplier, TransitionReport};
pub use transition_rules::{next_maintenance_status, next_schedule_status};
