// ==========================================
// 车队管理系统 - 领域类型定义
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART B 状态体系
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 车辆状态 (Vehicle Status)
// ==========================================
// 红线: ACTIVE 必须有司机且有活动依据; MAINTENANCE/IDLE 必须无司机
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Active,      // 运营中
    Maintenance, // 维修中
    Idle,        // 闲置
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::Active => write!(f, "ACTIVE"),
            VehicleStatus::Maintenance => write!(f, "MAINTENANCE"),
            VehicleStatus::Idle => write!(f, "IDLE"),
        }
    }
}

// ==========================================
// 排班状态 (Schedule Status)
// ==========================================
// 生命周期: SCHEDULED → ACTIVE → COMPLETED
// COMPLETED 为终态, 引擎不会回退或重新激活
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Scheduled, // 已排班(未开始)
    Active,    // 进行中
    Completed, // 已完成
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleStatus::Scheduled => write!(f, "SCHEDULED"),
            ScheduleStatus::Active => write!(f, "ACTIVE"),
            ScheduleStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 维修工单状态 (Maintenance Status)
// ==========================================
// 生命周期: PENDING_AUTHORIZATION →(人工授权)→ SCHEDULED → ACTIVE → COMPLETED
// 红线: 引擎只驱动 SCHEDULED → ACTIVE → COMPLETED,
//       PENDING_AUTHORIZATION 的流出只能由人工授权触发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    PendingAuthorization, // 待授权
    Scheduled,            // 已排期
    Active,               // 维修中
    Completed,            // 已完成
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceStatus::PendingAuthorization => write!(f, "PENDING_AUTHORIZATION"),
            MaintenanceStatus::Scheduled => write!(f, "SCHEDULED"),
            MaintenanceStatus::Active => write!(f, "ACTIVE"),
            MaintenanceStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ==========================================
// 不一致类别 (Inconsistency Kind)
// ==========================================
// 检测顺序固定: 1 → 2 → 3, 每辆车最多命中一条
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InconsistencyKind {
    ActiveWithoutDriver,    // 运营中但无司机
    NonActiveWithDriver,    // 非运营状态却挂着司机
    ActiveStaleAssignment,  // 运营中但指派已失去活动依据
}

impl fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InconsistencyKind::ActiveWithoutDriver => write!(f, "ACTIVE_WITHOUT_DRIVER"),
            InconsistencyKind::NonActiveWithDriver => write!(f, "NON_ACTIVE_WITH_DRIVER"),
            InconsistencyKind::ActiveStaleAssignment => write!(f, "ACTIVE_STALE_ASSIGNMENT"),
        }
    }
}

// ==========================================
// 修复动作类别 (Reconcile Action Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileActionKind {
    AssignDriver,       // 从活动排班回填司机
    UnassignDriver,     // 清除不应存在的司机指派
    FixStaleAssignment, // 处理失去依据的指派(转维修/换班/降级)
    DemoteToIdle,       // 无任何依据, 降级为闲置
}

impl ReconcileActionKind {
    /// 转换为字符串 (用于日志与审计)
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileActionKind::AssignDriver => "ASSIGN_DRIVER",
            ReconcileActionKind::UnassignDriver => "UNASSIGN_DRIVER",
            ReconcileActionKind::FixStaleAssignment => "FIX_STALE_ASSIGNMENT",
            ReconcileActionKind::DemoteToIdle => "DEMOTE_TO_IDLE",
        }
    }
}

impl fmt::Display for ReconcileActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
