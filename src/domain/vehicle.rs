// ==========================================
// 车队管理系统 - 车辆与司机领域模型
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART A 数据模型
// 对齐: schema_v0.1.sql vehicle / driver 表
// ==========================================

use crate::domain::types::VehicleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Vehicle - 车辆
// ==========================================
// 一致性约束 (由对账引擎维护, 不在模型层强制):
// - status=ACTIVE 时 assigned_driver_id 必须非空, 且存在活动排班或活动维修工单作为依据
// - status=MAINTENANCE/IDLE 时 assigned_driver_id 必须为空
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: String,                  // 车辆ID
    pub plate_no: String,                    // 车牌号
    pub model: Option<String>,               // 车型
    pub status: VehicleStatus,               // 车辆状态
    pub assigned_driver_id: Option<String>,  // 当前指派司机(非拥有引用)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// 判断车辆是否处于非运营状态 (MAINTENANCE 或 IDLE)
    pub fn is_non_active(&self) -> bool {
        matches!(
            self.status,
            VehicleStatus::Maintenance | VehicleStatus::Idle
        )
    }
}

// ==========================================
// Driver - 司机
// ==========================================
// 仅被 Vehicle / VehicleSchedule 引用, 引擎从不写入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: String,           // 司机ID
    pub name: String,                // 姓名
    pub license_no: String,          // 驾照编号
    pub phone: Option<String>,       // 联系电话
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
