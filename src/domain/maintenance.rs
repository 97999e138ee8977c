// ==========================================
// 车队管理系统 - 维修工单领域模型
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART A 数据模型
// 对齐: schema_v0.1.sql maintenance_order 表
// ==========================================

use crate::domain::types::MaintenanceStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceOrder - 维修工单
// ==========================================
// 红线: PENDING_AUTHORIZATION 只能由人工授权转出, 引擎永不自动处理;
//       引擎只驱动 SCHEDULED → ACTIVE → COMPLETED
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceOrder {
    pub order_id: String,                        // 工单ID
    pub vehicle_id: String,                      // 车辆ID
    pub description: Option<String>,             // 维修内容
    pub status: MaintenanceStatus,               // 工单状态
    pub start_date: NaiveDate,                   // 计划开始日期(含)
    pub estimated_completion_date: NaiveDate,    // 预计完成日期(含)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
