// ==========================================
// 车队管理系统 - 排班领域模型
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART A 数据模型
// 对齐: schema_v0.1.sql vehicle_schedule 表
// ==========================================

use crate::domain::types::ScheduleStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// VehicleSchedule - 车辆排班
// ==========================================
// 日期语义: start_date/end_date 均为日粒度, end_date 含当天(到当日结束)
// 生命周期: 创建即 SCHEDULED; 到达 start_date 当天转 ACTIVE;
//           end_date 次日转 COMPLETED, 之后不再被引擎触碰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSchedule {
    pub schedule_id: String,        // 排班ID
    pub vehicle_id: String,         // 车辆ID
    pub driver_id: String,          // 司机ID
    pub start_date: NaiveDate,      // 开始日期(含)
    pub end_date: NaiveDate,        // 结束日期(含)
    pub status: ScheduleStatus,     // 排班状态
    pub remark: Option<String>,     // 备注
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
