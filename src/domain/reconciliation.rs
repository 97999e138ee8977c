// ==========================================
// 车队管理系统 - 对账领域模型
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART C 对账引擎
// 红线: 所有修复必须输出 reason, 每个动作必须可审计
// ==========================================

use crate::domain::types::{InconsistencyKind, ReconcileActionKind, VehicleStatus};
use serde::{Deserialize, Serialize};

use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::schedule::VehicleSchedule;
use crate::domain::vehicle::{Driver, Vehicle};

// ==========================================
// Inconsistency - 不一致记录
// ==========================================
// 瞬态对象: 仅在单次对账周期内存在, 不落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inconsistency {
    pub vehicle_id: String,                  // 车辆ID
    pub vehicle_status: VehicleStatus,       // 检测时的车辆状态
    pub assigned_driver_id: Option<String>,  // 检测时的司机指派
    pub kind: InconsistencyKind,             // 不一致类别
    pub detail: String,                      // 诊断描述
}

// ==========================================
// ReconciliationAction - 对账修复动作
// ==========================================
// 瞬态对象: 返回给调用方用于审计/日志, 不落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationAction {
    pub action_id: String,              // 动作ID (UUID)
    pub vehicle_id: String,             // 车辆ID
    pub kind: ReconcileActionKind,      // 动作类别
    pub old_value: String,              // 修复前取值描述
    pub new_value: String,              // 修复后取值描述
    pub reason: String,                 // 修复原因(人类可读)
}

impl ReconciliationAction {
    /// 创建新的修复动作记录
    pub fn new(
        vehicle_id: &str,
        kind: ReconcileActionKind,
        old_value: String,
        new_value: String,
        reason: String,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            vehicle_id: vehicle_id.to_string(),
            kind,
            old_value,
            new_value,
            reason,
        }
    }
}

// ==========================================
// ReconciliationSummary - 对账摘要
// ==========================================
// 用途: 同步结果中唯一的运维可见面, 用于日志/观测, 不阻塞界面
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub inconsistencies_found: usize,        // 检出的不一致数量
    pub actions_performed: usize,            // 实际执行的修复数量
    pub errors: Vec<String>,                 // 局部失败列表(不致命)
    pub elapsed_ms: u64,                     // 对账耗时(毫秒)
}

impl ReconciliationSummary {
    /// 判断本次对账是否有显著结果 (用于日志级别选择)
    pub fn has_findings(&self) -> bool {
        self.inconsistencies_found > 0 || !self.errors.is_empty()
    }

    /// 生成简短摘要文本
    pub fn summary_text(&self) -> String {
        format!(
            "检出{}项不一致, 执行{}项修复, {}项失败, 耗时{}ms",
            self.inconsistencies_found,
            self.actions_performed,
            self.errors.len(),
            self.elapsed_ms
        )
    }
}

// ==========================================
// FleetSnapshot - 车队数据快照
// ==========================================
// sync 的最终输出: 四类实体的一致视图 + 对账摘要
// 约束: 若本周期发生过状态转换, 快照必须来自转换后的重新拉取,
//       下游永远不会看到转换前后混合的数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub schedules: Vec<VehicleSchedule>,
    pub maintenance_orders: Vec<MaintenanceOrder>,

    /// 本周期的同步/对账摘要 (对账仅发生在首个周期, 之后的周期计数为零,
    /// errors 则承载转换应用阶段的局部失败)
    pub reconciliation: ReconciliationSummary,

    /// 本周期应用的日期驱动状态转换数量
    pub transitions_applied: usize,
}
