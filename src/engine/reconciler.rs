// ==========================================
// 车队管理系统 - 对账修复引擎
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART C 对账引擎
// 职责: 对每条不一致按既定策略执行至多一次修复
// 红线: 修复策略是有序规则表, 首个命中即停; 所有修复必须输出 reason;
//       修复幂等: 对已一致车队重复执行产生零写入
// ==========================================

use crate::domain::reconciliation::{Inconsistency, ReconciliationAction};
use crate::domain::types::{InconsistencyKind, ReconcileActionKind, VehicleStatus};
use crate::engine::inconsistency_detector::FleetIndex;
use crate::engine::stores::{FleetStores, VehicleStatePatch};
use crate::repository::error::RepositoryResult;
use tracing::{info, warn};

// ==========================================
// 失据指派的修复策略表
// ==========================================
// 优先级编码业务策略: "维修安全优先于继续运营",
// "任何车辆不得保持一个无人能解释的指派"

/// 失据指派的修复分支
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleRepairKind {
    /// 存在已排期维修工单 → 转入维修并清除司机
    EnterMaintenance,
    /// 存在下一条已排班 → 保持运营, 司机换为下一合法人选
    ReassignNextSchedule,
    /// 无任何排期 → 降级闲置并清除司机
    DemoteIdle,
}

/// 带条件的修复分支
pub struct StaleRepairRule {
    pub kind: StaleRepairKind,
    applies: fn(&FleetIndex, &str) -> bool,
}

/// 失据指派修复策略 (顺序即优先级): 自上而下求值, 首个命中即停
pub const STALE_REPAIR_POLICY: &[StaleRepairRule] = &[
    StaleRepairRule {
        kind: StaleRepairKind::EnterMaintenance,
        applies: |index, vehicle_id| index.scheduled_order(vehicle_id).is_some(),
    },
    StaleRepairRule {
        kind: StaleRepairKind::ReassignNextSchedule,
        applies: |index, vehicle_id| index.scheduled_schedule(vehicle_id).is_some(),
    },
    StaleRepairRule {
        kind: StaleRepairKind::DemoteIdle,
        applies: |_, _| true,
    },
];

// ==========================================
// ReconcileOutcome - 对账修复结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub actions: Vec<ReconciliationAction>,  // 实际执行的修复
    pub errors: Vec<String>,                 // 单车修复失败(已跳过)
}

// ==========================================
// Reconciler - 对账修复引擎
// ==========================================
pub struct Reconciler {
    stores: FleetStores,
}

impl Reconciler {
    /// 创建新的对账引擎实例
    pub fn new(stores: FleetStores) -> Self {
        Self { stores }
    }

    /// 按检测顺序逐条修复不一致
    ///
    /// # 参数
    /// - inconsistencies: 检测器输出 (顺序保留)
    /// - index: 本周期联结索引
    ///
    /// # 返回
    /// 修复动作清单与逐车失败信息; 单车失败不阻断其余修复
    pub async fn reconcile(
        &self,
        inconsistencies: &[Inconsistency],
        index: &FleetIndex,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();

        for inconsistency in inconsistencies {
            match self.repair_one(inconsistency, index).await {
                Ok(Some(action)) => {
                    info!(
                        vehicle_id = %action.vehicle_id,
                        kind = %action.kind,
                        reason = %action.reason,
                        "车辆不一致已修复"
                    );
                    outcome.actions.push(action);
                }
                Ok(None) => {
                    // 计算出的修复与现状相同, 无需写入
                }
                Err(e) => {
                    warn!(
                        vehicle_id = %inconsistency.vehicle_id,
                        error = %e,
                        "车辆修复失败, 跳过该车继续处理"
                    );
                    outcome.errors.push(format!(
                        "车辆{}修复失败({}): {}",
                        inconsistency.vehicle_id, inconsistency.kind, e
                    ));
                }
            }
        }

        outcome
    }

    /// 对单条不一致计算并执行修复
    ///
    /// # 返回
    /// - Ok(Some(action)): 已执行修复
    /// - Ok(None): 修复结果与现状一致, 未发起写入
    /// - Err: 持久化更新失败
    async fn repair_one(
        &self,
        inconsistency: &Inconsistency,
        index: &FleetIndex,
    ) -> RepositoryResult<Option<ReconciliationAction>> {
        let vehicle_id = inconsistency.vehicle_id.as_str();

        match inconsistency.kind {
            // 运营中但无司机: 有活动排班则回填其司机, 否则降级闲置
            // (引擎绝不凭空发明司机, 没有依据时只能降级)
            InconsistencyKind::ActiveWithoutDriver => {
                if let Some(schedule) = index.active_schedule(vehicle_id) {
                    let patch = VehicleStatePatch::driver(Some(schedule.driver_id.clone()));
                    self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                    Ok(Some(ReconciliationAction::new(
                        vehicle_id,
                        ReconcileActionKind::AssignDriver,
                        "assigned_driver_id=NULL".to_string(),
                        format!("assigned_driver_id={}", schedule.driver_id),
                        format!("活动排班{}要求司机{}在岗, 据此回填指派", schedule.schedule_id, schedule.driver_id),
                    )))
                } else {
                    let patch = VehicleStatePatch::status(VehicleStatus::Idle);
                    self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                    Ok(Some(ReconciliationAction::new(
                        vehicle_id,
                        ReconcileActionKind::DemoteToIdle,
                        format!("status={}", inconsistency.vehicle_status),
                        "status=IDLE".to_string(),
                        "不存在支撑ACTIVE状态的活动排班或维修工单, 降级为闲置".to_string(),
                    )))
                }
            }

            // 非运营状态却挂着司机: 状态为准, 无条件清除指派
            InconsistencyKind::NonActiveWithDriver => {
                let old_driver = inconsistency.assigned_driver_id.as_deref().unwrap_or("?");
                let patch = VehicleStatePatch::driver(None);
                self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                Ok(Some(ReconciliationAction::new(
                    vehicle_id,
                    ReconcileActionKind::UnassignDriver,
                    format!("assigned_driver_id={}", old_driver),
                    "assigned_driver_id=NULL".to_string(),
                    format!(
                        "车辆处于{}状态, 不得保留司机指派",
                        inconsistency.vehicle_status
                    ),
                )))
            }

            // 运营中但指派失去依据: 按修复策略表裁决竞争中的合法去向
            InconsistencyKind::ActiveStaleAssignment => {
                self.repair_stale_assignment(inconsistency, index).await
            }
        }
    }

    /// 失据指派修复: 按 STALE_REPAIR_POLICY 自上而下取首个适用分支
    async fn repair_stale_assignment(
        &self,
        inconsistency: &Inconsistency,
        index: &FleetIndex,
    ) -> RepositoryResult<Option<ReconciliationAction>> {
        let vehicle_id = inconsistency.vehicle_id.as_str();
        let old_driver = inconsistency.assigned_driver_id.as_deref().unwrap_or("?");

        let branch = STALE_REPAIR_POLICY
            .iter()
            .find(|rule| (rule.applies)(index, vehicle_id))
            .map(|rule| rule.kind)
            // 兜底分支恒真, find 不可能落空
            .unwrap_or(StaleRepairKind::DemoteIdle);

        match branch {
            StaleRepairKind::EnterMaintenance => {
                // 维修安全优先于任何司机指派
                let order_id = index
                    .scheduled_order(vehicle_id)
                    .map(|o| o.order_id.clone())
                    .unwrap_or_default();
                let patch =
                    VehicleStatePatch::status_and_driver(VehicleStatus::Maintenance, None);
                self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                Ok(Some(ReconciliationAction::new(
                    vehicle_id,
                    ReconcileActionKind::FixStaleAssignment,
                    format!("status=ACTIVE, assigned_driver_id={}", old_driver),
                    "status=MAINTENANCE, assigned_driver_id=NULL".to_string(),
                    format!(
                        "指派失去活动依据且存在已排期维修工单{}, 维修优先, 转入维修并清除司机",
                        order_id
                    ),
                )))
            }

            StaleRepairKind::ReassignNextSchedule => {
                let schedule = match index.scheduled_schedule(vehicle_id) {
                    Some(s) => s,
                    None => return Ok(None),
                };

                // 下一班司机与现指派相同: 修复与现状一致, 零写入 (幂等保证)
                if inconsistency.assigned_driver_id.as_deref() == Some(schedule.driver_id.as_str())
                {
                    return Ok(None);
                }

                let patch = VehicleStatePatch::driver(Some(schedule.driver_id.clone()));
                self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                Ok(Some(ReconciliationAction::new(
                    vehicle_id,
                    ReconcileActionKind::FixStaleAssignment,
                    format!("assigned_driver_id={}", old_driver),
                    format!("assigned_driver_id={}", schedule.driver_id),
                    format!(
                        "指派失去活动依据, 改指派为下一条排班{}的司机{}",
                        schedule.schedule_id, schedule.driver_id
                    ),
                )))
            }

            StaleRepairKind::DemoteIdle => {
                let patch = VehicleStatePatch::status_and_driver(VehicleStatus::Idle, None);
                self.stores.vehicle_store.update_vehicle(vehicle_id, patch).await?;
                Ok(Some(ReconciliationAction::new(
                    vehicle_id,
                    ReconcileActionKind::FixStaleAssignment,
                    format!("status=ACTIVE, assigned_driver_id={}", old_driver),
                    "status=IDLE, assigned_driver_id=NULL".to_string(),
                    "指派失去活动依据且无任何排期, 降级闲置并清除司机".to_string(),
                )))
            }
        }
    }
}
