// ==========================================
// 车队管理系统 - 状态转换执行器
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART B 状态体系
// 职责: 对一批排班/维修工单计算到期转换并逐条持久化
// 红线: 从不写入 Vehicle; 单条失败只记录并跳过, 不回滚整批
//       (每条更新独立且幂等, 漏掉的条目下个周期自然补上)
// ==========================================

use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::schedule::VehicleSchedule;
use crate::engine::stores::FleetStores;
use crate::engine::transition_rules::{next_maintenance_status, next_schedule_status};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

// ==========================================
// TransitionReport - 转换执行结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TransitionReport {
    pub schedule_ids_updated: Vec<String>,   // 实际更新的排班ID
    pub order_ids_updated: Vec<String>,      // 实际更新的工单ID
    pub errors: Vec<String>,                 // 单条更新失败(已跳过)
}

impl TransitionReport {
    /// 本次执行的转换总数
    pub fn total_updated(&self) -> usize {
        self.schedule_ids_updated.len() + self.order_ids_updated.len()
    }
}

// ==========================================
// TransitionApplier - 状态转换执行器
// ==========================================
pub struct TransitionApplier {
    stores: FleetStores,
}

impl TransitionApplier {
    /// 创建新的执行器实例
    pub fn new(stores: FleetStores) -> Self {
        Self { stores }
    }

    /// 对全量排班/维修工单应用到期的日期驱动转换
    ///
    /// # 参数
    /// - schedules: 当前全量排班
    /// - orders: 当前全量维修工单
    /// - today: 当前日期 (日粒度)
    ///
    /// # 返回
    /// 实际发生更新的实体清单与逐条失败信息
    pub async fn apply_due_transitions(
        &self,
        schedules: &[VehicleSchedule],
        orders: &[MaintenanceOrder],
        today: NaiveDate,
    ) -> TransitionReport {
        let mut report = TransitionReport::default();

        for schedule in schedules {
            let new_status = match next_schedule_status(schedule, today) {
                Some(status) => status,
                None => continue,
            };

            debug!(
                schedule_id = %schedule.schedule_id,
                from = %schedule.status,
                to = %new_status,
                "排班状态转换到期"
            );

            match self
                .stores
                .schedule_store
                .update_schedule_status(&schedule.schedule_id, new_status)
                .await
            {
                Ok(()) => report.schedule_ids_updated.push(schedule.schedule_id.clone()),
                Err(e) => {
                    warn!(
                        schedule_id = %schedule.schedule_id,
                        error = %e,
                        "排班状态更新失败, 跳过该条继续处理"
                    );
                    report
                        .errors
                        .push(format!("排班{}状态更新失败: {}", schedule.schedule_id, e));
                }
            }
        }

        for order in orders {
            let new_status = match next_maintenance_status(order, today) {
                Some(status) => status,
                None => continue,
            };

            debug!(
                order_id = %order.order_id,
                from = %order.status,
                to = %new_status,
                "维修工单状态转换到期"
            );

            match self
                .stores
                .maintenance_store
                .update_order_status(&order.order_id, new_status)
                .await
            {
                Ok(()) => report.order_ids_updated.push(order.order_id.clone()),
                Err(e) => {
                    warn!(
                        order_id = %order.order_id,
                        error = %e,
                        "维修工单状态更新失败, 跳过该条继续处理"
                    );
                    report
                        .errors
                        .push(format!("维修工单{}状态更新失败: {}", order.order_id, e));
                }
            }
        }

        if report.total_updated() > 0 || !report.errors.is_empty() {
            info!(
                schedules_updated = report.schedule_ids_updated.len(),
                orders_updated = report.order_ids_updated.len(),
                errors = report.errors.len(),
                "状态转换执行完成"
            );
        }

        report
    }
}
