// ==========================================
// 车队管理系统 - 日期驱动状态转换规则
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART B 状态体系
// 职责: 纯函数, 由 (实体快照, today) 计算应发生的状态转换
// 红线: 状态只能前进, 永不回退; COMPLETED 为终态;
//       PENDING_AUTHORIZATION 永不被自动转出
// ==========================================

use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::schedule::VehicleSchedule;
use crate::domain::types::{MaintenanceStatus, ScheduleStatus};
use crate::engine::time_window::ActivityWindow;
use chrono::NaiveDate;

/// 计算排班应发生的状态转换
///
/// # 规则
/// - SCHEDULED → ACTIVE: start_date ≤ today ≤ end_date
/// - ACTIVE → COMPLETED: today > end_date
/// - 其他状态不触碰 (COMPLETED 为终态)
///
/// # 返回
/// - Some(新状态): 有转换到期
/// - None: 无需转换
pub fn next_schedule_status(
    schedule: &VehicleSchedule,
    today: NaiveDate,
) -> Option<ScheduleStatus> {
    let window = ActivityWindow::new(schedule.start_date, schedule.end_date);

    match schedule.status {
        ScheduleStatus::Scheduled if window.contains(today) => Some(ScheduleStatus::Active),
        ScheduleStatus::Active if window.is_elapsed(today) => Some(ScheduleStatus::Completed),
        _ => None,
    }
}

/// 计算维修工单应发生的状态转换
///
/// # 规则
/// - SCHEDULED → ACTIVE: start_date ≤ today ≤ estimated_completion_date
/// - ACTIVE → COMPLETED: today > estimated_completion_date
/// - PENDING_AUTHORIZATION 永不自动转换 (授权是人工动作)
pub fn next_maintenance_status(
    order: &MaintenanceOrder,
    today: NaiveDate,
) -> Option<MaintenanceStatus> {
    let window = ActivityWindow::new(order.start_date, order.estimated_completion_date);

    match order.status {
        MaintenanceStatus::Scheduled if window.contains(today) => Some(MaintenanceStatus::Active),
        MaintenanceStatus::Active if window.is_elapsed(today) => Some(MaintenanceStatus::Completed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn schedule(status: ScheduleStatus, start: NaiveDate, end: NaiveDate) -> VehicleSchedule {
        VehicleSchedule {
            schedule_id: "S001".to_string(),
            vehicle_id: "V001".to_string(),
            driver_id: "D001".to_string(),
            start_date: start,
            end_date: end,
            status,
            remark: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(status: MaintenanceStatus, start: NaiveDate, end: NaiveDate) -> MaintenanceOrder {
        MaintenanceOrder {
            order_id: "M001".to_string(),
            vehicle_id: "V001".to_string(),
            description: None,
            status,
            start_date: start,
            estimated_completion_date: end,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_schedule_activates_inside_window() {
        // 2024-01-10 ~ 2024-01-12, today=2024-01-11
        let s = schedule(ScheduleStatus::Scheduled, d(2024, 1, 10), d(2024, 1, 12));
        assert_eq!(
            next_schedule_status(&s, d(2024, 1, 11)),
            Some(ScheduleStatus::Active)
        );
    }

    #[test]
    fn test_schedule_not_yet_started() {
        let s = schedule(ScheduleStatus::Scheduled, d(2024, 1, 10), d(2024, 1, 12));
        assert_eq!(next_schedule_status(&s, d(2024, 1, 9)), None);
    }

    #[test]
    fn test_single_day_schedule_boundary() {
        // start == end == today: 当日转 ACTIVE
        let s = schedule(ScheduleStatus::Scheduled, d(2024, 1, 10), d(2024, 1, 10));
        assert_eq!(
            next_schedule_status(&s, d(2024, 1, 10)),
            Some(ScheduleStatus::Active)
        );

        // 同一排班在次日 (已 ACTIVE): 转 COMPLETED
        let s = schedule(ScheduleStatus::Active, d(2024, 1, 10), d(2024, 1, 10));
        assert_eq!(
            next_schedule_status(&s, d(2024, 1, 11)),
            Some(ScheduleStatus::Completed)
        );
    }

    #[test]
    fn test_schedule_completes_day_after_end() {
        let s = schedule(ScheduleStatus::Active, d(2024, 1, 10), d(2024, 1, 12));

        // 结束日当天仍然 ACTIVE
        assert_eq!(next_schedule_status(&s, d(2024, 1, 12)), None);
        // 次日转 COMPLETED
        assert_eq!(
            next_schedule_status(&s, d(2024, 1, 13)),
            Some(ScheduleStatus::Completed)
        );
    }

    #[test]
    fn test_missed_schedule_window_is_untouched() {
        // 窗口已整体错过的 SCHEDULED 排班不在两条转换规则之内, 保持原状
        let s = schedule(ScheduleStatus::Scheduled, d(2024, 1, 1), d(2024, 1, 3));
        assert_eq!(next_schedule_status(&s, d(2024, 1, 20)), None);
    }

    #[test]
    fn test_completed_schedule_is_terminal() {
        // COMPLETED 永不回退或再次转换
        let s = schedule(ScheduleStatus::Completed, d(2024, 1, 10), d(2024, 1, 12));
        assert_eq!(next_schedule_status(&s, d(2024, 1, 11)), None);
        assert_eq!(next_schedule_status(&s, d(2024, 1, 20)), None);
    }

    #[test]
    fn test_active_schedule_never_regresses() {
        // ACTIVE 在窗口内不产生任何转换 (不存在 ACTIVE → SCHEDULED)
        let s = schedule(ScheduleStatus::Active, d(2024, 1, 10), d(2024, 1, 12));
        assert_eq!(next_schedule_status(&s, d(2024, 1, 10)), None);
        assert_eq!(next_schedule_status(&s, d(2024, 1, 9)), None);
    }

    #[test]
    fn test_maintenance_activates_and_completes() {
        let m = order(MaintenanceStatus::Scheduled, d(2024, 2, 1), d(2024, 2, 5));
        assert_eq!(
            next_maintenance_status(&m, d(2024, 2, 1)),
            Some(MaintenanceStatus::Active)
        );

        let m = order(MaintenanceStatus::Active, d(2024, 2, 1), d(2024, 2, 5));
        assert_eq!(next_maintenance_status(&m, d(2024, 2, 5)), None);
        assert_eq!(
            next_maintenance_status(&m, d(2024, 2, 6)),
            Some(MaintenanceStatus::Completed)
        );
    }

    #[test]
    fn test_pending_authorization_never_auto_transitioned() {
        // 待授权工单即使窗口到期也不被引擎触碰
        let m = order(
            MaintenanceStatus::PendingAuthorization,
            d(2024, 2, 1),
            d(2024, 2, 5),
        );
        assert_eq!(next_maintenance_status(&m, d(2024, 2, 1)), None);
        assert_eq!(next_maintenance_status(&m, d(2024, 2, 3)), None);
        assert_eq!(next_maintenance_status(&m, d(2024, 3, 1)), None);
    }

    #[test]
    fn test_completed_maintenance_is_terminal() {
        let m = order(MaintenanceStatus::Completed, d(2024, 2, 1), d(2024, 2, 5));
        assert_eq!(next_maintenance_status(&m, d(2024, 2, 10)), None);
    }
}
