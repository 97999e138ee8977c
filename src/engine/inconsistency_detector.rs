// ==========================================
// 车队管理系统 - 不一致检测器
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART C 对账引擎
// 职责: 将每辆车归入至多一个不一致类别
// 红线: 检测顺序是策略的一部分, 以规则表形式显式表达,
//       自上而下求值, 首个命中即停
// ==========================================

use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::reconciliation::Inconsistency;
use crate::domain::schedule::VehicleSchedule;
use crate::domain::types::{InconsistencyKind, MaintenanceStatus, ScheduleStatus, VehicleStatus};
use crate::domain::vehicle::Vehicle;
use std::collections::HashMap;
use tracing::{debug, info};

// ==========================================
// FleetIndex - 周期内联结索引
// ==========================================
// 每个对账周期构建一次 (vehicle_id → 活动/已排班的排班与工单),
// 避免逐车重复扫描全量列表
#[derive(Debug, Default)]
pub struct FleetIndex {
    active_schedule_by_vehicle: HashMap<String, VehicleSchedule>,
    scheduled_schedule_by_vehicle: HashMap<String, VehicleSchedule>,
    active_order_by_vehicle: HashMap<String, MaintenanceOrder>,
    scheduled_order_by_vehicle: HashMap<String, MaintenanceOrder>,
}

impl FleetIndex {
    /// 从排班/维修工单列表构建索引
    ///
    /// 同一辆车存在多条同状态记录时保留 start_date 最早的一条,
    /// 保证后续修复选择是确定性的
    pub fn build(schedules: &[VehicleSchedule], orders: &[MaintenanceOrder]) -> Self {
        let mut index = FleetIndex::default();

        for schedule in schedules {
            let slot = match schedule.status {
                ScheduleStatus::Active => &mut index.active_schedule_by_vehicle,
                ScheduleStatus::Scheduled => &mut index.scheduled_schedule_by_vehicle,
                ScheduleStatus::Completed => continue,
            };
            slot.entry(schedule.vehicle_id.clone())
                .and_modify(|kept: &mut VehicleSchedule| {
                    if schedule.start_date < kept.start_date {
                        *kept = schedule.clone();
                    }
                })
                .or_insert_with(|| schedule.clone());
        }

        for order in orders {
            let slot = match order.status {
                MaintenanceStatus::Active => &mut index.active_order_by_vehicle,
                MaintenanceStatus::Scheduled => &mut index.scheduled_order_by_vehicle,
                // 待授权工单不构成任何活动依据; 已完成工单不参与联结
                MaintenanceStatus::PendingAuthorization | MaintenanceStatus::Completed => continue,
            };
            slot.entry(order.vehicle_id.clone())
                .and_modify(|kept: &mut MaintenanceOrder| {
                    if order.start_date < kept.start_date {
                        *kept = order.clone();
                    }
                })
                .or_insert_with(|| order.clone());
        }

        index
    }

    /// 车辆当前的活动排班
    pub fn active_schedule(&self, vehicle_id: &str) -> Option<&VehicleSchedule> {
        self.active_schedule_by_vehicle.get(vehicle_id)
    }

    /// 车辆下一条已排班 (start_date 最早)
    pub fn scheduled_schedule(&self, vehicle_id: &str) -> Option<&VehicleSchedule> {
        self.scheduled_schedule_by_vehicle.get(vehicle_id)
    }

    /// 车辆当前的活动维修工单
    pub fn active_order(&self, vehicle_id: &str) -> Option<&MaintenanceOrder> {
        self.active_order_by_vehicle.get(vehicle_id)
    }

    /// 车辆下一条已排期维修工单 (start_date 最早)
    pub fn scheduled_order(&self, vehicle_id: &str) -> Option<&MaintenanceOrder> {
        self.scheduled_order_by_vehicle.get(vehicle_id)
    }

    /// 车辆是否存在活动依据 (活动排班或活动维修工单)
    pub fn has_live_activity(&self, vehicle_id: &str) -> bool {
        self.active_schedule(vehicle_id).is_some() || self.active_order(vehicle_id).is_some()
    }
}

// ==========================================
// 检测规则表
// ==========================================

/// 单条检测规则: 命中时返回诊断描述
type DetectFn = fn(&Vehicle, &FleetIndex) -> Option<String>;

/// 带标签的检测规则
pub struct DetectionRule {
    pub kind: InconsistencyKind,
    matcher: DetectFn,
}

/// 规则1: 运营中但无司机
fn match_active_without_driver(vehicle: &Vehicle, _index: &FleetIndex) -> Option<String> {
    if vehicle.status == VehicleStatus::Active && vehicle.assigned_driver_id.is_none() {
        Some(format!("车辆{}状态为ACTIVE但未指派司机", vehicle.vehicle_id))
    } else {
        None
    }
}

/// 规则2: 非运营状态却挂着司机
fn match_non_active_with_driver(vehicle: &Vehicle, _index: &FleetIndex) -> Option<String> {
    if vehicle.is_non_active() {
        if let Some(driver_id) = &vehicle.assigned_driver_id {
            return Some(format!(
                "车辆{}状态为{}却仍指派司机{}",
                vehicle.vehicle_id, vehicle.status, driver_id
            ));
        }
    }
    None
}

/// 规则3: 运营中但指派已失去活动依据
///
/// 注: 待授权(PENDING_AUTHORIZATION)工单不算依据, 尚未授权的维修不是真实活动
fn match_active_stale_assignment(vehicle: &Vehicle, index: &FleetIndex) -> Option<String> {
    if vehicle.status == VehicleStatus::Active
        && vehicle.assigned_driver_id.is_some()
        && !index.has_live_activity(&vehicle.vehicle_id)
    {
        Some(format!(
            "车辆{}状态为ACTIVE且指派司机{}, 但不存在任何活动排班或活动维修工单作为依据",
            vehicle.vehicle_id,
            vehicle.assigned_driver_id.as_deref().unwrap_or("?")
        ))
    } else {
        None
    }
}

/// 检测规则表 (顺序即策略): 自上而下求值, 首个命中即停
///
/// 1. ACTIVE_WITHOUT_DRIVER
/// 2. NON_ACTIVE_WITH_DRIVER
/// 3. ACTIVE_STALE_ASSIGNMENT
pub const DETECTION_RULES: &[DetectionRule] = &[
    DetectionRule {
        kind: InconsistencyKind::ActiveWithoutDriver,
        matcher: match_active_without_driver,
    },
    DetectionRule {
        kind: InconsistencyKind::NonActiveWithDriver,
        matcher: match_non_active_with_driver,
    },
    DetectionRule {
        kind: InconsistencyKind::ActiveStaleAssignment,
        matcher: match_active_stale_assignment,
    },
];

// ==========================================
// InconsistencyDetector - 不一致检测器
// ==========================================
pub struct InconsistencyDetector;

impl InconsistencyDetector {
    /// 创建新的检测器实例
    pub fn new() -> Self {
        Self
    }

    /// 扫描车队并归类不一致
    ///
    /// # 参数
    /// - vehicles: 全量车辆
    /// - index: 本周期联结索引 (基于 ACTIVE/SCHEDULED 的排班与工单)
    ///
    /// # 返回
    /// 不一致记录列表; 车队一致时为空。任何车辆都不会命中多于一条规则。
    pub fn detect(&self, vehicles: &[Vehicle], index: &FleetIndex) -> Vec<Inconsistency> {
        let mut findings = Vec::new();

        for vehicle in vehicles {
            for rule in DETECTION_RULES {
                if let Some(detail) = (rule.matcher)(vehicle, index) {
                    debug!(
                        vehicle_id = %vehicle.vehicle_id,
                        kind = %rule.kind,
                        "检出车辆状态不一致"
                    );
                    findings.push(Inconsistency {
                        vehicle_id: vehicle.vehicle_id.clone(),
                        vehicle_status: vehicle.status,
                        assigned_driver_id: vehicle.assigned_driver_id.clone(),
                        kind: rule.kind,
                        detail,
                    });
                    break; // 首个命中即停: 每辆车至多一条
                }
            }
        }

        info!(
            vehicles_scanned = vehicles.len(),
            inconsistencies = findings.len(),
            "不一致检测完成"
        );

        findings
    }
}

impl Default for InconsistencyDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn vehicle(id: &str, status: VehicleStatus, driver: Option<&str>) -> Vehicle {
        Vehicle {
            vehicle_id: id.to_string(),
            plate_no: format!("沪A{}", id),
            model: None,
            status,
            assigned_driver_id: driver.map(|s| s.to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn schedule(id: &str, vehicle_id: &str, driver_id: &str, status: ScheduleStatus) -> VehicleSchedule {
        VehicleSchedule {
            schedule_id: id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            driver_id: driver_id.to_string(),
            start_date: d(2024, 1, 10),
            end_date: d(2024, 1, 12),
            status,
            remark: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn order(id: &str, vehicle_id: &str, status: MaintenanceStatus) -> MaintenanceOrder {
        MaintenanceOrder {
            order_id: id.to_string(),
            vehicle_id: vehicle_id.to_string(),
            description: None,
            status,
            start_date: d(2024, 1, 15),
            estimated_completion_date: d(2024, 1, 18),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistent_fleet_yields_nothing() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![
            vehicle("V1", VehicleStatus::Idle, None),
            vehicle("V2", VehicleStatus::Maintenance, None),
        ];
        let index = FleetIndex::build(&[], &[]);

        assert!(detector.detect(&vehicles, &index).is_empty());
    }

    #[test]
    fn test_active_with_live_schedule_is_consistent() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, Some("D1"))];
        let schedules = vec![schedule("S1", "V1", "D1", ScheduleStatus::Active)];
        let index = FleetIndex::build(&schedules, &[]);

        assert!(detector.detect(&vehicles, &index).is_empty());
    }

    #[test]
    fn test_active_without_driver() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, None)];
        let index = FleetIndex::build(&[], &[]);

        let findings = detector.detect(&vehicles, &index);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InconsistencyKind::ActiveWithoutDriver);
    }

    #[test]
    fn test_non_active_with_driver() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![
            vehicle("V1", VehicleStatus::Idle, Some("D1")),
            vehicle("V2", VehicleStatus::Maintenance, Some("D2")),
        ];
        let index = FleetIndex::build(&[], &[]);

        let findings = detector.detect(&vehicles, &index);
        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .all(|f| f.kind == InconsistencyKind::NonActiveWithDriver));
    }

    #[test]
    fn test_active_stale_assignment() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, Some("D1"))];
        // 只有 SCHEDULED 排班, 无任何 ACTIVE 活动 → 指派失去依据
        let schedules = vec![schedule("S1", "V1", "D2", ScheduleStatus::Scheduled)];
        let index = FleetIndex::build(&schedules, &[]);

        let findings = detector.detect(&vehicles, &index);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InconsistencyKind::ActiveStaleAssignment);
    }

    #[test]
    fn test_active_maintenance_order_justifies_active_vehicle() {
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, Some("D1"))];
        let orders = vec![order("M1", "V1", MaintenanceStatus::Active)];
        let index = FleetIndex::build(&[], &orders);

        assert!(detector.detect(&vehicles, &index).is_empty());
    }

    #[test]
    fn test_pending_authorization_is_not_justification() {
        // 待授权工单不构成活动依据 → 仍判定为失去依据
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, Some("D1"))];
        let orders = vec![order("M1", "V1", MaintenanceStatus::PendingAuthorization)];
        let index = FleetIndex::build(&[], &orders);

        let findings = detector.detect(&vehicles, &index);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InconsistencyKind::ActiveStaleAssignment);
    }

    #[test]
    fn test_rule_order_first_match_wins() {
        // ACTIVE 且无司机且无活动依据: 规则1先于规则3命中
        let detector = InconsistencyDetector::new();
        let vehicles = vec![vehicle("V1", VehicleStatus::Active, None)];
        let index = FleetIndex::build(&[], &[]);

        let findings = detector.detect(&vehicles, &index);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InconsistencyKind::ActiveWithoutDriver);
    }

    #[test]
    fn test_index_keeps_earliest_scheduled_entry() {
        let mut s1 = schedule("S1", "V1", "D1", ScheduleStatus::Scheduled);
        s1.start_date = d(2024, 2, 1);
        let mut s2 = schedule("S2", "V1", "D2", ScheduleStatus::Scheduled);
        s2.start_date = d(2024, 1, 20);

        let index = FleetIndex::build(&[s1, s2], &[]);
        let kept = index.scheduled_schedule("V1").unwrap();
        assert_eq!(kept.schedule_id, "S2"); // start_date 更早者胜出
    }
}
