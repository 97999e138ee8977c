// ==========================================
// 仓储层集成测试
// ==========================================
// 测试范围:
// 1. 四类实体的插入/读取往返
// 2. 状态过滤查询
// 3. 按ID部分更新 (仅写变化列, 刷新 updated_at)
// 4. 配置管理器读取与默认值
// ==========================================


use fleet_management::config::{config_keys, ConfigManager};
use fleet_management::domain::types::{MaintenanceStatus, ScheduleStatus, VehicleStatus};
use fleet_management::engine::VehicleStatePatch;
use fleet_management::repository::RepositoryError;
use std::time::Duration;
use test_helpers::*;

fn setup() -> (tempfile::NamedTempFile, TestRepos) {
    let (temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let conn = open_shared_connection(&db_path).expect("打开数据库失败");
    (temp_file, TestRepos::new(conn))
}

#[test]
fn test_vehicle_roundtrip() {
    let (_tmp, repos) = setup();

    repos
        .driver_repo
        .insert(&make_driver("D1", "张伟"))
        .expect("插入司机失败");
    repos
        .vehicle_repo
        .insert(&make_vehicle("V1", VehicleStatus::Active, Some("D1")))
        .expect("插入车辆失败");

    let vehicles = repos.vehicle_repo.list_all().expect("读取车辆失败");
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].vehicle_id, "V1");
    assert_eq!(vehicles[0].status, VehicleStatus::Active);
    assert_eq!(vehicles[0].assigned_driver_id, Some("D1".to_string()));

    let found = repos
        .vehicle_repo
        .find_by_id("V1")
        .expect("查询失败")
        .expect("车辆不存在");
    assert_eq!(found.plate_no, vehicles[0].plate_no);

    assert!(repos.vehicle_repo.find_by_id("V404").expect("查询失败").is_none());
}

#[test]
fn test_vehicle_partial_update_only_touches_requested_columns() {
    let (_tmp, repos) = setup();

    repos.driver_repo.insert(&make_driver("D1", "张伟")).unwrap();
    let original = make_vehicle("V1", VehicleStatus::Active, Some("D1"));
    repos.vehicle_repo.insert(&original).unwrap();

    // 仅清除司机指派
    repos
        .vehicle_repo
        .update_state("V1", &VehicleStatePatch::driver(None))
        .expect("部分更新失败");

    let after = repos.vehicle_repo.find_by_id("V1").unwrap().unwrap();
    assert_eq!(after.assigned_driver_id, None);
    assert_eq!(after.status, VehicleStatus::Active); // 未请求的列不变
    assert_eq!(after.plate_no, original.plate_no);
    assert!(after.updated_at >= original.updated_at); // 审计时间戳被刷新

    // 同时更新状态与司机
    repos
        .vehicle_repo
        .update_state(
            "V1",
            &VehicleStatePatch::status_and_driver(VehicleStatus::Maintenance, None),
        )
        .expect("部分更新失败");
    let after = repos.vehicle_repo.find_by_id("V1").unwrap().unwrap();
    assert_eq!(after.status, VehicleStatus::Maintenance);
}

#[test]
fn test_vehicle_update_missing_row_returns_not_found() {
    let (_tmp, repos) = setup();

    let result = repos
        .vehicle_repo
        .update_state("V404", &VehicleStatePatch::status(VehicleStatus::Idle));

    match result {
        Err(RepositoryError::NotFound { entity, id }) => {
            assert_eq!(entity, "Vehicle");
            assert_eq!(id, "V404");
        }
        other => panic!("期望 NotFound, 实际: {:?}", other.err()),
    }
}

#[test]
fn test_schedule_status_filter() {
    let (_tmp, repos) = setup();

    repos.driver_repo.insert(&make_driver("D1", "张伟")).unwrap();
    repos
        .vehicle_repo
        .insert(&make_vehicle("V1", VehicleStatus::Idle, None))
        .unwrap();

    for (id, status) in [
        ("S1", ScheduleStatus::Scheduled),
        ("S2", ScheduleStatus::Active),
        ("S3", ScheduleStatus::Completed),
    ] {
        repos
            .schedule_repo
            .insert(&make_schedule(
                id,
                "V1",
                "D1",
                status,
                date(2024, 1, 10),
                date(2024, 1, 12),
            ))
            .expect("插入排班失败");
    }

    let all = repos.schedule_repo.list_all().unwrap();
    assert_eq!(all.len(), 3);

    let live = repos
        .schedule_repo
        .list_by_statuses(&[ScheduleStatus::Active, ScheduleStatus::Scheduled])
        .unwrap();
    assert_eq!(live.len(), 2);
    assert!(live.iter().all(|s| s.status != ScheduleStatus::Completed));

    // 空过滤集合 → 空结果
    assert!(repos.schedule_repo.list_by_statuses(&[]).unwrap().is_empty());
}

#[test]
fn test_schedule_update_status() {
    let (_tmp, repos) = setup();

    repos.driver_repo.insert(&make_driver("D1", "张伟")).unwrap();
    repos
        .vehicle_repo
        .insert(&make_vehicle("V1", VehicleStatus::Idle, None))
        .unwrap();
    repos
        .schedule_repo
        .insert(&make_schedule(
            "S1",
            "V1",
            "D1",
            ScheduleStatus::Scheduled,
            date(2024, 1, 10),
            date(2024, 1, 12),
        ))
        .unwrap();

    repos
        .schedule_repo
        .update_status("S1", ScheduleStatus::Active)
        .expect("状态更新失败");

    let schedules = repos.schedule_repo.list_all().unwrap();
    assert_eq!(schedules[0].status, ScheduleStatus::Active);
    assert_eq!(schedules[0].start_date, date(2024, 1, 10)); // 日期列不受影响
}

#[test]
fn test_maintenance_order_roundtrip_and_filter() {
    let (_tmp, repos) = setup();

    repos
        .vehicle_repo
        .insert(&make_vehicle("V1", VehicleStatus::Idle, None))
        .unwrap();

    for (id, status) in [
        ("M1", MaintenanceStatus::PendingAuthorization),
        ("M2", MaintenanceStatus::Scheduled),
        ("M3", MaintenanceStatus::Active),
        ("M4", MaintenanceStatus::Completed),
    ] {
        repos
            .maintenance_repo
            .insert(&make_order(id, "V1", status, date(2024, 2, 1), date(2024, 2, 5)))
            .expect("插入工单失败");
    }

    let live = repos
        .maintenance_repo
        .list_by_statuses(&[MaintenanceStatus::Active, MaintenanceStatus::Scheduled])
        .unwrap();
    assert_eq!(live.len(), 2);

    repos
        .maintenance_repo
        .update_status("M3", MaintenanceStatus::Completed)
        .expect("状态更新失败");
    let all = repos.maintenance_repo.list_all().unwrap();
    let m3 = all.iter().find(|o| o.order_id == "M3").unwrap();
    assert_eq!(m3.status, MaintenanceStatus::Completed);
}

#[test]
fn test_config_manager_timeout_default_and_override() {
    let (_tmp, db_path) = create_test_db().expect("创建测试数据库失败");
    let conn = open_shared_connection(&db_path).unwrap();
    let config = ConfigManager::from_connection(conn);

    // 缺省: 回落默认值
    let timeout = config.get_repository_timeout().expect("读取配置失败");
    assert_eq!(timeout, Duration::from_secs(10));

    // 覆写
    config
        .set_config_value(config_keys::REPOSITORY_TIMEOUT_SECS, "3")
        .expect("写入配置失败");
    let timeout = config.get_repository_timeout().unwrap();
    assert_eq!(timeout, Duration::from_secs(3));

    // 非法值: 回落默认值
    config
        .set_config_value(config_keys::REPOSITORY_TIMEOUT_SECS, "不是数字")
        .unwrap();
    let timeout = config.get_repository_timeout().unwrap();
    assert_eq!(timeout, Duration::from_secs(10));
}
