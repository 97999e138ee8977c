// ==========================================
// 状态边界测试
// ==========================================
// 测试范围:
// 1. 日期边界: 单日排班当天激活, 次日收尾
// 2. 状态单调性: 只前进, 永不回退
// 3. 待授权工单不被自动推进
// 4. 单条失败不阻断整批转换
// ==========================================


use fleet_management::domain::types::{MaintenanceStatus, ScheduleStatus, VehicleStatus};
use fleet_management::engine::TransitionApplier;
use test_helpers::*;

fn setup() -> (tempfile::NamedTempFile, TestRepos) {
    let (temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let conn = open_shared_connection(&db_path).expect("打开数据库失败");
    (temp_file, TestRepos::new(conn))
}

fn seed_base(repos: &TestRepos) {
    repos.driver_repo.insert(&make_driver("D1", "张伟")).unwrap();
    repos
        .vehicle_repo
        .insert(&make_vehicle("V1", VehicleStatus::Idle, None))
        .unwrap();
}

/// 场景: S2 SCHEDULED, 2024-01-10 ~ 2024-01-12, today=2024-01-11 → 转 ACTIVE
#[tokio::test]
async fn test_schedule_activates_inside_window() {
    let (_tmp, repos) = setup();
    seed_base(&repos);

    repos
        .schedule_repo
        .insert(&make_schedule(
            "S2",
            "V1",
            "D1",
            ScheduleStatus::Scheduled,
            date(2024, 1, 10),
            date(2024, 1, 12),
        ))
        .unwrap();

    let applier = TransitionApplier::new(repos.stores());
    let schedules = repos.schedule_repo.list_all().unwrap();
    let report = applier
        .apply_due_transitions(&schedules, &[], date(2024, 1, 11))
        .await;

    assert_eq!(report.schedule_ids_updated, vec!["S2".to_string()]);
    assert!(report.errors.is_empty());

    let after = repos.schedule_repo.list_all().unwrap();
    assert_eq!(after[0].status, ScheduleStatus::Active);
}

/// 日期边界: start == end == today 当天激活; 同一排班在 today+1 收尾
#[tokio::test]
async fn test_single_day_schedule_boundary() {
    let (_tmp, repos) = setup();
    seed_base(&repos);

    repos
        .schedule_repo
        .insert(&make_schedule(
            "S1",
            "V1",
            "D1",
            ScheduleStatus::Scheduled,
            date(2024, 1, 10),
            date(2024, 1, 10),
        ))
        .unwrap();

    let applier = TransitionApplier::new(repos.stores());

    // 当天: SCHEDULED → ACTIVE
    let schedules = repos.schedule_repo.list_all().unwrap();
    let report = applier
        .apply_due_transitions(&schedules, &[], date(2024, 1, 10))
        .await;
    assert_eq!(report.total_updated(), 1);
    assert_eq!(
        repos.schedule_repo.list_all().unwrap()[0].status,
        ScheduleStatus::Active
    );

    // 次日: ACTIVE → COMPLETED
    let schedules = repos.schedule_repo.list_all().unwrap();
    let report = applier
        .apply_due_transitions(&schedules, &[], date(2024, 1, 11))
        .await;
    assert_eq!(report.total_updated(), 1);
    assert_eq!(
        repos.schedule_repo.list_all().unwrap()[0].status,
        ScheduleStatus::Completed
    );
}

/// 单调性: COMPLETED 为终态; 窗口内的 ACTIVE 不产生任何转换
#[tokio::test]
async fn test_transitions_never_regress() {
    let (_tmp, repos) = setup();
    seed_base(&repos);

    repos
        .schedule_repo
        .insert(&make_schedule(
            "S1",
            "V1",
            "D1",
            ScheduleStatus::Completed,
            date(2024, 1, 10),
            date(2024, 1, 12),
        ))
        .unwrap();
    repos
        .schedule_repo
        .insert(&make_schedule(
            "S2",
            "V1",
            "D1",
            ScheduleStatus::Active,
            date(2024, 1, 10),
            date(2024, 1, 12),
        ))
        .unwrap();

    let applier = TransitionApplier::new(repos.stores());
    let schedules = repos.schedule_repo.list_all().unwrap();

    // 窗口内重放: 两条均不动
    let report = applier
        .apply_due_transitions(&schedules, &[], date(2024, 1, 11))
        .await;
    assert_eq!(report.total_updated(), 0);

    let after = repos.schedule_repo.list_all().unwrap();
    let s1 = after.iter().find(|s| s.schedule_id == "S1").unwrap();
    let s2 = after.iter().find(|s| s.schedule_id == "S2").unwrap();
    assert_eq!(s1.status, ScheduleStatus::Completed);
    assert_eq!(s2.status, ScheduleStatus::Active);
}

/// 维修工单: SCHEDULED → ACTIVE → COMPLETED; PENDING_AUTHORIZATION 永不自动推进
#[tokio::test]
async fn test_maintenance_transitions_and_pending_red_line() {
    let (_tmp, repos) = setup();
    seed_base(&repos);

    repos
        .maintenance_repo
        .insert(&make_order(
            "M1",
            "V1",
            MaintenanceStatus::Scheduled,
            date(2024, 2, 1),
            date(2024, 2, 5),
        ))
        .unwrap();
    repos
        .maintenance_repo
        .insert(&make_order(
            "M2",
            "V1",
            MaintenanceStatus::PendingAuthorization,
            date(2024, 2, 1),
            date(2024, 2, 5),
        ))
        .unwrap();

    let applier = TransitionApplier::new(repos.stores());

    // 窗口内: M1 激活, M2 纹丝不动
    let orders = repos.maintenance_repo.list_all().unwrap();
    let report = applier
        .apply_due_transitions(&[], &orders, date(2024, 2, 3))
        .await;
    assert_eq!(report.order_ids_updated, vec!["M1".to_string()]);

    // 预计完成日次日: M1 收尾, M2 仍然不动
    let orders = repos.maintenance_repo.list_all().unwrap();
    let report = applier
        .apply_due_transitions(&[], &orders, date(2024, 2, 6))
        .await;
    assert_eq!(report.order_ids_updated, vec!["M1".to_string()]);

    let after = repos.maintenance_repo.list_all().unwrap();
    let m1 = after.iter().find(|o| o.order_id == "M1").unwrap();
    let m2 = after.iter().find(|o| o.order_id == "M2").unwrap();
    assert_eq!(m1.status, MaintenanceStatus::Completed);
    assert_eq!(m2.status, MaintenanceStatus::PendingAuthorization);
}

/// 单条失败不阻断整批: 不存在的排班ID失败后, 其余排班照常推进
#[tokio::test]
async fn test_partial_failure_does_not_block_batch() {
    let (_tmp, repos) = setup();
    seed_base(&repos);

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

    // 构造一条数据库中不存在的排班快照 (模拟读写之间被他处删除)
    let phantom = make_schedule(
        "S_PHANTOM",
        "V1",
        "D1",
        ScheduleStatus::Scheduled,
        date(2024, 1, 10),
        date(2024, 1, 12),
    );
    let mut schedules = repos.schedule_repo.list_all().unwrap();
    schedules.insert(0, phantom);

    let applier = TransitionApplier::new(repos.stores());
    let report = applier
        .apply_due_transitions(&schedules, &[], date(2024, 1, 11))
        .await;

    // 幻影条目失败进入 errors, S1 仍被推进
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("S_PHANTOM"));
    assert_eq!(report.schedule_ids_updated, vec!["S1".to_string()]);
    assert_eq!(
        repos.schedule_repo.list_all().unwrap()[0].status,
        ScheduleStatus::Active
    );
}
