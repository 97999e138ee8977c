// ==========================================
// 车队管理系统 - 引擎层仓储抽象
// ==========================================
// 职责: 定义引擎消费的数据访问 trait，实现依赖倒置
// 说明: Engine 层定义 trait，Repository 层实现适配器
// 红线: 引擎对关系库的全部认知仅限 "全量读取 + 按ID部分更新"
// ==========================================

use crate::domain::maintenance::MaintenanceOrder;
use crate::domain::schedule::VehicleSchedule;
use crate::domain::types::{MaintenanceStatus, ScheduleStatus, VehicleStatus};
use crate::domain::vehicle::{Driver, Vehicle};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// VehicleStatePatch - 车辆部分更新
// ==========================================

/// 车辆状态的部分更新
///
/// 外层 None 表示该列不更新; assigned_driver_id 的内层 None 表示写入 NULL(清除指派)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleStatePatch {
    pub status: Option<VehicleStatus>,
    pub assigned_driver_id: Option<Option<String>>,
}

impl VehicleStatePatch {
    /// 仅更新状态
    pub fn status(status: VehicleStatus) -> Self {
        Self {
            status: Some(status),
            assigned_driver_id: None,
        }
    }

    /// 仅更新司机指派
    pub fn driver(driver_id: Option<String>) -> Self {
        Self {
            status: None,
            assigned_driver_id: Some(driver_id),
        }
    }

    /// 同时更新状态与司机指派
    pub fn status_and_driver(status: VehicleStatus, driver_id: Option<String>) -> Self {
        Self {
            status: Some(status),
            assigned_driver_id: Some(driver_id),
        }
    }

    /// 判断是否为空更新 (空更新不应发起持久化调用)
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_driver_id.is_none()
    }
}

// ==========================================
// 数据访问 Trait
// ==========================================

/// 车辆数据访问
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// 读取全部车辆
    async fn list_vehicles(&self) -> RepositoryResult<Vec<Vehicle>>;

    /// 按ID部分更新车辆 (仅写入 patch 中出现的列, 单行原子)
    async fn update_vehicle(
        &self,
        vehicle_id: &str,
        patch: VehicleStatePatch,
    ) -> RepositoryResult<()>;
}

/// 司机数据访问 (引擎只读)
#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn list_drivers(&self) -> RepositoryResult<Vec<Driver>>;
}

/// 排班数据访问
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// 读取排班, statuses 为 None 时返回全部
    async fn list_schedules(
        &self,
        statuses: Option<&[ScheduleStatus]>,
    ) -> RepositoryResult<Vec<VehicleSchedule>>;

    /// 按ID更新排班状态 (单行原子)
    async fn update_schedule_status(
        &self,
        schedule_id: &str,
        status: ScheduleStatus,
    ) -> RepositoryResult<()>;
}

/// 维修工单数据访问
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// 读取维修工单, statuses 为 None 时返回全部
    async fn list_orders(
        &self,
        statuses: Option<&[MaintenanceStatus]>,
    ) -> RepositoryResult<Vec<MaintenanceOrder>>;

    /// 按ID更新工单状态 (单行原子)
    async fn update_order_status(
        &self,
        order_id: &str,
        status: MaintenanceStatus,
    ) -> RepositoryResult<()>;
}

// ==========================================
// FleetStores - 引擎仓储集合
// ==========================================

/// 聚合引擎所需的全部数据访问入口，简化依赖注入
///
/// # 设计理念
/// - 将 4 个 store 参数合并为 1 个结构体参数
/// - 便于单元测试时 mock 整个数据访问层
#[derive(Clone)]
pub struct FleetStores {
    pub vehicle_store: Arc<dyn VehicleStore>,
    pub driver_store: Arc<dyn DriverStore>,
    pub schedule_store: Arc<dyn ScheduleStore>,
    pub maintenance_store: Arc<dyn MaintenanceStore>,
}

impl FleetStores {
    /// 创建新的仓储集合
    pub fn new(
        vehicle_store: Arc<dyn VehicleStore>,
        driver_store: Arc<dyn DriverStore>,
        schedule_store: Arc<dyn ScheduleStore>,
        maintenance_store: Arc<dyn MaintenanceStore>,
    ) -> Self {
        Self {
            vehicle_store,
            driver_store,
            schedule_store,
            maintenance_store,
        }
    }
}
