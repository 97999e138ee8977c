// ==========================================
// 车队管理系统 - 同步编排器
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART D 同步主流程
// 用途: 应用启动与手动刷新的唯一入口, 串联 对账 → 拉取 → 转换 → 重拉取
// 红线: 对账是进程生命周期内一次性的启动动作, 手动刷新不重复对账;
//       同一进程内不允许两个同步周期交错写入 (重入以串行化方式合并);
//       对账失败只记录, 永不阻断数据服务 (可用性优先于完美一致性)
// ==========================================
// 已知限制: 多实例并发对同一数据库执行对账可能互相竞争。
// 修复逻辑幂等且收敛, 重复执行只浪费写入, 不会破坏数据;
// 生产加固可引入分布式锁或指定单一对账实例。
// ==========================================

use crate::domain::reconciliation::{FleetSnapshot, ReconciliationSummary};
use crate::domain::types::{MaintenanceStatus, ScheduleStatus};
use crate::engine::inconsistency_detector::{FleetIndex, InconsistencyDetector};
use crate::engine::reconciler::Reconciler;
use crate::engine::stores::FleetStores;
use crate::engine::transition_applier::TransitionApplier;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

// ==========================================
// SyncPhase - 同步阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Reconciling,         // 启动对账 (仅首个周期)
    Fetching,            // 全量拉取
    ApplyingTransitions, // 应用日期驱动转换 (仅后续周期)
    Refetching,          // 有转换发生时的二次拉取
    Ready,               // 快照就绪
    Error,               // 周期失败
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Reconciling => write!(f, "RECONCILING"),
            SyncPhase::Fetching => write!(f, "FETCHING"),
            SyncPhase::ApplyingTransitions => write!(f, "APPLYING_TRANSITIONS"),
            SyncPhase::Refetching => write!(f, "REFETCHING"),
            SyncPhase::Ready => write!(f, "READY"),
            SyncPhase::Error => write!(f, "ERROR"),
        }
    }
}

/// 编排器内部状态 (锁内访问)
///
/// reconciled_once 的生命周期: 进程启动置 false,
/// 首次对账尝试后(无论成败)置 true, 此后永不重置
struct SyncState {
    reconciled_once: bool,
}

// ==========================================
// FleetSyncOrchestrator - 同步编排器
// ==========================================
pub struct FleetSyncOrchestrator {
    stores: FleetStores,
    detector: InconsistencyDetector,
    reconciler: Reconciler,
    applier: TransitionApplier,

    /// 单次仓储调用的超时上限, 避免存储端失联拖死整个同步周期
    call_timeout: Duration,

    /// 重入护栏: 整个同步周期持有此锁, 并发的第二次刷新等待而非交错
    state: tokio::sync::Mutex<SyncState>,
}

impl FleetSyncOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - stores: 引擎仓储集合
    /// - call_timeout: 单次仓储调用超时
    pub fn new(stores: FleetStores, call_timeout: Duration) -> Self {
        Self {
            detector: InconsistencyDetector::new(),
            reconciler: Reconciler::new(stores.clone()),
            applier: TransitionApplier::new(stores.clone()),
            stores,
            call_timeout,
            state: tokio::sync::Mutex::new(SyncState {
                reconciled_once: false,
            }),
        }
    }

    /// 执行一个完整同步周期
    ///
    /// # 参数
    /// - today: 当前日期 (日粒度, 由调用方注入)
    ///
    /// # 流程
    /// 1. 首个周期: RECONCILING, 检测并修复车辆/排班/工单间的漂移
    /// 2. FETCHING, 全量拉取四类实体
    /// 3. 后续周期: APPLYING_TRANSITIONS, 应用到期的日期驱动转换
    /// 4. 有转换发生时: REFETCHING, 二次拉取, 下游永远看不到混合数据
    /// 5. READY, 返回一致快照
    ///
    /// # 失败语义
    /// - 拉取阶段的读失败: 终止本周期并返回错误, 持久化状态不受影响
    /// - 对账/转换阶段的单实体写失败: 记入摘要 errors, 不终止周期
    pub async fn sync(&self, today: NaiveDate) -> RepositoryResult<FleetSnapshot> {
        // 重入护栏: 周期全程持锁
        let mut state = self.state.lock().await;
        let started = Instant::now();
        let first_cycle = !state.reconciled_once;

        // ==========================================
        // 阶段1: RECONCILING (仅首个周期)
        // ==========================================
        let mut summary = if first_cycle {
            info!(phase = %SyncPhase::Reconciling, %today, "开始启动对账");
            let summary = self.reconcile_pass().await;
            // 无论成败, 对账尝试只发生一次
            state.reconciled_once = true;
            summary
        } else {
            ReconciliationSummary::default()
        };

        // ==========================================
        // 阶段2: FETCHING
        // ==========================================
        info!(phase = %SyncPhase::Fetching, "拉取车队全量数据");
        let fetched = match self.fetch_all().await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(phase = %SyncPhase::Error, error = %e, "数据拉取失败, 本周期终止");
                return Err(e);
            }
        };
        let (mut vehicles, mut drivers, mut schedules, mut orders) = fetched;

        // ==========================================
        // 阶段3: APPLYING_TRANSITIONS (仅后续周期)
        // ==========================================
        // 首个周期只反映"对账后、尚未推进"的状态, 避免单次流程内双重语义
        let mut transitions_applied = 0;
        if !first_cycle {
            info!(phase = %SyncPhase::ApplyingTransitions, %today, "应用日期驱动状态转换");
            let report = self
                .applier
                .apply_due_transitions(&schedules, &orders, today)
                .await;
            transitions_applied = report.total_updated();
            summary.errors.extend(report.errors);

            // ==========================================
            // 阶段4: REFETCHING (有转换发生时)
            // ==========================================
            if transitions_applied > 0 {
                info!(
                    phase = %SyncPhase::Refetching,
                    transitions = transitions_applied,
                    "转换已落库, 重新拉取以提供一致视图"
                );
                let refetched = match self.fetch_all().await {
                    Ok(refetched) => refetched,
                    Err(e) => {
                        error!(phase = %SyncPhase::Error, error = %e, "二次拉取失败, 本周期终止");
                        return Err(e);
                    }
                };
                (vehicles, drivers, schedules, orders) = refetched;
            }
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            phase = %SyncPhase::Ready,
            vehicles = vehicles.len(),
            drivers = drivers.len(),
            schedules = schedules.len(),
            maintenance_orders = orders.len(),
            transitions = transitions_applied,
            summary = %summary.summary_text(),
            "同步周期完成"
        );

        Ok(FleetSnapshot {
            vehicles,
            drivers,
            schedules,
            maintenance_orders: orders,
            reconciliation: summary,
            transitions_applied,
        })
    }

    /// 启动对账: 读取 → 检测 → 修复
    ///
    /// 对账的任何失败(含读失败)都折叠进摘要 errors,
    /// 调用方继续进入 FETCHING (服务数据优先于修复完成)
    async fn reconcile_pass(&self) -> ReconciliationSummary {
        let started = Instant::now();
        let mut summary = ReconciliationSummary::default();

        let schedule_filter = [ScheduleStatus::Active, ScheduleStatus::Scheduled];
        let order_filter = [MaintenanceStatus::Active, MaintenanceStatus::Scheduled];

        let vehicles = self
            .with_timeout("读取车辆", self.stores.vehicle_store.list_vehicles())
            .await;
        let schedules = self
            .with_timeout(
                "读取排班",
                self.stores.schedule_store.list_schedules(Some(&schedule_filter)),
            )
            .await;
        let orders = self
            .with_timeout(
                "读取维修工单",
                self.stores.maintenance_store.list_orders(Some(&order_filter)),
            )
            .await;

        let (vehicles, schedules, orders) = match (vehicles, schedules, orders) {
            (Ok(v), Ok(s), Ok(o)) => (v, s, o),
            (v, s, o) => {
                for err in [v.err(), s.err(), o.err()].into_iter().flatten() {
                    warn!(error = %err, "对账阶段读取失败, 本次跳过对账");
                    summary.errors.push(format!("对账读取失败: {}", err));
                }
                summary.elapsed_ms = started.elapsed().as_millis() as u64;
                return summary;
            }
        };

        let index = FleetIndex::build(&schedules, &orders);
        let findings = self.detector.detect(&vehicles, &index);
        summary.inconsistencies_found = findings.len();

        if findings.is_empty() {
            debug!("车队已一致, 无需修复");
        } else {
            let outcome = self.reconciler.reconcile(&findings, &index).await;
            summary.actions_performed = outcome.actions.len();
            summary.errors.extend(outcome.errors);
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(summary = %summary.summary_text(), "启动对账完成");
        summary
    }

    /// 全量拉取四类实体 (四路并发, 任一失败即整体失败)
    async fn fetch_all(
        &self,
    ) -> RepositoryResult<(
        Vec<crate::domain::Vehicle>,
        Vec<crate::domain::Driver>,
        Vec<crate::domain::VehicleSchedule>,
        Vec<crate::domain::MaintenanceOrder>,
    )> {
        futures::try_join!(
            self.with_timeout("读取车辆", self.stores.vehicle_store.list_vehicles()),
            self.with_timeout("读取司机", self.stores.driver_store.list_drivers()),
            self.with_timeout("读取排班", self.stores.schedule_store.list_schedules(None)),
            self.with_timeout(
                "读取维修工单",
                self.stores.maintenance_store.list_orders(None)
            ),
        )
    }

    /// 带超时的仓储调用: 存储端失联表现为显式错误而非无限挂起
    async fn with_timeout<T, F>(&self, what: &str, fut: F) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RepositoryError::Timeout(format!(
                "{}超过{}秒未返回",
                what,
                self.call_timeout.as_secs()
            ))),
        }
    }
}
