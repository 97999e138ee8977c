// ==========================================
// 车队管理系统 - 车队同步API
// ==========================================
// 职责: 向界面层暴露唯一的同步入口 sync(now)
// 说明: 界面层(列表/表单/分页)不在本库范围内, 只消费这里返回的快照
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::reconciliation::FleetSnapshot;
use crate::engine::orchestrator::FleetSyncOrchestrator;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// 时钟注入: 默认取 UTC 当日, 测试可替换
pub type NowFn = fn() -> NaiveDate;

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

// ==========================================
// FleetSyncApi - 车队同步API
// ==========================================
pub struct FleetSyncApi {
    orchestrator: Arc<FleetSyncOrchestrator>,
    now_fn: NowFn,
}

impl FleetSyncApi {
    /// 创建新的 FleetSyncApi 实例
    pub fn new(orchestrator: Arc<FleetSyncOrchestrator>) -> Self {
        Self {
            orchestrator,
            now_fn: utc_today,
        }
    }

    /// 创建带自定义时钟的实例 (测试用)
    pub fn with_clock(orchestrator: Arc<FleetSyncOrchestrator>, now_fn: NowFn) -> Self {
        Self {
            orchestrator,
            now_fn,
        }
    }

    /// 执行一个同步周期并返回一致快照
    ///
    /// # 参数
    /// - now: 当前日期 (日粒度)
    ///
    /// # 返回
    /// 四类实体的一致视图 + 对账/同步摘要 (摘要供日志与观测, 不应阻塞界面)
    pub async fn sync(&self, now: NaiveDate) -> ApiResult<FleetSnapshot> {
        Ok(self.orchestrator.sync(now).await?)
    }

    /// 以注入时钟的当前日期执行同步
    pub async fn sync_now(&self) -> ApiResult<FleetSnapshot> {
        self.sync((self.now_fn)()).await
    }
}
