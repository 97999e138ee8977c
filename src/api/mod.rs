// ==========================================
// 车队管理系统 - API 层
// ==========================================
// 职责: 面向界面层的业务接口
// ==========================================

pub mod error;
pub mod fleet_api;

// 重导出
pub use error::{ApiError, ApiResult};
pub use fleet_api::FleetSyncApi;
