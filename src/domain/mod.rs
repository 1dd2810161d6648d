// ==========================================
// 工厂生产看板 - 领域模型层
// ==========================================
// 职责: 定义分区、周期键、条目实体、全局快照、产品参考表
// 红线: 不含数据访问逻辑,不含指标计算逻辑
// ==========================================

pub mod entry;
pub mod product;
pub mod state;
pub mod types;

// 重导出核心类型
pub use entry::{
    new_entry_id, DowntimeEntry, MonthlyEntry, PartitionEntry, PlanRealEntry, ProductionEntry,
    ReportEntry,
};
pub use product::{ProductCatalog, ProductSpec};
pub use state::{DecodedEntry, EntryList, GlobalState, PartitionData};
pub use types::{Partition, PeriodKind};
