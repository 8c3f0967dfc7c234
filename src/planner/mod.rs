pub mod copy_planner;
pub mod exclusion;
pub mod item_resolver;

pub use copy_planner::{CopyPlan, CopyPlanner, CopyTask, PlanWarning};
pub use exclusion::ExclusionFilter;
pub use item_resolver::{BackupMode, ItemManifest, ItemResolver};
