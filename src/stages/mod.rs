pub mod stage0_collect;
pub mod stage1_reconcile;
pub mod stage2_clean;
pub mod stage3_hygiene;
pub mod stage4_normalize;
pub mod stage5_merge;
pub mod stage6_sort;
pub mod stage7_write;

pub use stage0_collect::*;
pub use stage1_reconcile::*;
pub use stage2_clean::*;
pub use stage3_hygiene::*;
pub use stage4_normalize::*;
pub use stage5_merge::*;
pub use stage6_sort::*;
pub use stage7_write::*;
