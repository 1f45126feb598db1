//! IP address allocation and management module.
//!
//! This module holds the allocatable address range, the persisted
//! assignment ledger and the allocation algorithms that pick free
//! addresses from the range.

pub mod allocator;
pub mod ledger;
pub mod range;

// Re-export commonly used types
pub use allocator::{next_available, plan_batch, BatchPlan, PlannedAssignment};
pub use ledger::{AssignmentLedger, RepositoryKey};
pub use range::AddressRange;
