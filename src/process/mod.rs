/*!
 * Process Module
 * Exit-code bookkeeping and wait support for process lifecycle syscalls
 */

pub mod pid_table;
pub mod status;

// Re-export for convenience
pub use pid_table::{PidResult, PidTable, PidTableConfig, Reparented};
pub use status::WaitStatus;
