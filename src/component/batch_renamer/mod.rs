//! 批次重新命名元件
//!
//! 將選取的影片依序改名為 `<前綴><序號><副檔名>`

mod main;
mod rename_plan;

pub use main::BatchRenamer;
pub use rename_plan::{
    FileRenamer, RenameJob, new_file_name, plan_renames, rename_conflicts, validate_prefix,
};
