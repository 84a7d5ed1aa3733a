//! 影片分類元件
//!
//! 依檔名建立分類資料夾，並將影片移入對應的資料夾

mod category;
mod main;

pub use category::{
    CategorizeJob, FALLBACK_CATEGORY, FolderCategorizer, category_for, plan_categorization,
};
pub use main::VideoCategorizer;
