mod scroll_list;
pub mod ui;

pub use scroll_list::ScrollList;
