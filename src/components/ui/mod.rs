pub mod button;
pub mod notice;
pub mod spinner;

// Re-export component symbols so callers can `use crate::components::ui::Button` etc.
pub use button::*;
pub use notice::*;
pub use spinner::*;
