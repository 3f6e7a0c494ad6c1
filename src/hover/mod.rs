pub mod picker;
pub mod tooltip;
