pub mod controls;
pub mod datatable;
pub mod debug;
pub mod option_picker;
pub mod popup;
pub mod text_input;
