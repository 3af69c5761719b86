//! Notation view: pagination, selection, click mapping and styling

pub mod click;
pub mod controller;
pub mod style;

pub use click::ClickEvent;
pub use controller::ViewController;
pub use style::highlight_css;
