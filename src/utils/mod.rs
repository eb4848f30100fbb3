pub mod logging;
pub mod setting;
