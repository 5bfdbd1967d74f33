pub mod cli;
pub mod dispatch;
pub mod menu;
pub mod reporter;
