pub mod config;
pub mod dispatch;
pub mod once;
pub mod run;
pub mod schema;
pub mod shared;
