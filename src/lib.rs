pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod month;
pub mod server;
pub mod summary;
mod utils;


pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
pub use month::MonthWindow;
