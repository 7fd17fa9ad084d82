pub mod commands;
pub mod doctor;
pub mod error;
pub mod fs_utils;
pub mod logging;
pub mod paths;
pub mod registry;
pub mod switch;
pub mod ui;

pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;
