//! CLI command implementations

pub mod checksum;
pub mod clear;
pub mod config;
pub mod list;
pub mod merge;
pub mod run;

pub use checksum::execute as checksum;
pub use clear::execute as clear;
pub use config::execute as config;
pub use list::execute as list;
pub use merge::execute as merge;
pub use run::execute as run;
