pub mod list;
pub mod replay;
pub mod report;
pub mod validate;
