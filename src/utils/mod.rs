pub mod file_ops;
pub mod reporting;
pub mod validation;
