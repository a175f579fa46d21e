pub mod constants;
pub mod download;
pub mod test_helpers;
pub mod types;
pub mod validation;
