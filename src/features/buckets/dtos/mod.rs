mod bucket_dto;

pub use bucket_dto::*;
