pub mod drive;
pub mod postgres;
pub mod s3;
pub mod sheets;
