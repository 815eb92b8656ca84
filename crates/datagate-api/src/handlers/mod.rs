pub mod data;
pub mod storage;
