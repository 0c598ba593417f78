pub mod cache;
pub mod explain;
pub mod handlers;
pub mod ranking;
pub mod scorer;
pub mod similarity;
