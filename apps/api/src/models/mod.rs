pub mod jd;
pub mod profile;
pub mod telemetry;
pub mod user;
