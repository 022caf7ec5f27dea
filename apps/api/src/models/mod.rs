pub mod job;
pub mod match_record;
pub mod resume;
pub mod user;
