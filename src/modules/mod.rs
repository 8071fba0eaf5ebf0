pub mod catalog;
pub mod jobs;
pub mod rankings;
pub mod ratings;
