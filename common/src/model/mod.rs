pub mod analytics;
pub mod course;
pub mod dashboard;
pub mod material;
pub mod quiz;
pub mod share;
pub mod submission;
pub mod teacher;
