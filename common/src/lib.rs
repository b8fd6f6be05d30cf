//! Wire models shared between the EduStream HTTP handlers and their clients.
//!
//! - `model`: payloads returned by the API (quizzes, share links, submissions,
//!   analytics, dashboards).
//! - `requests`: JSON bodies accepted by the API.

pub mod model;
pub mod requests;
