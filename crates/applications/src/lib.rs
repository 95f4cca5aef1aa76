//! `talentbridge-applications` — the application pipeline: one candidate,
//! one job, one status with a narrow transition rule.

pub mod application;

pub use application::{Application, ApplicationStatus};
