pub mod banked;
pub mod competence;
pub mod cost_profile;
pub mod lifecycle;
pub mod project;
pub mod punch;
pub mod report_filter;
pub mod task;
pub mod timesheet;
pub mod user;
