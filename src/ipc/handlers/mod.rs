pub mod approvals;
pub mod backup;
pub mod core;
pub mod curriculum;
pub mod filters;
pub mod lessons;
pub mod objectives;
pub mod schedule;
pub mod selection;
pub mod setup;
pub mod terms;
pub mod themes;
