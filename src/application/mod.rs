//! Application layer: the stage protocol participants, the service entry
//! point that drives them, and the host-side queries over flow configurations.

pub mod configurations;
pub mod dispatcher;
pub mod eligibility;
pub mod listener;
pub mod stage;
