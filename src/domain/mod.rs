//! Domain model: amounts, baskets, flow configuration and the messages that
//! flow apps exchange with the host.

pub mod amounts;
pub mod basket;
pub mod card;
pub mod flow_config;
pub mod messages;
pub mod ports;
pub mod service_info;
pub mod stages;
