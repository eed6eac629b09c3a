pub mod cli;
pub mod proto;
pub mod client;
pub mod problem;
