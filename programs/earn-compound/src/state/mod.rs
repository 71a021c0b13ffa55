pub mod global_config;
pub mod schedule;
pub mod staking_pool;
pub mod stake_account;

pub use global_config::*;
pub use schedule::*;
pub use staking_pool::*;
pub use stake_account::*;
