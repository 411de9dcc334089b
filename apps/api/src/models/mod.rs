pub mod account;
pub mod portfolio;
