pub mod install;
pub mod remove;
