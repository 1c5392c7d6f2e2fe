//! Command implementations

pub mod check;
pub mod dispatch;
pub mod extract;
pub mod reset;
pub mod review;
pub mod status;
