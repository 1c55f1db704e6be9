pub mod api;
pub mod dashboard;
pub mod login;
pub mod upload;
