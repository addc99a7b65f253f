pub mod accounts;
pub mod auth;
pub mod favorites;
pub mod members;
pub mod projects;
pub mod requests;
pub mod teams;
pub mod users;
