pub mod auth;
pub mod castings;
pub mod users;
