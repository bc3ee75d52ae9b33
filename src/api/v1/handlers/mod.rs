pub mod assignments;
pub mod auth;
pub mod classes;
pub mod feedbacks;
pub mod health;
pub mod instructor_requests;
pub mod payments;
pub mod stats;
pub mod users;
