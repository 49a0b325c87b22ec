pub mod categories;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod posts;
pub mod publish;
