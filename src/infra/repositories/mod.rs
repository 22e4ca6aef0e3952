pub mod sqlite_event_repo;
pub mod sqlite_inscription_repo;
pub mod sqlite_payment_repo;
pub mod sqlite_user_repo;

pub mod postgres_event_repo;
pub mod postgres_inscription_repo;
pub mod postgres_payment_repo;
pub mod postgres_user_repo;
