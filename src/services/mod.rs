pub mod auth_service;
pub mod category_service;
pub mod contact_service;
pub mod job_service;
pub mod mailer;
pub mod news_service;
pub mod password_reset_service;
pub mod payment_service;
pub mod user_service;

pub use mailer::{LogMailer, Mailer};
