pub mod category;
pub mod contact;
pub mod job;
pub mod news;
pub mod user;

pub use category::*;
pub use contact::*;
pub use job::*;
pub use news::*;
pub use user::*;
