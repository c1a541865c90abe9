mod daily_attendance;
pub mod formats;
mod pagination;
mod participant;
mod session;
mod training;
mod training_day;
mod training_participant;
mod user;

pub use daily_attendance::*;
pub use pagination::*;
pub use participant::*;
pub use session::*;
pub use training::*;
pub use training_day::*;
pub use training_participant::*;
pub use user::*;
