mod attendance_repository;
mod enrollment_repository;
mod participant_repository;
mod session_repository;
mod training_day_repository;
mod training_repository;
mod user_repository;

pub use attendance_repository::{AttendanceRepository, AttendanceTally};
pub use enrollment_repository::EnrollmentRepository;
pub use participant_repository::ParticipantRepository;
pub use session_repository::SessionRepository;
pub use training_day_repository::TrainingDayRepository;
pub use training_repository::{TrainingCounts, TrainingRepository};
pub use user_repository::{UserChanges, UserRecord, UserRepository};
