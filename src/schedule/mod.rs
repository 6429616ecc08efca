pub mod clock;
pub mod driver;
pub mod queue;
pub mod scheduler;
