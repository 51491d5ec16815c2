pub mod task;
pub mod user;

pub use task::{Deadline, StatusUpdate, Task, TaskEdit, TaskQuery};
pub use user::{NewUser, User};
