pub mod task_handler;

pub use task_handler::{__path_assign_task, assign_task};
