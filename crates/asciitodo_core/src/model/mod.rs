mod task;

pub use task::{Priority, Task, TaskId, priority_rank};
