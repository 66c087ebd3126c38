pub mod scheduled_executor;
pub mod string_ext;

pub use scheduled_executor::{ScheduledExecutor, ScheduledTask};
pub use string_ext::StringExt;
