pub mod chat;
pub mod enums;
pub mod health_log;
pub mod prediction;
pub mod profile;
pub mod task;

pub use chat::*;
pub use enums::*;
pub use health_log::*;
pub use prediction::*;
pub use profile::*;
pub use task::*;
