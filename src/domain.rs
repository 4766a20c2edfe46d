mod message_log;
mod push_notification;

pub use message_log::MessageLog;
pub use push_notification::*;
