use std::{
    fmt::Write,
    sync::{Mutex, MutexGuard, PoisonError},
};

use super::PushNotification;

/// 进程内的推送消息记录
/// 读写共用一把互斥锁，锁内只做内存操作
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<PushNotification>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    // 锁中毒时仍然可以继续使用，内部只有`Vec`的追加和清空
    fn lock(&self) -> MutexGuard<'_, Vec<PushNotification>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, notification: PushNotification) {
        self.lock().push(notification);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<PushNotification> {
        self.lock().clone()
    }

    /// 按写入顺序，每条消息输出一行
    pub fn render(&self) -> String {
        let mut output = String::from("Recv'd Push Messages:\n");
        for notification in self.lock().iter() {
            let _ = writeln!(output, "Message: {notification}");
        }
        output
    }
}
