use std::collections::VecDeque;

/// How long a notice stays on screen.
pub const NOTICE_TIMEOUT_MS: u32 = 4_000;
const MAX_VISIBLE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl NoticeLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Info => "notice--info",
            NoticeLevel::Success => "notice--success",
            NoticeLevel::Error => "notice--error",
        }
    }
}

/// Transient, user-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    next_id: u64,
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        if self.notices.len() == MAX_VISIBLE {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            id: self.next_id,
            level,
            message: message.into(),
        });
        self.next_id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notices.retain(|notice| notice.id != id);
    }

    pub fn visible(&self) -> Vec<Notice> {
        self.notices.iter().cloned().collect()
    }
}
