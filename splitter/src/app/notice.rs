use std::fmt;

use chrono::{DateTime, Local};
use provenance::tree::NodeId;

/// User facing message about something that happened in the background.
#[derive(Clone, Debug)]
pub struct Notice {
    pub time: DateTime<Local>,
    pub level: NoticeLevel,
    pub node: Option<NodeId>,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

impl Notice {
    pub fn new(level: NoticeLevel, node: Option<NodeId>, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            level,
            node,
            message: message.into(),
        }
    }

    pub fn warning(node: Option<NodeId>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, node, message)
    }

    pub fn info(node: Option<NodeId>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, node, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
        };

        write!(f, "[{}] {level}", self.time.format("%H:%M:%S"))?;
        if let Some(node) = self.node {
            write!(f, " {node}")?;
        }
        write!(f, ": {}", self.message)
    }
}
