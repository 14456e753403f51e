use crossbeam_channel::Sender;

use crate::config::AnnouncementConfig;

/// Something that can speak or display a short instruction
pub trait AnnouncementSink: Send {
    fn announce(&mut self, text: &str);
}

/// Writes announcements to the log at info level
#[derive(Debug, Default)]
pub struct LogSink;

impl AnnouncementSink for LogSink {
    fn announce(&mut self, text: &str) {
        log::info!("{}", text);
    }
}

/// Forwards announcements to a channel, e.g. a speech thread
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl AnnouncementSink for ChannelSink {
    fn announce(&mut self, text: &str) {
        if self.tx.send(text.to_string()).is_err() {
            log::debug!("Announcement receiver gone, dropping: {}", text);
        }
    }
}

/// A sink plus an on/off switch
pub struct Announcer {
    enabled: bool,
    sink: Box<dyn AnnouncementSink>,
}

impl Announcer {
    pub fn new(sink: Box<dyn AnnouncementSink>, enabled: bool) -> Self {
        Self { enabled, sink }
    }

    pub fn from_config(config: &AnnouncementConfig) -> Self {
        Self::new(Box::new(LogSink), config.enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn announce(&mut self, text: &str) {
        if self.enabled {
            self.sink.announce(text);
        }
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::from_config(&AnnouncementConfig::default())
    }
}

impl std::fmt::Debug for Announcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Announcer")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

pub fn starting_message(destination: &str) -> String {
    format!("Starting navigation to {destination}. Follow the arrows.")
}

pub fn approaching_message(waypoint: &str) -> String {
    format!("Approaching {waypoint}")
}

pub fn arrived_message(destination: &str) -> String {
    format!("You have arrived at {destination}")
}
