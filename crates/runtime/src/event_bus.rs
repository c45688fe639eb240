/// Severity of a [`Notice`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational trace; the UI may ignore it.
    Info,
    /// Must be surfaced to the user as a blocking alert.
    Alert,
}

/// A user-facing or trace event raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Emission order within the bus.
    pub seq: u64,
    pub level: NoticeLevel,
    pub kind: &'static str,
    pub message: String,
}

/// Ordered outbox of notices, drained by the embedding UI.
#[derive(Debug, Default)]
pub struct NoticeBus {
    next_seq: u64,
    notices: Vec<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        self.push(NoticeLevel::Info, kind, message.into());
    }

    pub fn alert(&mut self, kind: &'static str, message: impl Into<String>) {
        self.push(NoticeLevel::Alert, kind, message.into());
    }

    fn push(&mut self, level: NoticeLevel, kind: &'static str, message: String) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.notices.push(Notice {
            seq,
            level,
            kind,
            message,
        });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn alerts(&self) -> impl Iterator<Item = &Notice> + '_ {
        self.notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Alert)
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoticeBus, NoticeLevel};

    #[test]
    fn records_notices_in_order() {
        let mut bus = NoticeBus::new();
        bus.emit("viewport", "fetched 3 parcels");
        bus.alert("click", "address already in project");
        assert_eq!(bus.notices().len(), 2);
        assert_eq!(bus.notices()[0].seq, 0);
        assert_eq!(bus.notices()[1].seq, 1);
        assert_eq!(bus.notices()[1].level, NoticeLevel::Alert);
        assert_eq!(bus.alerts().count(), 1);
    }

    #[test]
    fn drain_clears_notices_but_keeps_sequence() {
        let mut bus = NoticeBus::new();
        bus.emit("k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.notices().is_empty());

        bus.emit("k", "again");
        assert_eq!(bus.notices()[0].seq, 1);
    }
}
