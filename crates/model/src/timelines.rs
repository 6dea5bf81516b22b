//! The timelines chart shown under Monitoring for providers and instances

use chrono::{DateTime, Utc};
use tracing::debug;

use stratus_ui::{UiResult, UiSession};

const INTERVAL_SELECT: &str = "[data-testid=\"timeline-interval-select\"]";
const DATE_INPUT: &str = "[data-testid=\"timeline-date-input\"]";
const APPLY: &str = "[data-testid=\"timeline-apply\"]";
const EVENT_ROWS: &str = "[data-timeline-event]";

/// One plotted event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub kind: String,
    pub source: String,
    pub at: Option<DateTime<Utc>>,
}

/// Page object over whatever timelines screen is current. Obtain it after
/// navigating to a `Timelines` destination.
pub struct TimelinesView<'a> {
    session: &'a dyn UiSession,
}

impl<'a> TimelinesView<'a> {
    pub fn new(session: &'a dyn UiSession) -> Self {
        Self { session }
    }

    /// Point the chart at a date with the given interval (Days, Weeks, ...).
    pub fn select_time_position(&self, interval: &str, date: &str) -> UiResult<()> {
        self.session.select_option(INTERVAL_SELECT, interval)?;
        self.session.fill(DATE_INPUT, date)?;
        self.apply()
    }

    pub fn apply(&self) -> UiResult<()> {
        self.session.click(APPLY)
    }

    /// Every event row currently plotted. Rows are rendered as
    /// `kind|source|rfc3339-timestamp`; rows that fail to parse keep their
    /// text in `kind` with no timestamp.
    pub fn events(&self) -> UiResult<Vec<TimelineEvent>> {
        let rows = self.session.texts_of(EVENT_ROWS)?;
        debug!(count = rows.len(), "timeline rows");
        Ok(rows.iter().map(|row| parse_row(row)).collect())
    }

    /// How many plotted events came from `source`.
    pub fn count_for(&self, source: &str) -> UiResult<usize> {
        Ok(self
            .events()?
            .into_iter()
            .filter(|event| event.source == source)
            .count())
    }
}

fn parse_row(row: &str) -> TimelineEvent {
    let mut parts = row.splitn(3, '|');
    let kind = parts.next().unwrap_or_default().to_string();
    let source = parts.next().unwrap_or_default().to_string();
    let at = parts
        .next()
        .and_then(|stamp| DateTime::parse_from_rfc3339(stamp.trim()).ok())
        .map(|stamp| stamp.with_timezone(&Utc));
    TimelineEvent { kind, source, at }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_parse_into_events() {
        let event = parse_row("power|EC2|2026-08-01T12:30:00Z");
        assert_eq!(event.kind, "power");
        assert_eq!(event.source, "EC2");
        assert!(event.at.is_some());
    }

    #[test]
    fn malformed_rows_keep_their_text() {
        let event = parse_row("something odd");
        assert_eq!(event.kind, "something odd");
        assert_eq!(event.source, "");
        assert!(event.at.is_none());
    }
}
