//! Record parser: one raw record in, zero or more typed events out.
//!
//! Unparseable or irrelevant records never halt the stream; a malformed
//! payload is a per-record concern, logged and skipped. Events come out
//! in source order, and the parser holds no state across records: where
//! start/end correlation is needed the match id is present in every
//! record of the match.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::log::record::RawRecord;
use crate::log::{
    CardCount, CollectionUpdate, DeckSubmission, DraftPick, EventKind, LogEvent, MatchEnd,
    MatchStart,
};
use crate::types::Timestamp;

// Channel names as they appear in record headers.
const CHANNEL_MATCH_CREATED: &str = "Event_MatchCreated";
const CHANNEL_MATCH_COMPLETED: &str = "Event_MatchCompleted";
const CHANNEL_SET_DECK: &str = "Event_SetDeck";
const CHANNEL_DRAFT_PICK: &str = "Draft.MakePick";
const CHANNEL_COLLECTION: &str = "PlayerInventory.GetPlayerCardsV3";
const CHANNEL_GRE_BUNDLE: &str = "GreToClientEvent";

// Message types inside a GRE bundle.
const GRE_MATCH_CREATED: &str = "GREMessageType_MatchCreated";
const GRE_MATCH_COMPLETED: &str = "GREMessageType_MatchCompleted";

/// Why a relevant record could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseFailure {
    #[error("record has no JSON payload")]
    MissingPayload,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected payload shape: expected {0}")]
    UnexpectedShape(&'static str),
}

/// Stateless record parser. Reentrant; one instance serves the whole
/// pipeline.
pub struct LogParser {
    channel_re: Regex,
    us_timestamp_re: Regex,
    iso_timestamp_re: Regex,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            // ==> ChannelName  /  <== ChannelName(123)
            channel_re: Regex::new(r"(?:==>|<==)\s*([A-Za-z_][A-Za-z0-9_.]*)")
                .expect("channel pattern is valid"),
            // 7/7/2026 10:23:01 AM
            us_timestamp_re: Regex::new(
                r"(\d{1,2})/(\d{1,2})/(\d{4}) (\d{1,2}):(\d{2}):(\d{2})(?: ([AP]M))?",
            )
            .expect("timestamp pattern is valid"),
            // 2026-07-07 10:23:01
            iso_timestamp_re: Regex::new(r"(\d{4})-(\d{2})-(\d{2})[T ](\d{2}):(\d{2}):(\d{2})")
                .expect("timestamp pattern is valid"),
        }
    }

    /// Parse one record. Irrelevant and malformed records both yield an
    /// empty list; malformed ones are logged on the way out.
    pub fn parse(&self, record: &RawRecord) -> Vec<LogEvent> {
        match self.parse_record(record) {
            Ok(events) => events,
            Err(error) => {
                tracing::warn!(offset = record.offset, %error, "Skipping malformed record");
                Vec::new()
            }
        }
    }

    /// Like [`parse`](Self::parse), but reports relevant-but-malformed
    /// records as errors so the pipeline can count them. Records on
    /// unrecognized channels are `Ok` with no events.
    pub fn parse_record(&self, record: &RawRecord) -> Result<Vec<LogEvent>, ParseFailure> {
        let header = record.text.lines().next().unwrap_or_default();
        let Some(channel) = self.channel(header) else {
            return Ok(Vec::new());
        };
        let timestamp = self.parse_timestamp(header).unwrap_or_else(Utc::now);
        let event = |kind| LogEvent::new(timestamp, record.offset, kind);

        match channel {
            CHANNEL_MATCH_CREATED => {
                let payload: MatchStart = serde_json::from_value(self.payload(record)?)?;
                Ok(vec![event(EventKind::MatchStart(payload))])
            }
            CHANNEL_MATCH_COMPLETED => {
                let payload: MatchEnd = serde_json::from_value(self.payload(record)?)?;
                Ok(vec![event(EventKind::MatchEnd(payload))])
            }
            CHANNEL_SET_DECK => {
                let payload: DeckSubmission = serde_json::from_value(self.payload(record)?)?;
                Ok(vec![event(EventKind::DeckSubmission(payload))])
            }
            CHANNEL_DRAFT_PICK => {
                let payload: DraftPick = serde_json::from_value(self.payload(record)?)?;
                Ok(vec![event(EventKind::DraftPick(payload))])
            }
            CHANNEL_COLLECTION => {
                let payload = self.collection(self.payload(record)?)?;
                Ok(vec![event(EventKind::CollectionUpdate(payload))])
            }
            CHANNEL_GRE_BUNDLE => {
                let bundle: GreBundle = serde_json::from_value(self.payload(record)?)?;
                Ok(self.parse_bundle(bundle, &event))
            }
            _ => Ok(Vec::new()),
        }
    }

    fn channel(&self, header: &str) -> Option<&'static str> {
        let name = self.channel_re.captures(header)?.get(1)?.as_str();
        [
            CHANNEL_MATCH_CREATED,
            CHANNEL_MATCH_COMPLETED,
            CHANNEL_SET_DECK,
            CHANNEL_DRAFT_PICK,
            CHANNEL_COLLECTION,
            CHANNEL_GRE_BUNDLE,
        ]
        .into_iter()
        .find(|known| *known == name)
    }

    /// The record's JSON payload: first `{` through the last `}`.
    fn payload(&self, record: &RawRecord) -> Result<Value, ParseFailure> {
        let text = &record.text;
        let start = text.find('{').ok_or(ParseFailure::MissingPayload)?;
        let end = text.rfind('}').ok_or(ParseFailure::MissingPayload)?;
        if end < start {
            return Err(ParseFailure::MissingPayload);
        }
        Ok(serde_json::from_str(&text[start..=end])?)
    }

    /// Collection payloads are one flat object mapping arena id to count.
    fn collection(&self, payload: Value) -> Result<CollectionUpdate, ParseFailure> {
        let object = payload
            .as_object()
            .ok_or(ParseFailure::UnexpectedShape("an object of id -> count"))?;
        let mut counts = Vec::with_capacity(object.len());
        for (key, value) in object {
            let (Ok(card_id), Some(count)) = (key.parse::<i64>(), value.as_u64()) else {
                tracing::debug!(key = %key, "Ignoring non-count collection entry");
                continue;
            };
            counts.push(CardCount {
                card_id,
                count: count as u32,
            });
        }
        Ok(CollectionUpdate { counts })
    }

    /// A GRE bundle carries several game-state messages in one record;
    /// each recognized message becomes its own event, in bundle order.
    /// The surrounding match id applies to every message.
    fn parse_bundle(&self, bundle: GreBundle, event: &dyn Fn(EventKind) -> LogEvent) -> Vec<LogEvent> {
        let mut events = Vec::new();
        for message in &bundle.gre_to_client_messages {
            match message.get("type").and_then(Value::as_str) {
                Some(GRE_MATCH_CREATED) => {
                    events.push(event(EventKind::MatchStart(MatchStart {
                        match_id: bundle.match_id.clone(),
                        event_name: None,
                        opponent: None,
                        extra: message_extras(message),
                    })));
                }
                Some(GRE_MATCH_COMPLETED) => {
                    let result = message
                        .get("finalMatchResult")
                        .and_then(|r| r.get("result"))
                        .and_then(Value::as_str);
                    match result {
                        Some(result) => events.push(event(EventKind::MatchEnd(MatchEnd {
                            match_id: bundle.match_id.clone(),
                            result: result.to_string(),
                            turns: message
                                .get("turnCount")
                                .and_then(Value::as_u64)
                                .map(|n| n as u32),
                            extra: message_extras(message),
                        }))),
                        None => {
                            tracing::debug!("Ignoring completed-match message without a result")
                        }
                    }
                }
                _ => {}
            }
        }
        events
    }

    fn parse_timestamp(&self, header: &str) -> Option<Timestamp> {
        if let Some(caps) = self.us_timestamp_re.captures(header) {
            let month: u32 = caps.get(1)?.as_str().parse().ok()?;
            let day: u32 = caps.get(2)?.as_str().parse().ok()?;
            let year: i32 = caps.get(3)?.as_str().parse().ok()?;
            let mut hour: u32 = caps.get(4)?.as_str().parse().ok()?;
            let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
            let second: u32 = caps.get(6)?.as_str().parse().ok()?;
            match caps.get(7).map(|m| m.as_str()) {
                Some("PM") if hour < 12 => hour += 12,
                Some("AM") if hour == 12 => hour = 0,
                _ => {}
            }
            let naive = NaiveDateTime::new(
                NaiveDate::from_ymd_opt(year, month, day)?,
                NaiveTime::from_hms_opt(hour, minute, second)?,
            );
            return Some(Utc.from_utc_datetime(&naive));
        }
        if let Some(caps) = self.iso_timestamp_re.captures(header) {
            let year: i32 = caps.get(1)?.as_str().parse().ok()?;
            let month: u32 = caps.get(2)?.as_str().parse().ok()?;
            let day: u32 = caps.get(3)?.as_str().parse().ok()?;
            let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
            let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
            let second: u32 = caps.get(6)?.as_str().parse().ok()?;
            let naive = NaiveDateTime::new(
                NaiveDate::from_ymd_opt(year, month, day)?,
                NaiveTime::from_hms_opt(hour, minute, second)?,
            );
            return Some(Utc.from_utc_datetime(&naive));
        }
        None
    }
}

/// Outer shape of a GRE bundle payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GreBundle {
    match_id: String,
    #[serde(default)]
    gre_to_client_messages: Vec<Value>,
}

/// Everything a bundle message carries besides its type tag.
fn message_extras(message: &Value) -> Map<String, Value> {
    let mut extras = message.as_object().cloned().unwrap_or_default();
    extras.remove("type");
    extras
}
