//! Hash-chained record of state-changing operations
//!
//! Each event commits to its predecessor's hash, so any edit to a stored
//! event breaks the chain from that point on.

use crate::identity::Identity;
use crate::revision::Revision;
use crate::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tap_calendar::CalendarKey;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Owner recorded
    Initialized { owner: Identity, revision: Revision },
    /// Logic module swapped
    Upgraded { from: Revision, to: Revision },
    /// Price written
    PriceSet {
        caller: Identity,
        key: CalendarKey,
        price: Price,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    #[serde(with = "hex_hash")]
    pub prev_hash: [u8; 32],
    #[serde(with = "hex_hash")]
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain a new event onto the log and return its sequence number
    pub fn append(&mut self, timestamp: DateTime<Utc>, kind: EventKind) -> u64 {
        let prev_hash = self.events.last().map_or([0u8; 32], |e| e.hash);
        let seq = self.events.len() as u64;
        let mut event = Event {
            seq,
            timestamp,
            kind,
            prev_hash,
            hash: [0u8; 32],
        };
        event.hash = compute_hash(&event);
        self.events.push(event);
        seq
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hash of the newest event, zero for an empty log
    pub fn head(&self) -> [u8; 32] {
        self.events.last().map_or([0u8; 32], |e| e.hash)
    }

    pub fn verify_integrity(&self) -> Result<(), LogError> {
        let mut prev = [0u8; 32];
        for (idx, e) in self.events.iter().enumerate() {
            if e.seq != idx as u64 || e.prev_hash != prev || e.hash != compute_hash(e) {
                return Err(LogError::IntegrityViolation { seq: idx as u64 });
            }
            prev = e.hash;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("event log integrity violation at event {seq}")]
    IntegrityViolation { seq: u64 },
}

fn compute_hash(event: &Event) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(event.seq.to_le_bytes());
    hasher.update(event.timestamp.timestamp().to_le_bytes());
    hasher.update(event.timestamp.timestamp_subsec_nanos().to_le_bytes());
    match &event.kind {
        EventKind::Initialized { owner, revision } => {
            hasher.update([0]);
            hasher.update(owner.as_bytes());
            hasher.update([revision.as_u8()]);
        }
        EventKind::Upgraded { from, to } => {
            hasher.update([1]);
            hasher.update([from.as_u8(), to.as_u8()]);
        }
        EventKind::PriceSet { caller, key, price } => {
            hasher.update([2]);
            hasher.update(caller.as_bytes());
            hasher.update([key.month(), key.day()]);
            hasher.update(price.to_le_bytes());
        }
    }
    hasher.update(event.prev_hash);
    hasher.finalize().into()
}

mod hex_hash {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(hash: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(hash))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(d)?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(&text, &mut out).map_err(serde::de::Error::custom)?;
        Ok(out)
    }
}
