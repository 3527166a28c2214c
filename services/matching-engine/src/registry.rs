//! Participant registry and outbound mailboxes
//!
//! Each connected participant owns one bounded mailbox. The engine is the
//! only writer, so delivery order matches the order mutations were applied.
//! A participant whose mailbox is closed is removed; an overflowing mailbox
//! is handled by the configured drop policy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use types::ids::ParticipantId;

use crate::events::MarketEvent;

/// Drop policy when a participant's mailbox overflows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Disconnect the lagging participant immediately.
    #[default]
    Disconnect,
    /// Discard the event for that participant only.
    DropLatest,
}

/// Mailbox sizing shared by the engine and its handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub capacity: usize,
    pub drop_policy: DropPolicy,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            drop_policy: DropPolicy::Disconnect,
        }
    }
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
    Disconnected,
    Unknown,
}

/// Currently connected participants
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    mailboxes: BTreeMap<ParticipantId, mpsc::Sender<MarketEvent>>,
    drop_policy: DropPolicy,
    /// Events discarded under `DropPolicy::DropLatest`
    dropped: u64,
}

impl ParticipantRegistry {
    pub fn new(drop_policy: DropPolicy) -> Self {
        Self {
            mailboxes: BTreeMap::new(),
            drop_policy,
            dropped: 0,
        }
    }

    /// Register a participant. A repeated connect replaces the mailbox.
    pub fn connect(&mut self, participant: ParticipantId, mailbox: mpsc::Sender<MarketEvent>) {
        if self.mailboxes.insert(participant, mailbox).is_some() {
            debug!(participant = %participant, "Participant mailbox replaced");
        }
        info!(participant = %participant, connected = self.mailboxes.len(), "Participant connected");
    }

    /// Returns false when the participant was not registered
    pub fn disconnect(&mut self, participant: ParticipantId) -> bool {
        let removed = self.mailboxes.remove(&participant).is_some();
        if removed {
            info!(participant = %participant, connected = self.mailboxes.len(), "Participant disconnected");
        }
        removed
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.mailboxes.contains_key(&participant)
    }

    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Point-to-point delivery
    pub fn send_to(&mut self, participant: ParticipantId, event: MarketEvent) -> Delivery {
        let Some(mailbox) = self.mailboxes.get(&participant) else {
            debug!(participant = %participant, event = event.kind(), "Recipient not connected");
            return Delivery::Unknown;
        };

        let delivery = Self::deliver(mailbox, event, self.drop_policy, &mut self.dropped, participant);
        if delivery == Delivery::Disconnected {
            self.disconnect(participant);
        }
        delivery
    }

    /// Deliver to every registered participant
    ///
    /// Returns the participants removed because their mailbox failed.
    pub fn broadcast(&mut self, event: &MarketEvent) -> Vec<ParticipantId> {
        let mut failed = Vec::new();

        for (participant, mailbox) in &self.mailboxes {
            let delivery = Self::deliver(
                mailbox,
                event.clone(),
                self.drop_policy,
                &mut self.dropped,
                *participant,
            );
            if delivery == Delivery::Disconnected {
                failed.push(*participant);
            }
        }

        for participant in &failed {
            self.disconnect(*participant);
        }
        failed
    }

    fn deliver(
        mailbox: &mpsc::Sender<MarketEvent>,
        event: MarketEvent,
        policy: DropPolicy,
        dropped: &mut u64,
        participant: ParticipantId,
    ) -> Delivery {
        match mailbox.try_send(event) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(event)) => match policy {
                DropPolicy::Disconnect => {
                    warn!(participant = %participant, event = event.kind(), "Mailbox full, disconnecting participant");
                    Delivery::Disconnected
                }
                DropPolicy::DropLatest => {
                    *dropped += 1;
                    debug!(participant = %participant, event = event.kind(), "Mailbox full, event dropped");
                    Delivery::Dropped
                }
            },
            Err(TrySendError::Closed(_)) => {
                warn!(participant = %participant, "Mailbox closed, disconnecting participant");
                Delivery::Disconnected
            }
        }
    }
}
