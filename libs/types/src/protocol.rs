//! Client request wire format
//!
//! A client frame carries exactly one of `order`, `cancelId`, `getBooks`,
//! `startRound`, `stopRound` or `startTrader`. Anything else is malformed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;
use crate::ids::OrderId;
use crate::numeric::{Price, Quantity};
use crate::order::{Order, Side};

/// Order as submitted by a client. `id` and `timestamp` are assigned on
/// ingress when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub id: Option<OrderId>,
    pub quantity: Quantity,
    pub price: Price,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub side: Side,
}

impl OrderPayload {
    pub fn into_order(self) -> Order {
        Order {
            id: self.id.unwrap_or_default(),
            quantity: self.quantity,
            price: self.price,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            side: self.side,
            owner: None,
        }
    }
}

/// Raw client frame
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    #[serde(default)]
    pub order: Option<OrderPayload>,
    #[serde(default)]
    pub cancel_id: Option<OrderId>,
    #[serde(default, alias = "getbooks")]
    pub get_books: bool,
    #[serde(default)]
    pub start_round: bool,
    #[serde(default)]
    pub stop_round: bool,
    #[serde(default)]
    pub start_trader: Option<String>,
}

/// The single command a well-formed client frame resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    Submit(Order),
    Cancel(OrderId),
    GetBooks,
    StartRound,
    StopRound,
    StartTrader(String),
}

impl ClientRequest {
    /// Parse a text frame into a command
    pub fn parse(raw: &str) -> Result<ClientCommand, ProtocolError> {
        let request: ClientRequest = serde_json::from_str(raw)?;
        request.into_command()
    }

    pub fn into_command(self) -> Result<ClientCommand, ProtocolError> {
        let mut commands = Vec::with_capacity(1);

        if let Some(order) = self.order {
            commands.push(ClientCommand::Submit(order.into_order()));
        }
        if let Some(id) = self.cancel_id {
            commands.push(ClientCommand::Cancel(id));
        }
        if self.get_books {
            commands.push(ClientCommand::GetBooks);
        }
        if self.start_round {
            commands.push(ClientCommand::StartRound);
        }
        if self.stop_round {
            commands.push(ClientCommand::StopRound);
        }
        if let Some(name) = self.start_trader.filter(|name| !name.is_empty()) {
            commands.push(ClientCommand::StartTrader(name));
        }

        let count = commands.len();
        let mut commands = commands.into_iter();
        match (commands.next(), commands.next()) {
            (Some(command), None) => Ok(command),
            (None, _) => Err(ProtocolError::Empty),
            (Some(_), Some(_)) => Err(ProtocolError::Ambiguous { count }),
        }
    }
}
