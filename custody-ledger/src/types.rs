//! Core types for the custody ledger
//!
//! All types are serde-serializable snapshots; the ledger hands out clones,
//! never references into its own state.

use crate::price::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Product identifier, assigned by the registering producer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Create new product ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque caller identity, supplied by the identity provider
///
/// The ledger trusts this identity; whether it is cryptographically proven
/// upstream is not its concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    /// Create new actor ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared role of a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Registers products
    Producer,
    /// Performs the first handoff
    Intermediary,
    /// Performs the final handoff
    Seller,
}

impl Role {
    /// Role name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Producer => "producer",
            Role::Intermediary => "intermediary",
            Role::Seller => "seller",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "producer" => Some(Role::Producer),
            "intermediary" => Some(Role::Intermediary),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller identity plus declared role, as handed over by the identity
/// provider for a single call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Who is calling
    pub id: ActorId,
    /// The role the identity provider vouches for
    pub role: Role,
}

impl Caller {
    /// Create a caller with an explicit role
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: ActorId::new(id),
            role,
        }
    }

    /// Producer-role caller
    pub fn producer(id: impl Into<String>) -> Self {
        Self::new(id, Role::Producer)
    }

    /// Intermediary-role caller
    pub fn intermediary(id: impl Into<String>) -> Self {
        Self::new(id, Role::Intermediary)
    }

    /// Seller-role caller
    pub fn seller(id: impl Into<String>) -> Self {
        Self::new(id, Role::Seller)
    }
}

/// Product custody status
///
/// Advances forward-only: `Registered` → `InTransit` → `Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ProductStatus {
    /// Registered by a producer (initial)
    Registered = 1,
    /// In the intermediary's custody
    InTransit = 2,
    /// Available for sale (terminal)
    Available = 3,
}

impl ProductStatus {
    /// The only status reachable from this one
    pub fn next(self) -> Option<ProductStatus> {
        match self {
            ProductStatus::Registered => Some(ProductStatus::InTransit),
            ProductStatus::InTransit => Some(ProductStatus::Available),
            ProductStatus::Available => None,
        }
    }

    /// Check if status is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, ProductStatus::Available)
    }
}

/// A single trackable unit of goods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier, immutable after registration
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Quantity (positive)
    pub quantity: u64,

    /// Harvest calendar date
    pub harvest_date: String,

    /// Free-text quality grade
    pub quality: String,

    /// Origin location
    pub location: String,

    /// Price set at registration, immutable
    pub base_price: Price,

    /// Current price; monotonically non-decreasing
    pub current_price: Price,

    /// Custody status
    pub status: ProductStatus,

    /// Actor that registered the product
    pub producer: ActorId,

    /// Actor that performed the intermediary handoff, set exactly once
    pub intermediary: Option<ActorId>,

    /// Actor that performed the seller handoff, set exactly once
    pub seller: Option<ActorId>,

    /// Registration timestamp, immutable
    pub registered_at: DateTime<Utc>,
}

impl Product {
    /// Check if the product reached its terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Registration input, assembled by the submission layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Identifier for the new product
    pub id: ProductId,
    /// Product name
    pub name: String,
    /// Quantity (must be positive)
    pub quantity: u64,
    /// Initial price
    pub base_price: Price,
    /// Harvest calendar date
    pub harvest_date: String,
    /// Free-text quality grade
    pub quality: String,
    /// Origin location
    pub location: String,
}

/// Custody action recorded by a trace event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TraceAction {
    /// Product registered by a producer
    Registered = 1,
    /// Custody advanced by an intermediary
    AdvancedByIntermediary = 2,
    /// Custody advanced by a seller
    AdvancedBySeller = 3,
}

/// One immutable custody event, ordered by (product, sequence)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Product this event belongs to
    pub product_id: ProductId,

    /// Actor that performed the action
    pub actor: ActorId,

    /// What happened
    pub action: TraceAction,

    /// Product price after this event
    pub price_after: Price,

    /// Free-text details
    pub details: String,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Ledger-wide monotonic sequence number
    pub sequence: u64,

    /// Hash of the previous event for this product (zero hash for the
    /// registration event)
    pub previous_hash: [u8; 32],

    /// SHA-256 over this event's content, chained via `previous_hash`
    pub event_hash: [u8; 32],
}

impl TraceEvent {
    /// Create a new event with its hash computed and chained
    pub fn new(
        product_id: ProductId,
        actor: ActorId,
        action: TraceAction,
        price_after: Price,
        details: String,
        sequence: u64,
        previous_hash: [u8; 32],
    ) -> Self {
        let mut event = Self {
            event_id: Uuid::now_v7(),
            product_id,
            actor,
            action,
            price_after,
            details,
            timestamp: Utc::now(),
            sequence,
            previous_hash,
            event_hash: [0u8; 32],
        };
        event.event_hash = event.compute_hash();
        event
    }

    /// Compute the event hash
    ///
    /// Digests the custody content field by field; variable-length fields
    /// are length-prefixed. The `event_id` is an identifier, not custody
    /// content, and is excluded.
    pub fn compute_hash(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.sequence.to_be_bytes());
        hasher.update((self.product_id.as_str().len() as u64).to_be_bytes());
        hasher.update(self.product_id.as_str().as_bytes());
        hasher.update((self.actor.as_str().len() as u64).to_be_bytes());
        hasher.update(self.actor.as_str().as_bytes());
        hasher.update([self.action as u8]);
        hasher.update(self.price_after.as_scaled().to_be_bytes());
        hasher.update((self.details.len() as u64).to_be_bytes());
        hasher.update(self.details.as_bytes());
        hasher.update(
            self.timestamp
                .timestamp_nanos_opt()
                .unwrap_or(0)
                .to_be_bytes(),
        );
        hasher.update(self.previous_hash);

        hasher.finalize().into()
    }
}

/// Causally-ordered acknowledgment of a successful mutating operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Product the operation targeted
    pub product_id: ProductId,
    /// Event recorded for the operation
    pub event_id: Uuid,
    /// Ledger-wide sequence number of that event
    pub sequence: u64,
    /// When the operation took effect
    pub timestamp: DateTime<Utc>,
}

/// Running ledger aggregates, maintained as part of each mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Number of registered products
    pub total_products: u64,
    /// Number of recorded custody events
    pub total_transactions: u64,
    /// Sum of every product's current price
    pub total_value: Price,
    /// Products not yet in the terminal status
    pub active_products: u64,
}
