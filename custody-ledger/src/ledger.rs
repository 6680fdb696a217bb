//! Ledger core: the custody registry and its state machine
//!
//! One [`Ledger`] owns the mapping from product identifier to product plus
//! its append-only event history, the insertion-ordered identifier list,
//! and the running aggregates. It is created once at startup with empty
//! maps and counters and lives for the process lifetime.
//!
//! # Concurrency
//!
//! Mutating operations hold the keyed map entry exclusively for the whole
//! operation, so operations on one product linearize while unrelated
//! products proceed in parallel. Aggregates are updated under their own
//! mutex inside the same critical section, before the keyed lock is
//! released. Lock order is fixed: product entry → insertion order → stats.
//!
//! # Atomicity
//!
//! Every check (role, arguments, existence, status, price arithmetic) runs
//! before the first mutation; a failed operation is a no-op on products,
//! history, and aggregates alike. A retried `register` fails
//! `AlreadyExists`; a retried advance fails `InvalidState`; nothing is ever
//! double-applied.

use crate::{
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    price::{Price, PriceUnit},
    types::{
        Caller, LedgerStats, Product, ProductId, ProductStatus, Receipt, Registration, Role,
        TraceAction, TraceEvent,
    },
};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// A product together with its custody history, guarded by one keyed lock
struct ProductEntry {
    product: Product,
    history: Vec<TraceEvent>,
}

/// Description of one custody advance step
struct Stage {
    role: Role,
    action: TraceAction,
    from: ProductStatus,
    to: ProductStatus,
}

/// The product traceability ledger
pub struct Ledger {
    /// Registry keyed by product identifier
    products: DashMap<ProductId, ProductEntry>,

    /// Identifiers in registration order, for stable enumeration
    insertion_order: Mutex<Vec<ProductId>>,

    /// Running aggregates
    stats: Mutex<LedgerStats>,

    /// Ledger-wide sequence counter
    sequence: AtomicU64,

    /// Price conversion helper for this ledger's scale
    price_unit: PriceUnit,

    /// Prometheus metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open a ledger with configuration
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let price_unit = PriceUnit::new(config.price_decimals)?;
        let metrics = Metrics::new().map_err(|e| Error::Metrics(e.to_string()))?;

        tracing::info!(
            service = %config.service_name,
            price_decimals = config.price_decimals,
            "custody ledger opened"
        );

        Ok(Self {
            products: DashMap::new(),
            insertion_order: Mutex::new(Vec::new()),
            stats: Mutex::new(LedgerStats::default()),
            sequence: AtomicU64::new(0),
            price_unit,
            metrics,
            config,
        })
    }

    /// Register a new product
    ///
    /// Requires the producer role. The caller becomes the product's
    /// producer; the product starts at `Registered` with
    /// `current_price == base_price`, and a `Registered` event is appended.
    pub fn register(&self, registration: Registration, caller: &Caller) -> Result<Receipt> {
        let _timer = self.metrics.operation_duration.start_timer();
        let result = self.do_register(registration, caller);
        if result.is_err() {
            self.metrics.rejections_total.inc();
        }
        result
    }

    /// Advance custody as an intermediary: `Registered` → `InTransit`
    ///
    /// Requires the intermediary role. Adds `added_cost` to the current
    /// price and fixes the caller as the product's intermediary.
    pub fn advance_as_intermediary(
        &self,
        id: &str,
        added_cost: Price,
        details: impl Into<String>,
        caller: &Caller,
    ) -> Result<Receipt> {
        let _timer = self.metrics.operation_duration.start_timer();
        let result = self.advance(
            id,
            added_cost,
            details.into(),
            caller,
            Stage {
                role: Role::Intermediary,
                action: TraceAction::AdvancedByIntermediary,
                from: ProductStatus::Registered,
                to: ProductStatus::InTransit,
            },
        );
        if result.is_err() {
            self.metrics.rejections_total.inc();
        }
        result
    }

    /// Advance custody as a seller: `InTransit` → `Available`
    ///
    /// Requires the seller role. Adds `added_margin` to the current price,
    /// fixes the caller as the product's seller, and moves the product to
    /// its terminal status.
    pub fn advance_as_seller(
        &self,
        id: &str,
        added_margin: Price,
        details: impl Into<String>,
        caller: &Caller,
    ) -> Result<Receipt> {
        let _timer = self.metrics.operation_duration.start_timer();
        let result = self.advance(
            id,
            added_margin,
            details.into(),
            caller,
            Stage {
                role: Role::Seller,
                action: TraceAction::AdvancedBySeller,
                from: ProductStatus::InTransit,
                to: ProductStatus::Available,
            },
        );
        if result.is_err() {
            self.metrics.rejections_total.inc();
        }
        result
    }

    /// Get a snapshot of a product, `None` if it was never registered
    pub fn get_product(&self, id: &str) -> Option<Product> {
        self.products.get(id).map(|entry| entry.product.clone())
    }

    /// Get a product's full custody history in append order
    pub fn get_history(&self, id: &str) -> Result<Vec<TraceEvent>> {
        self.products
            .get(id)
            .map(|entry| entry.history.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// List all product identifiers in registration order
    pub fn list_product_ids(&self) -> Vec<ProductId> {
        self.insertion_order.lock().clone()
    }

    /// Read the running aggregates
    ///
    /// O(1) copy of maintained counters; never recomputed by scanning.
    pub fn stats(&self) -> LedgerStats {
        *self.stats.lock()
    }

    /// Price conversion helper for this ledger's scale
    pub fn price_unit(&self) -> &PriceUnit {
        &self.price_unit
    }

    /// Prometheus metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration the ledger was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn do_register(&self, registration: Registration, caller: &Caller) -> Result<Receipt> {
        if caller.role != Role::Producer {
            return Err(Error::Unauthorized(format!(
                "role {} cannot register products",
                caller.role
            )));
        }
        validate_registration(&registration)?;

        let Registration {
            id,
            name,
            quantity,
            base_price,
            harvest_date,
            quality,
            location,
        } = registration;

        match self.products.entry(id.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(id.to_string())),
            Entry::Vacant(slot) => {
                let sequence = self.next_sequence();
                let details = format!("registered at {}", location);
                let product = Product {
                    id: id.clone(),
                    name,
                    quantity,
                    harvest_date,
                    quality,
                    location,
                    base_price,
                    current_price: base_price,
                    status: ProductStatus::Registered,
                    producer: caller.id.clone(),
                    intermediary: None,
                    seller: None,
                    registered_at: Utc::now(),
                };
                let event = TraceEvent::new(
                    id.clone(),
                    caller.id.clone(),
                    TraceAction::Registered,
                    base_price,
                    details,
                    sequence,
                    [0u8; 32],
                );
                let receipt = Receipt {
                    product_id: id.clone(),
                    event_id: event.event_id,
                    sequence,
                    timestamp: event.timestamp,
                };

                let entry = slot.insert(ProductEntry {
                    product,
                    history: vec![event],
                });

                self.insertion_order.lock().push(id.clone());
                {
                    let mut stats = self.stats.lock();
                    stats.total_products += 1;
                    stats.total_transactions += 1;
                    stats.total_value = stats.total_value.saturating_add(base_price);
                    stats.active_products += 1;
                }
                drop(entry);

                self.metrics.registrations_total.inc();
                self.metrics.transactions_total.inc();
                self.metrics.active_products.inc();
                tracing::info!(
                    product_id = %id,
                    producer = %caller.id,
                    sequence,
                    "product registered"
                );

                Ok(receipt)
            }
        }
    }

    fn advance(
        &self,
        id: &str,
        added: Price,
        details: String,
        caller: &Caller,
        stage: Stage,
    ) -> Result<Receipt> {
        if caller.role != stage.role {
            return Err(Error::Unauthorized(format!(
                "role {} cannot perform the {} handoff",
                caller.role, stage.role
            )));
        }

        let mut entry = self
            .products
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if entry.product.status != stage.from {
            tracing::warn!(
                product_id = id,
                status = ?entry.product.status,
                expected = ?stage.from,
                "custody advance rejected"
            );
            return Err(Error::InvalidState(format!(
                "product {} is {:?}, expected {:?}",
                id, entry.product.status, stage.from
            )));
        }

        let new_price = entry
            .product
            .current_price
            .checked_add(added)
            .ok_or_else(|| Error::InvalidArgument(format!("price overflow for product {}", id)))?;

        let sequence = self.next_sequence();
        let previous_hash = entry
            .history
            .last()
            .map(|event| event.event_hash)
            .unwrap_or([0u8; 32]);
        let event = TraceEvent::new(
            entry.product.id.clone(),
            caller.id.clone(),
            stage.action,
            new_price,
            details,
            sequence,
            previous_hash,
        );
        let receipt = Receipt {
            product_id: entry.product.id.clone(),
            event_id: event.event_id,
            sequence,
            timestamp: event.timestamp,
        };

        entry.product.current_price = new_price;
        entry.product.status = stage.to;
        match stage.action {
            TraceAction::AdvancedByIntermediary => {
                entry.product.intermediary = Some(caller.id.clone());
            }
            TraceAction::AdvancedBySeller => {
                entry.product.seller = Some(caller.id.clone());
            }
            TraceAction::Registered => {}
        }
        entry.history.push(event);

        let terminal = entry.product.status.is_terminal();
        {
            let mut stats = self.stats.lock();
            stats.total_transactions += 1;
            stats.total_value = stats.total_value.saturating_add(added);
            if terminal {
                stats.active_products -= 1;
            }
        }
        drop(entry);

        self.metrics.transfers_total.inc();
        self.metrics.transactions_total.inc();
        if terminal {
            self.metrics.active_products.dec();
        }
        tracing::info!(
            product_id = id,
            actor = %caller.id,
            status = ?stage.to,
            sequence,
            "custody advanced"
        );

        Ok(receipt)
    }
}

fn validate_registration(registration: &Registration) -> Result<()> {
    if registration.id.as_str().is_empty() {
        return Err(Error::InvalidArgument(
            "product id must not be empty".to_string(),
        ));
    }
    if registration.name.is_empty() {
        return Err(Error::InvalidArgument(
            "product name must not be empty".to_string(),
        ));
    }
    if registration.harvest_date.is_empty() {
        return Err(Error::InvalidArgument(
            "harvest date must not be empty".to_string(),
        ));
    }
    if registration.quality.is_empty() {
        return Err(Error::InvalidArgument(
            "quality grade must not be empty".to_string(),
        ));
    }
    if registration.location.is_empty() {
        return Err(Error::InvalidArgument(
            "location must not be empty".to_string(),
        ));
    }
    if registration.quantity == 0 {
        return Err(Error::InvalidArgument(
            "quantity must be positive".to_string(),
        ));
    }
    Ok(())
}
