//! Core layer - Framework-agnostic hotel operations
//!
//! Pure calculators and state machines (`finance`, `lifecycle`, `assignment`) sit next
//! to the persisted operations that use them. Nothing in here knows about HTTP.

/// Room/table candidate matching
pub mod assignment;
/// Injectable time source
pub mod clock;
/// Request-scoped property and actor
pub mod context;
/// Restaurant tables and table bookings
pub mod dining;
/// Cancellation fees, folio balances, service totals and HR arithmetic
pub mod finance;
/// Per-reservation ledger of line items
pub mod folio;
/// Attendance, shifts and overtime
pub mod hr;
/// Reservation state machine
pub mod lifecycle;
/// Paginated collection results
pub mod page;
/// Payments and refunds
pub mod payment;
/// Rate plans and cancellation policies
pub mod policy;
/// Persisted reservation operations
pub mod reservation;
/// Room inventory and claims
pub mod room;
/// Property services posted to folios
pub mod service;
