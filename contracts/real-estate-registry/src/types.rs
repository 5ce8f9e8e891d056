/*!
 * Type Definitions for the Real Estate Registry Contract
 *
 * This module defines the record structures, error codes, and event symbols
 * used by the registry. Records are append-only: once a property or purchase
 * contract id has been used it stays in storage forever, which is what makes
 * id uniqueness hold for the lifetime of the registry.
 */

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, String, Symbol, Vec};

// ================================================================================================
// CORE DATA STRUCTURES
// ================================================================================================

/// A property listing held by the registry.
///
/// The registry is the exclusive owner of these records. Callers only request
/// mutations through the contract operations; a successful purchase flips
/// `owner` and `is_active` atomically with the payment split.
///
/// # Lifecycle
/// - Created by `create_property` with `is_active = true`
/// - `price` and `is_active` mutable by the current owner via `update_property`
/// - `owner` changes exactly once per successful purchase
/// - Never deleted, even after a sale (ids are never reused)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    /// Client-supplied opaque id, unique for the lifetime of the registry
    pub id: String,

    /// Current rights-holder; the seller of record while the listing is active
    pub owner: Address,

    /// Display title, non-empty at creation
    pub title: String,

    /// Free-form description (may be empty)
    pub description: String,

    /// Display location, non-empty at creation
    pub location: String,

    /// Asking price in base units of the settlement token; strictly positive
    pub price: i128,

    /// Opaque storage references resolved off-chain; the registry stores and
    /// returns these strings verbatim and never interprets them. By
    /// convention the first entry is the primary image.
    pub documents: Vec<String>,

    /// True while available for purchase; false once sold or delisted
    pub is_active: bool,

    /// Ledger timestamp at creation; never updated
    pub created_at: u64,
}

/// The durable record of a settled purchase.
///
/// Created exactly once, atomically with the ownership transfer and the
/// payment split, and immutable thereafter. There is no further lifecycle:
/// no cancellation and no multi-step escrow.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PurchaseContract {
    /// Client-supplied opaque id, unique for the lifetime of the registry
    pub id: String,

    /// The property this purchase settled
    pub property_id: String,

    /// The paying party; becomes the property owner
    pub buyer: Address,

    /// The property owner at the instant of settlement
    pub seller: Address,

    /// Amount paid; equals the property price at the time of purchase
    pub value: i128,

    /// Terminal status assigned at settlement
    pub status: ContractStatus,

    /// Ledger timestamp of settlement. Kept separate from the listing's
    /// `created_at` so history views can show a real sale date.
    pub settled_at: u64,
}

/// Status of a purchase contract.
///
/// `Created` is assigned at the moment of successful settlement and is the
/// only state a contract record ever has.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContractStatus {
    /// Settlement completed: funds moved, ownership transferred
    Created,
}

// ================================================================================================
// ERROR DEFINITIONS
// ================================================================================================

/// Failure reasons for registry operations.
///
/// Each rejection case has its own stable numeric code so callers can map
/// failures to user-facing text without parsing messages. A returned error
/// aborts the invocation and rolls back every storage write and token
/// movement, so no operation ever partially applies.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    // ========== Lookup failures ==========
    /// Referenced property id does not exist in the registry
    PropertyNotFound = 1,

    // ========== Validation failures ==========
    /// Property id is empty
    InvalidPropertyId = 2,

    /// Contract id is empty
    InvalidContractId = 3,

    /// Title is empty
    EmptyTitle = 4,

    /// Location is empty
    EmptyLocation = 5,

    /// Price or payment amount is zero or negative
    InvalidPrice = 6,

    /// Requested platform fee exceeds the 10% ceiling (1000 basis points)
    FeeExceedsMaximum = 7,

    // ========== Conflict failures ==========
    /// A property with this id already exists (ids are never reused)
    PropertyIdAlreadyExists = 8,

    /// A purchase contract with this id already exists
    ContractIdAlreadyExists = 9,

    /// Property is not available for purchase (sold or delisted)
    PropertyNotActive = 10,

    /// The current owner cannot purchase their own property
    SelfPurchaseNotAllowed = 11,

    /// Payment amount does not exactly match the listed price
    PaymentMismatch = 12,

    // ========== Authorization failures ==========
    /// Caller is not the property owner
    NotPropertyOwner = 13,

    /// Caller is not the registry administrator
    NotAdmin = 14,

    // ========== Settlement failures ==========
    /// The registry holds no fees to withdraw
    NoFeesToWithdraw = 15,

    /// A settlement-token transfer failed; the whole operation unwinds
    TokenTransferFailed = 16,
}

// ================================================================================================
// EVENT CONSTANTS
// ================================================================================================
// Events are the durable results clients poll after submitting an operation,
// and they feed off-chain indexers that rebuild listing and sale history.

/// Emitted when a property is listed.
/// Contains: (property_id, price)
pub const PROPERTY_CREATED: Symbol = symbol_short!("prop_crt");

/// Emitted when an owner updates a listing's price or active flag.
/// Contains: (property_id, price, is_active)
pub const PROPERTY_UPDATED: Symbol = symbol_short!("prop_upd");

/// Emitted when a purchase settles.
/// Contains: (contract_id, property_id, value)
pub const CONTRACT_CREATED: Symbol = symbol_short!("cntr_crt");

/// Emitted when the platform fee rate changes.
/// Contains: new fee rate in basis points
pub const FEE_UPDATED: Symbol = symbol_short!("fee_upd");

/// Emitted when accumulated platform fees are withdrawn.
/// Contains: amount withdrawn
pub const FEES_WITHDRAWN: Symbol = symbol_short!("fee_wthd");
