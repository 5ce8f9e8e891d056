/*!
 * Real Estate Registry & Settlement Smart Contract
 *
 * This contract is the authoritative store for a peer-to-peer property
 * marketplace: property listings, the purchase contracts that settle them,
 * and the fee-bearing payment split that moves funds and flips ownership
 * atomically when a purchase is finalized.
 *
 * Key features:
 * - Append-only property and purchase-contract records with globally unique,
 *   client-supplied string ids
 * - Single-call settlement: payment split, ownership transfer, and record
 *   insertion happen in one indivisible operation
 * - Configurable platform fee in basis points (10% ceiling), accumulated in
 *   the contract's own balance until withdrawn by the administrator
 * - Read-only queries for listings and purchase history, in creation order
 *
 * Business logic:
 * 1. Sellers list properties with a price in the settlement token
 * 2. Owners may reprice or delist/relist while they hold the property
 * 3. A buyer settles a purchase by paying the exact listed price; the seller
 *    receives the price minus the platform fee, the fee stays in the contract
 * 4. A sold listing deactivates and its ownership moves to the buyer; the
 *    purchase contract is the permanent record of the sale
 * 5. The administrator tunes the fee rate and withdraws accumulated fees
 *
 * Concurrency: the ledger executes invocations one at a time, so two
 * concurrent purchase attempts on the same property serialize and the second
 * one is rejected with `PropertyNotActive`. Returning an error aborts the
 * invocation and rolls back all storage writes and token movements, which is
 * what guarantees that rejected operations never partially apply.
 */

#![no_std]

mod types;


use soroban_sdk::{
    contract, contractimpl, log, symbol_short, token, Address, Env, Map, String, Symbol, Vec,
};

use types::{
    ContractStatus, Error, Property, PurchaseContract, CONTRACT_CREATED, FEES_WITHDRAWN,
    FEE_UPDATED, PROPERTY_CREATED, PROPERTY_UPDATED,
};

#[contract]
pub struct RealEstateRegistry;

// Storage keys - short symbols keep storage footprint small
// Persistent storage holds configuration that must survive contract upgrades;
// instance storage holds the record maps and their ordering vectors.
const ADMIN_KEY: Symbol = symbol_short!("ADMIN"); // Administrative principal (persistent)
const PAYMENT_TOKEN_KEY: Symbol = symbol_short!("PAY_TOKEN"); // Settlement token contract address (persistent)
const FEE_RATE_KEY: Symbol = symbol_short!("FEE_RATE"); // Platform fee in basis points (persistent)
const PROPERTIES_KEY: Symbol = symbol_short!("PROPS"); // Map of property id to Property (instance)
const PROPERTY_IDS_KEY: Symbol = symbol_short!("PROP_IDS"); // Property ids in creation order (instance)
const CONTRACTS_KEY: Symbol = symbol_short!("CONTRACTS"); // Map of contract id to PurchaseContract (instance)
const CONTRACT_IDS_KEY: Symbol = symbol_short!("CNTR_IDS"); // Contract ids in settlement order (instance)

/// Default platform fee: 25 basis points = 0.25%
const DEFAULT_PLATFORM_FEE: u32 = 25;
/// Fee ceiling: 1000 basis points = 10%
const MAX_PLATFORM_FEE: u32 = 1_000;
/// Standard basis points denominator
const BASIS_POINTS_DIVISOR: u32 = 10_000;

#[contractimpl]
impl RealEstateRegistry {
    /// Initializes the registry with its administrative principal and the
    /// token used for settlement (the native asset's Stellar Asset Contract
    /// in a typical deployment).
    ///
    /// Can only be called once. Validates that `payment_token` actually
    /// implements the token interface by calling `decimals()` on it, which
    /// panics for a non-token address.
    pub fn initialize(env: Env, admin: Address, payment_token: Address) {
        if env.storage().persistent().has(&ADMIN_KEY) {
            panic!("Contract already initialized");
        }

        let token_client = token::Client::new(&env, &payment_token);
        let _ = token_client.decimals();

        env.storage().persistent().set(&ADMIN_KEY, &admin);
        env.storage().persistent().set(&PAYMENT_TOKEN_KEY, &payment_token);
        env.storage().persistent().set(&FEE_RATE_KEY, &DEFAULT_PLATFORM_FEE);

        env.storage()
            .instance()
            .set(&PROPERTIES_KEY, &Map::<String, Property>::new(&env));
        env.storage()
            .instance()
            .set(&PROPERTY_IDS_KEY, &Vec::<String>::new(&env));
        env.storage()
            .instance()
            .set(&CONTRACTS_KEY, &Map::<String, PurchaseContract>::new(&env));
        env.storage()
            .instance()
            .set(&CONTRACT_IDS_KEY, &Vec::<String>::new(&env));
    }

    /// Internal helper to verify that `caller` is the administrative
    /// principal and has signed the transaction.
    fn _require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
        caller.require_auth();
        let admin: Address = env.storage().persistent().get(&ADMIN_KEY).unwrap();
        if *caller != admin {
            return Err(Error::NotAdmin);
        }
        Ok(())
    }

    /// Internal helper to compute the platform fee for a payment amount.
    ///
    /// Fees are floored: `fee = floor(amount * fee_rate / 10000)`. For
    /// amounts large enough to overflow the multiplication, divides first at
    /// the cost of a little precision.
    fn _calculate_fee(amount: i128, fee_rate: u32) -> i128 {
        const MAX_SAFE_AMOUNT: i128 = i128::MAX / (MAX_PLATFORM_FEE as i128);

        if amount > MAX_SAFE_AMOUNT {
            (amount / (BASIS_POINTS_DIVISOR as i128)).saturating_mul(fee_rate as i128)
        } else {
            amount.saturating_mul(fee_rate as i128) / (BASIS_POINTS_DIVISOR as i128)
        }
    }

    /// Lists a new property. The caller becomes its owner.
    ///
    /// # Arguments
    /// * `caller` - The listing party (must sign; becomes `owner`)
    /// * `id` - Client-supplied unique id; never reusable once taken
    /// * `title`, `description`, `location` - Display metadata; title and
    ///   location must be non-empty
    /// * `price` - Asking price in settlement-token base units, > 0
    /// * `documents` - Opaque storage references, stored verbatim
    ///
    /// # Errors
    /// - InvalidPropertyId: empty id
    /// - EmptyTitle / EmptyLocation: missing required metadata
    /// - InvalidPrice: price is zero or negative
    /// - PropertyIdAlreadyExists: id already taken (even by a sold property)
    #[allow(clippy::too_many_arguments)]
    pub fn create_property(
        env: Env,
        caller: Address,
        id: String,
        title: String,
        description: String,
        price: i128,
        location: String,
        documents: Vec<String>,
    ) -> Result<Property, Error> {
        caller.require_auth();

        if id.len() == 0 {
            return Err(Error::InvalidPropertyId);
        }
        if title.len() == 0 {
            return Err(Error::EmptyTitle);
        }
        if location.len() == 0 {
            return Err(Error::EmptyLocation);
        }
        if price <= 0 {
            return Err(Error::InvalidPrice);
        }

        let mut properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        if properties.contains_key(id.clone()) {
            return Err(Error::PropertyIdAlreadyExists);
        }

        let property = Property {
            id: id.clone(),
            owner: caller.clone(),
            title,
            description,
            location,
            price,
            documents,
            is_active: true,
            created_at: env.ledger().timestamp(),
        };

        // The ids vector preserves creation order; the map never iterates in
        // insertion order on its own.
        let mut property_ids: Vec<String> =
            env.storage().instance().get(&PROPERTY_IDS_KEY).unwrap();
        properties.set(id.clone(), property.clone());
        property_ids.push_back(id.clone());

        env.storage().instance().set(&PROPERTIES_KEY, &properties);
        env.storage().instance().set(&PROPERTY_IDS_KEY, &property_ids);

        env.events()
            .publish((PROPERTY_CREATED, caller), (id, price));

        Ok(property)
    }

    /// Updates a listing's price and active flag. Only the current owner may
    /// call this; `id`, `owner`, `created_at`, and `documents` are unchanged.
    ///
    /// Setting `is_active` to false is a voluntary delist; the owner can flip
    /// it back later. A sold property never reactivates on its own, but its
    /// new owner may relist it the same way.
    ///
    /// # Errors
    /// - PropertyNotFound: unknown id
    /// - NotPropertyOwner: caller is not the current owner
    /// - InvalidPrice: new price is zero or negative
    pub fn update_property(
        env: Env,
        caller: Address,
        id: String,
        new_price: i128,
        new_is_active: bool,
    ) -> Result<Property, Error> {
        caller.require_auth();

        let mut properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        let mut property = properties.get(id.clone()).ok_or(Error::PropertyNotFound)?;

        if property.owner != caller {
            return Err(Error::NotPropertyOwner);
        }
        if new_price <= 0 {
            return Err(Error::InvalidPrice);
        }

        property.price = new_price;
        property.is_active = new_is_active;
        properties.set(id.clone(), property.clone());
        env.storage().instance().set(&PROPERTIES_KEY, &properties);

        env.events()
            .publish((PROPERTY_UPDATED, caller), (id, new_price, new_is_active));

        Ok(property)
    }

    /// Settles a purchase: the core state transition of the registry.
    ///
    /// In one indivisible operation the contract pulls the exact payment from
    /// the buyer, pays the seller the price minus the platform fee, retains
    /// the fee in its own custody, transfers ownership to the buyer,
    /// deactivates the listing, and records the purchase contract. If any
    /// step fails, none of it persists.
    ///
    /// The fee rate is read from storage at execution time, so a rate change
    /// racing with a purchase can never charge a rate that was not in effect
    /// when the transition executed.
    ///
    /// # Arguments
    /// * `buyer` - The paying party (must sign; must not be the owner)
    /// * `contract_id` - Client-supplied unique id for the purchase record
    /// * `property_id` - The listing to purchase
    /// * `payment_amount` - Must equal the listed price exactly
    ///
    /// # Errors
    /// - InvalidContractId: empty contract id
    /// - ContractIdAlreadyExists: contract id already taken
    /// - PropertyNotFound: unknown property
    /// - PropertyNotActive: sold or delisted listing
    /// - SelfPurchaseNotAllowed: buyer is the current owner
    /// - PaymentMismatch: over- or underpayment
    /// - TokenTransferFailed: either transfer leg failed; everything unwinds
    pub fn create_contract(
        env: Env,
        buyer: Address,
        contract_id: String,
        property_id: String,
        payment_amount: i128,
    ) -> Result<PurchaseContract, Error> {
        buyer.require_auth();

        if contract_id.len() == 0 {
            return Err(Error::InvalidContractId);
        }

        let mut contracts: Map<String, PurchaseContract> =
            env.storage().instance().get(&CONTRACTS_KEY).unwrap();
        if contracts.contains_key(contract_id.clone()) {
            return Err(Error::ContractIdAlreadyExists);
        }

        let mut properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        let mut property = properties
            .get(property_id.clone())
            .ok_or(Error::PropertyNotFound)?;

        if !property.is_active {
            return Err(Error::PropertyNotActive);
        }
        if buyer == property.owner {
            return Err(Error::SelfPurchaseNotAllowed);
        }
        if payment_amount != property.price {
            return Err(Error::PaymentMismatch);
        }

        // Pin the fee rate observed at execution time.
        let fee_rate: u32 = env
            .storage()
            .persistent()
            .get(&FEE_RATE_KEY)
            .unwrap_or(DEFAULT_PLATFORM_FEE);
        let fee_amount = Self::_calculate_fee(payment_amount, fee_rate);
        let seller_amount = payment_amount - fee_amount;
        let seller = property.owner.clone();

        let payment_token: Address =
            env.storage().persistent().get(&PAYMENT_TOKEN_KEY).unwrap();
        let token_client = token::Client::new(&env, &payment_token);

        // Pull the full payment into the contract, then pay the seller their
        // share. The fee share stays in the contract balance until the admin
        // withdraws it. Returning Err on a failed leg aborts the invocation,
        // which also reverses the first leg.
        match token_client.try_transfer(&buyer, &env.current_contract_address(), &payment_amount) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "payment pull of {} from buyer failed", payment_amount);
                return Err(Error::TokenTransferFailed);
            }
        }
        match token_client.try_transfer(&env.current_contract_address(), &seller, &seller_amount) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "payout of {} to seller failed", seller_amount);
                return Err(Error::TokenTransferFailed);
            }
        }

        property.owner = buyer.clone();
        property.is_active = false;
        properties.set(property_id.clone(), property);

        let purchase = PurchaseContract {
            id: contract_id.clone(),
            property_id: property_id.clone(),
            buyer: buyer.clone(),
            seller,
            value: payment_amount,
            status: ContractStatus::Created,
            settled_at: env.ledger().timestamp(),
        };

        let mut contract_ids: Vec<String> =
            env.storage().instance().get(&CONTRACT_IDS_KEY).unwrap();
        contracts.set(contract_id.clone(), purchase.clone());
        contract_ids.push_back(contract_id.clone());

        env.storage().instance().set(&PROPERTIES_KEY, &properties);
        env.storage().instance().set(&CONTRACTS_KEY, &contracts);
        env.storage().instance().set(&CONTRACT_IDS_KEY, &contract_ids);

        env.events().publish(
            (CONTRACT_CREATED, buyer),
            (contract_id, property_id, payment_amount),
        );

        Ok(purchase)
    }

    /// Updates the platform fee rate charged on settlements.
    ///
    /// # Errors
    /// - NotAdmin: caller is not the administrative principal
    /// - FeeExceedsMaximum: rate above 1000 basis points (10%)
    pub fn update_platform_fee(env: Env, caller: Address, new_fee: u32) -> Result<(), Error> {
        Self::_require_admin(&env, &caller)?;

        if new_fee > MAX_PLATFORM_FEE {
            return Err(Error::FeeExceedsMaximum);
        }

        env.storage().persistent().set(&FEE_RATE_KEY, &new_fee);
        env.events().publish((FEE_UPDATED, caller), new_fee);

        Ok(())
    }

    /// Withdraws the registry's entire accumulated fee balance to the
    /// administrator and returns the amount withdrawn.
    ///
    /// Settlements are atomic within a single invocation, so the contract's
    /// settlement-token balance is exactly the undisbursed fees.
    ///
    /// # Errors
    /// - NotAdmin: caller is not the administrative principal
    /// - NoFeesToWithdraw: the balance is zero
    /// - TokenTransferFailed: the payout transfer failed
    pub fn withdraw_platform_fees(env: Env, caller: Address) -> Result<i128, Error> {
        Self::_require_admin(&env, &caller)?;

        let payment_token: Address =
            env.storage().persistent().get(&PAYMENT_TOKEN_KEY).unwrap();
        let token_client = token::Client::new(&env, &payment_token);

        let balance = token_client.balance(&env.current_contract_address());
        if balance <= 0 {
            return Err(Error::NoFeesToWithdraw);
        }

        match token_client.try_transfer(&env.current_contract_address(), &caller, &balance) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "fee withdrawal of {} failed", balance);
                return Err(Error::TokenTransferFailed);
            }
        }

        env.events().publish((FEES_WITHDRAWN, caller), balance);

        Ok(balance)
    }

    // ================================================================================================
    // QUERY FUNCTIONS (GETTERS)
    // ================================================================================================
    // Read-only access for clients; no pagination. Callers filter further as
    // needed.

    /// Returns every property ever created, in creation order, including
    /// sold and delisted ones.
    pub fn get_all_properties(env: Env) -> Vec<Property> {
        let properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        let property_ids: Vec<String> =
            env.storage().instance().get(&PROPERTY_IDS_KEY).unwrap();

        let mut result = Vec::new(&env);
        for id in property_ids.iter() {
            result.push_back(properties.get(id).unwrap());
        }
        result
    }

    /// Returns properties currently available for purchase, in creation
    /// order. Server-side convenience over filtering `get_all_properties`.
    pub fn get_active_properties(env: Env) -> Vec<Property> {
        let properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        let property_ids: Vec<String> =
            env.storage().instance().get(&PROPERTY_IDS_KEY).unwrap();

        let mut result = Vec::new(&env);
        for id in property_ids.iter() {
            let property = properties.get(id).unwrap();
            if property.is_active {
                result.push_back(property);
            }
        }
        result
    }

    /// Returns a specific property by its id, if it exists.
    pub fn get_property(env: Env, id: String) -> Option<Property> {
        let properties: Map<String, Property> =
            env.storage().instance().get(&PROPERTIES_KEY).unwrap();
        properties.get(id)
    }

    /// Returns a specific purchase contract by its id, if it exists.
    pub fn get_contract(env: Env, id: String) -> Option<PurchaseContract> {
        let contracts: Map<String, PurchaseContract> =
            env.storage().instance().get(&CONTRACTS_KEY).unwrap();
        contracts.get(id)
    }

    /// Returns every purchase contract, in settlement order.
    pub fn get_all_contracts(env: Env) -> Vec<PurchaseContract> {
        let contracts: Map<String, PurchaseContract> =
            env.storage().instance().get(&CONTRACTS_KEY).unwrap();
        let contract_ids: Vec<String> =
            env.storage().instance().get(&CONTRACT_IDS_KEY).unwrap();

        let mut result = Vec::new(&env);
        for id in contract_ids.iter() {
            result.push_back(contracts.get(id).unwrap());
        }
        result
    }

    /// Returns the purchase contracts where `seller` was the selling party,
    /// in settlement order. Lets clients derive "sold by me" history from
    /// authoritative records instead of a local cache.
    pub fn get_contracts_by_seller(env: Env, seller: Address) -> Vec<PurchaseContract> {
        let contracts: Map<String, PurchaseContract> =
            env.storage().instance().get(&CONTRACTS_KEY).unwrap();
        let contract_ids: Vec<String> =
            env.storage().instance().get(&CONTRACT_IDS_KEY).unwrap();

        let mut result = Vec::new(&env);
        for id in contract_ids.iter() {
            let purchase = contracts.get(id).unwrap();
            if purchase.seller == seller {
                result.push_back(purchase);
            }
        }
        result
    }

    /// Returns the purchase contracts where `buyer` was the paying party, in
    /// settlement order.
    pub fn get_contracts_by_buyer(env: Env, buyer: Address) -> Vec<PurchaseContract> {
        let contracts: Map<String, PurchaseContract> =
            env.storage().instance().get(&CONTRACTS_KEY).unwrap();
        let contract_ids: Vec<String> =
            env.storage().instance().get(&CONTRACT_IDS_KEY).unwrap();

        let mut result = Vec::new(&env);
        for id in contract_ids.iter() {
            let purchase = contracts.get(id).unwrap();
            if purchase.buyer == buyer {
                result.push_back(purchase);
            }
        }
        result
    }

    /// Returns the administrative principal.
    pub fn get_admin(env: Env) -> Address {
        env.storage().persistent().get(&ADMIN_KEY).unwrap()
    }

    /// Returns the settlement token contract address.
    pub fn get_payment_token(env: Env) -> Address {
        env.storage().persistent().get(&PAYMENT_TOKEN_KEY).unwrap()
    }

    /// Returns the current platform fee rate in basis points
    /// (25 = 0.25%, 1000 = 10%).
    pub fn get_platform_fee(env: Env) -> u32 {
        env.storage()
            .persistent()
            .get(&FEE_RATE_KEY)
            .unwrap_or(DEFAULT_PLATFORM_FEE)
    }

    /// Returns the undisbursed fee balance currently held by the registry.
    pub fn get_collected_fees(env: Env) -> i128 {
        let payment_token: Address =
            env.storage().persistent().get(&PAYMENT_TOKEN_KEY).unwrap();
        token::Client::new(&env, &payment_token).balance(&env.current_contract_address())
    }
}
