//! Core contract implementation for the binary prediction market.

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Bytes, Env};

use crate::errors::ContractError;
use crate::types::{BetRecord, DataKey};

/// One-time faucet amount: 1000 tokens at 7 decimal places
pub const INITIAL_MINT: i128 = 1000_0000000;

/// Salt plus one ABI word
pub const PAYLOAD_LEN: u32 = 64;

#[contract]
pub struct PredictionMarket;

#[contractimpl]
impl PredictionMarket {
    /// Initializes the contract with admin and oracle addresses (one-time only)
    pub fn initialize(env: Env, admin: Address, oracle: Address) -> Result<(), ContractError> {
        admin.require_auth();

        if env.storage().persistent().has(&DataKey::Admin) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().persistent().set(&DataKey::Admin, &admin);
        env.storage().persistent().set(&DataKey::Oracle, &oracle);

        Ok(())
    }

    pub fn is_resolved(env: Env) -> bool {
        env.storage().persistent().get(&DataKey::Resolved).unwrap_or(false)
    }

    pub fn outcome(env: Env) -> bool {
        env.storage().persistent().get(&DataKey::Outcome).unwrap_or(false)
    }

    /// Sum of every stake placed so far, in smallest units
    pub fn total_pool(env: Env) -> i128 {
        env.storage().persistent().get(&DataKey::TotalPool).unwrap_or(0)
    }

    pub fn get_oracle_address(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .persistent()
            .get(&DataKey::Oracle)
            .ok_or(ContractError::OracleNotSet)
    }

    pub fn get_admin(env: Env) -> Option<Address> {
        env.storage().persistent().get(&DataKey::Admin)
    }

    pub fn get_bet(env: Env, user: Address) -> Option<BetRecord> {
        env.storage().persistent().get(&DataKey::Bet(user))
    }

    /// Places a bet; `amount` is the value attached to the call
    pub fn place_bet(
        env: Env,
        user: Address,
        payload: Bytes,
        amount: i128,
    ) -> Result<(), ContractError> {
        user.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidBetAmount);
        }

        if payload.len() != PAYLOAD_LEN {
            return Err(ContractError::InvalidPayload);
        }

        if Self::is_resolved(env.clone()) {
            return Err(ContractError::MarketResolved);
        }

        let user_balance = Self::balance(env.clone(), user.clone());
        if user_balance < amount {
            return Err(ContractError::InsufficientBalance);
        }

        let bet_key = DataKey::Bet(user.clone());
        if env.storage().persistent().has(&bet_key) {
            return Err(ContractError::AlreadyBet);
        }

        let new_balance = user_balance
            .checked_sub(amount)
            .ok_or(ContractError::Overflow)?;
        let new_pool = Self::total_pool(env.clone())
            .checked_add(amount)
            .ok_or(ContractError::Overflow)?;

        Self::_set_balance(&env, user.clone(), new_balance);
        env.storage().persistent().set(&bet_key, &BetRecord { amount, payload });
        env.storage().persistent().set(&DataKey::TotalPool, &new_pool);

        env.events().publish((symbol_short!("BetPlaced"), user), amount);

        Ok(())
    }

    /// Fixes the final outcome (oracle only, once)
    pub fn resolve(env: Env, caller: Address, outcome: bool) -> Result<(), ContractError> {
        caller.require_auth();

        let oracle = Self::get_oracle_address(env.clone())?;
        if caller != oracle {
            return Err(ContractError::UnauthorizedOracle);
        }

        if Self::is_resolved(env.clone()) {
            return Err(ContractError::MarketResolved);
        }

        env.storage().persistent().set(&DataKey::Resolved, &true);
        env.storage().persistent().set(&DataKey::Outcome, &outcome);

        env.events().publish((symbol_short!("Resolved"),), outcome);

        Ok(())
    }

    /// Mints 1000 tokens for new users (one-time only)
    pub fn mint_initial(env: Env, user: Address) -> i128 {
        user.require_auth();

        let key = DataKey::Balance(user.clone());

        if let Some(existing_balance) = env.storage().persistent().get(&key) {
            return existing_balance;
        }

        env.storage().persistent().set(&key, &INITIAL_MINT);

        INITIAL_MINT
    }

    /// Returns user's token balance
    pub fn balance(env: Env, user: Address) -> i128 {
        let key = DataKey::Balance(user);
        env.storage().persistent().get(&key).unwrap_or(0)
    }

    pub(crate) fn _set_balance(env: &Env, user: Address, amount: i128) {
        let key = DataKey::Balance(user);
        env.storage().persistent().set(&key, &amount);
    }
}
