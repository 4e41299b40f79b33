/// SAFE ledger: Engine
///
/// Top-level orchestrator. Owns the ledger state and the event log,
/// delegates mutation to transitions and validates via invariants.
///
/// Every operation goes through `execute`: apply against a copy, check,
/// then commit state and event together.

use log::{debug, warn};

use crate::access::Capabilities;
use crate::config::LedgerConfig;
use crate::domain::{Account, CollateralTag, CollateralType, LedgerState, Safe};
use crate::error::LedgerError;
use crate::events::{EventEnvelope, LedgerEvent, Operation};
use crate::hashing::canonical_hash;
use crate::invariants::validate_invariants;
use crate::state::create_initial_state;
use crate::transitions::apply_operation;
use crate::units::{Rad, Raw, RayDelta, Wad, WadDelta};

/// Stateful engine wrapping the pure transition layer.
#[derive(Debug, Clone)]
pub struct SafeEngine {
    state: LedgerState,
    config: LedgerConfig,
    events: Vec<EventEnvelope>,
    sequence: u64,
}

impl SafeEngine {
    /// Fresh enabled ledger; `deployer` holds the capability.
    pub fn new(config: LedgerConfig, deployer: &Account) -> Self {
        let state = create_initial_state(&config, deployer);
        Self {
            state,
            config,
            events: Vec::new(),
            sequence: 0,
        }
    }

    /// Resume from a restored state whose last committed operation was
    /// `sequence`. The state must pass the accounting invariants.
    pub fn from_state(
        state: LedgerState,
        config: LedgerConfig,
        sequence: u64,
    ) -> Result<Self, LedgerError> {
        validate_invariants(&state)?;
        Ok(Self {
            state,
            config,
            events: Vec::new(),
            sequence,
        })
    }

    /// Apply one operation on behalf of `caller`. On success the new state
    /// is committed and the event appended; on failure nothing changes.
    pub fn execute(
        &mut self,
        caller: &Account,
        operation: &Operation,
    ) -> Result<&EventEnvelope, LedgerError> {
        let (next, event) = match self.stage(caller, operation) {
            Ok(staged) => staged,
            Err(err) => {
                warn!(
                    "{} by {} rejected [{}]: {}",
                    operation.kind(),
                    caller,
                    err.rule(),
                    err
                );
                return Err(err);
            }
        };

        self.state = next;
        self.sequence += 1;
        debug!("#{} {} by {} committed", self.sequence, operation.kind(), caller);

        let index = self.events.len();
        self.events.push(EventEnvelope {
            sequence: self.sequence,
            caller: caller.clone(),
            event,
        });
        Ok(&self.events[index])
    }

    fn stage(
        &self,
        caller: &Account,
        operation: &Operation,
    ) -> Result<(LedgerState, LedgerEvent), LedgerError> {
        let (next, event) = apply_operation(&self.state, caller, operation)?;
        if self.config.check_invariants {
            validate_invariants(&next)?;
        }
        Ok((next, event))
    }

    // ── Capability table ─────────────────────────────────────────────

    pub fn grant_capability(
        &mut self,
        caller: &Account,
        account: &Account,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::GrantCapability { account: account.clone() })
    }

    pub fn revoke_capability(
        &mut self,
        caller: &Account,
        account: &Account,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::RevokeCapability { account: account.clone() })
    }

    /// Let `delegate` act on the caller's positions and balances.
    pub fn approve_consent(
        &mut self,
        caller: &Account,
        delegate: &Account,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::ApproveConsent { delegate: delegate.clone() })
    }

    pub fn deny_consent(
        &mut self,
        caller: &Account,
        delegate: &Account,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::DenyConsent { delegate: delegate.clone() })
    }

    // ── Registry and lifecycle ───────────────────────────────────────

    pub fn initialize_type(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::InitializeType { collateral_type: collateral_type.clone() },
        )
    }

    /// Set `globalDebtCeiling` (rad) or `safeDebtCeiling` (wad).
    pub fn set_parameter(
        &mut self,
        caller: &Account,
        parameter: &str,
        value: Raw,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::SetParameter { parameter: parameter.to_string(), value },
        )
    }

    pub fn set_type_parameter(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        parameter: &str,
        value: Raw,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::SetTypeParameter {
                collateral_type: collateral_type.clone(),
                parameter: parameter.to_string(),
                value,
            },
        )
    }

    pub fn disable(&mut self, caller: &Account) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::Disable)
    }

    // ── Balances ─────────────────────────────────────────────────────

    pub fn credit_collateral(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        account: &Account,
        delta: WadDelta,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::CreditCollateral {
                collateral_type: collateral_type.clone(),
                account: account.clone(),
                delta,
            },
        )
    }

    pub fn transfer_collateral(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        src: &Account,
        dst: &Account,
        amount: Wad,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::TransferCollateral {
                collateral_type: collateral_type.clone(),
                src: src.clone(),
                dst: dst.clone(),
                amount,
            },
        )
    }

    pub fn transfer_coin(
        &mut self,
        caller: &Account,
        src: &Account,
        dst: &Account,
        amount: Rad,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::TransferCoin { src: src.clone(), dst: dst.clone(), amount },
        )
    }

    /// Burn `amount` of the caller's coin against the same amount of its
    /// unbacked debt.
    pub fn settle_debt(&mut self, caller: &Account, amount: Rad) -> Result<&EventEnvelope, LedgerError> {
        self.execute(caller, &Operation::SettleDebt { amount })
    }

    pub fn create_unbacked_debt(
        &mut self,
        caller: &Account,
        debt_destination: &Account,
        coin_destination: &Account,
        amount: Rad,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::CreateUnbackedDebt {
                debt_destination: debt_destination.clone(),
                coin_destination: coin_destination.clone(),
                amount,
            },
        )
    }

    // ── Positions ────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn modify_position(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        owner: &Account,
        collateral_source: &Account,
        debt_destination: &Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::ModifyPosition {
                collateral_type: collateral_type.clone(),
                owner: owner.clone(),
                collateral_source: collateral_source.clone(),
                debt_destination: debt_destination.clone(),
                delta_collateral,
                delta_debt,
            },
        )
    }

    pub fn transfer_position(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        src: &Account,
        dst: &Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::TransferPosition {
                collateral_type: collateral_type.clone(),
                src: src.clone(),
                dst: dst.clone(),
                delta_collateral,
                delta_debt,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn confiscate_position(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        owner: &Account,
        collateral_counterparty: &Account,
        debt_counterparty: &Account,
        delta_collateral: WadDelta,
        delta_debt: WadDelta,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::ConfiscatePosition {
                collateral_type: collateral_type.clone(),
                owner: owner.clone(),
                collateral_counterparty: collateral_counterparty.clone(),
                debt_counterparty: debt_counterparty.clone(),
                delta_collateral,
                delta_debt,
            },
        )
    }

    // ── Rates ────────────────────────────────────────────────────────

    pub fn accrue_rate(
        &mut self,
        caller: &Account,
        collateral_type: &CollateralTag,
        surplus_destination: &Account,
        rate_delta: RayDelta,
    ) -> Result<&EventEnvelope, LedgerError> {
        self.execute(
            caller,
            &Operation::AccrueRate {
                collateral_type: collateral_type.clone(),
                surplus_destination: surplus_destination.clone(),
                rate_delta,
            },
        )
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Sequence number of the last committed operation (0 before any).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Events committed since construction or the last drain.
    pub fn events(&self) -> &[EventEnvelope] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventEnvelope> {
        std::mem::take(&mut self.events)
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.state.capabilities
    }

    pub fn can_act(&self, owner: &Account, caller: &Account) -> bool {
        self.state.capabilities.can_act(owner, caller)
    }

    pub fn is_authorized(&self, account: &Account) -> bool {
        self.state.capabilities.is_authorized(account)
    }

    pub fn is_enabled(&self) -> bool {
        self.state.contract_enabled
    }

    pub fn collateral_type(&self, collateral_type: &CollateralTag) -> CollateralType {
        self.state.collateral_type(collateral_type)
    }

    pub fn safe(&self, collateral_type: &CollateralTag, owner: &Account) -> Safe {
        self.state.safe(collateral_type, owner)
    }

    pub fn token_collateral(&self, collateral_type: &CollateralTag, account: &Account) -> Wad {
        self.state.token_collateral(collateral_type, account)
    }

    pub fn coin_balance(&self, account: &Account) -> Rad {
        self.state.coin_balance(account)
    }

    pub fn debt_balance(&self, account: &Account) -> Rad {
        self.state.debt_balance(account)
    }

    pub fn global_debt(&self) -> Rad {
        self.state.global_debt
    }

    pub fn global_unbacked_debt(&self) -> Rad {
        self.state.global_unbacked_debt
    }

    pub fn global_debt_ceiling(&self) -> Rad {
        self.state.global_debt_ceiling
    }

    pub fn safe_debt_ceiling(&self) -> Wad {
        self.state.safe_debt_ceiling
    }

    /// SHA-256 of the canonical serialization of the current state.
    pub fn canonical_hash(&self) -> Result<String, serde_json::Error> {
        canonical_hash(&self.state)
    }
}
