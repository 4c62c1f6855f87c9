use concordium_std::*;
pub use sale_utils::{
    error::{ContractError, ContractResult, CustomContractError},
    types::*,
};
use sale_utils::{MICRO_CCD, TIER_COUNT};
// Disambiguate the crate's `ExchangeRate` (u64 alias) from the `ExchangeRate`
// struct now exported by `concordium_std::*`.
use sale_utils::types::ExchangeRate;

/// The contract state
#[derive(Debug, Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Owner and sale beneficiary; their balance is the sellable pool
    pub(crate) owner: AccountAddress,
    /// Oracle contract trusted to deliver exchange-rate callbacks
    pub(crate) oracle: ContractAddress,
    /// Cents per CCD; zero until the first callback lands, and all
    /// sale processing is refused while it is zero
    pub(crate) exchange_rate: ExchangeRate,
    /// Tokens issued at construction minus everything burned since
    pub(crate) total_supply: ContractTokenAmount,
    /// Pricing tiers, consumed cheapest-first
    pub(crate) pricing: TierPricing,
    /// Per-holder balances
    pub(crate) balances: StateMap<Address, ContractTokenAmount, S>,
    /// Iteration hint: appended whenever a zero-balance holder receives
    /// tokens. An address can appear more than once; consumers skip
    /// entries whose balance is already zero.
    pub(crate) holders: Vec<Address>,
}

/// What a single processed payment bought.
#[derive(Debug, PartialEq, Eq)]
pub struct PurchaseOutcome {
    /// Tokens credited to the payer
    pub(crate) tokens: ContractTokenAmount,
    /// Payment share forwarded to the owner
    pub(crate) cost: Amount,
    /// Unspendable remainder returned to the payer
    pub(crate) refund: Amount,
}

impl<S: HasStateApi> State<S> {
    pub(crate) fn new(
        state_builder: &mut StateBuilder<S>,
        owner: AccountAddress,
        oracle: ContractAddress,
        pricing: TierPricing,
        total_supply: ContractTokenAmount,
    ) -> Self {
        let mut balances = state_builder.new_map();
        balances.insert(Address::Account(owner), total_supply);

        State {
            owner,
            oracle,
            exchange_rate: 0,
            total_supply,
            pricing,
            balances,
            holders: vec![Address::Account(owner)],
        }
    }

    pub(crate) fn balance_of(&self, holder: &Address) -> ContractTokenAmount {
        self.balances
            .get(holder)
            .map(|v| *v)
            .unwrap_or_else(|| 0u64.into())
    }

    /// Move tokens between two ledger entries. The receiver is appended
    /// to the holder index when its balance was zero before the credit.
    pub(crate) fn transfer_tokens(
        &mut self,
        from: &Address,
        to: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        let from_balance = self.balance_of(from);
        ensure!(from_balance >= amount, ContractError::InsufficientFunds);
        self.balances
            .insert(*from, (from_balance.0 - amount.0).into());

        let to_balance = self.balance_of(to);
        let credited = to_balance
            .0
            .checked_add(amount.0)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;
        if to_balance.0 == 0 && amount.0 > 0 {
            self.holders.push(*to);
        }
        self.balances.insert(*to, credited.into());

        Ok(())
    }

    /// Remove tokens from a holder and from the total supply.
    pub(crate) fn burn_tokens(
        &mut self,
        holder: &Address,
        amount: ContractTokenAmount,
    ) -> ContractResult<()> {
        let balance = self.balance_of(holder);
        ensure!(balance >= amount, ContractError::InsufficientFunds);
        self.balances.insert(*holder, (balance.0 - amount.0).into());
        self.total_supply = (self.total_supply.0 - amount.0).into();
        Ok(())
    }

    /// Drain a holder's entire balance, returning what was held.
    pub(crate) fn zero_balance(&mut self, holder: &Address) -> ContractTokenAmount {
        let balance = self.balance_of(holder);
        if balance.0 > 0 {
            self.balances.insert(*holder, 0u64.into());
        }
        balance
    }

    /// Convert a payment to cents at the current rate, walk the tiers,
    /// and move the purchased tokens from the owner's pool to the buyer.
    /// Only internal state is touched here; the caller moves the funds.
    pub(crate) fn process_purchase(
        &mut self,
        buyer: &Address,
        paid: Amount,
    ) -> ContractResult<PurchaseOutcome> {
        ensure!(
            self.exchange_rate != 0,
            CustomContractError::RateUninitialized.into()
        );
        let rate = self.exchange_rate;

        // cents = microCCD * rate / 10^6, floored; the sub-cent
        // remainder is absorbed, not refunded
        let total_cents: u128 = (paid.micro_ccd as u128)
            .checked_mul(rate as u128)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?
            / MICRO_CCD as u128;
        ensure!(
            total_cents <= u64::MAX as u128,
            CustomContractError::OverflowError.into()
        );

        let owner_addr = Address::Account(self.owner);
        let pool = self.balance_of(&owner_addr);
        let (tokens, cost_cents) = self.pricing.consume(total_cents as UsdCents, pool.0);
        ensure!(tokens > 0, CustomContractError::NothingPurchasable.into());

        // back to microCCD, floored in this direction as well
        let cost_micro = (cost_cents as u128) * (MICRO_CCD as u128) / (rate as u128);
        let cost = Amount::from_micro_ccd(cost_micro as u64);
        let refund = Amount::from_micro_ccd(paid.micro_ccd - cost.micro_ccd);

        let tokens = ContractTokenAmount::from(tokens);
        self.transfer_tokens(&owner_addr, buyer, tokens)?;

        Ok(PurchaseOutcome {
            tokens,
            cost,
            refund,
        })
    }
}

/// One sale tier with its consumption counter.
#[derive(Debug, Serialize, SchemaType, Clone)]
#[cfg_attr(any(feature = "wasm-test", test), derive(PartialEq))]
pub struct Tier {
    /// Number of tokens sellable at this price
    pub(crate) limit: u64,
    /// Number already sold; never exceeds `limit`
    pub(crate) sold: u64,
    /// Unit price in cents, fixed at construction
    pub(crate) price: UsdCents,
}

/// The ordered tier table. Strictly ascending prices, consumed front to
/// back for every payment with no backtracking into cheaper tiers.
#[derive(Debug, Serialize, SchemaType, Clone)]
#[cfg_attr(any(feature = "wasm-test", test), derive(PartialEq))]
pub struct TierPricing {
    pub(crate) tiers: Vec<Tier>,
}

impl TierPricing {
    pub(crate) fn new(params: Vec<TierParam>) -> Result<Self, CustomContractError> {
        ensure!(
            params.len() == TIER_COUNT,
            CustomContractError::InvalidTierConfig
        );

        let mut tiers = Vec::with_capacity(TIER_COUNT);
        let mut last_price: UsdCents = 0;
        for TierParam { limit, price } in params {
            ensure!(limit > 0, CustomContractError::InvalidTierConfig);
            ensure!(price > last_price, CustomContractError::InvalidTierConfig);
            // full tier capacity in cents must stay representable
            ensure!(
                limit.checked_mul(price).is_some(),
                CustomContractError::OverflowError
            );
            last_price = price;
            tiers.push(Tier {
                limit,
                sold: 0,
                price,
            });
        }

        Ok(TierPricing { tiers })
    }

    /// Spend up to `total_cents` against the tiers in order, bounded by
    /// `pool` tokens actually available to sell. Returns the tokens
    /// bought and the cents actually spent; the difference to
    /// `total_cents` is the caller's refund. A tier too expensive for
    /// the remainder is skipped, never revisited.
    pub(crate) fn consume(&mut self, total_cents: UsdCents, pool: u64) -> (u64, UsdCents) {
        let mut remaining = total_cents as u128;
        let mut tokens: u64 = 0;
        let mut cost: u128 = 0;

        for tier in self.tiers.iter_mut() {
            if remaining == 0 || tokens == pool {
                break;
            }
            let price = tier.price as u128;
            let capacity = ((tier.limit - tier.sold) as u128) * price;
            let spendable = cmp::min(capacity, remaining);
            let affordable = (spendable / price) as u64;
            let here = cmp::min(affordable, pool - tokens);
            if here == 0 {
                continue;
            }
            tier.sold += here;
            tokens += here;
            let spent = here as u128 * price;
            cost += spent;
            remaining -= spent;
        }

        (tokens, cost as UsdCents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concordium_std::test_infrastructure::*;

    const OWNER_ACC: AccountAddress = AccountAddress([0u8; 32]);
    const OWNER_ADDR: Address = Address::Account(OWNER_ACC);
    const ORACLE: ContractAddress = ContractAddress {
        index: 42,
        subindex: 0,
    };
    const USER1_ADDR: Address = Address::Account(AccountAddress([10u8; 32]));
    const USER2_ADDR: Address = Address::Account(AccountAddress([11u8; 32]));

    fn tier_params() -> Vec<TierParam> {
        vec![
            TierParam {
                limit: 1_000_000,
                price: 28,
            },
            TierParam {
                limit: 2_000_000,
                price: 30,
            },
            TierParam {
                limit: 3_000_000,
                price: 32,
            },
        ]
    }

    fn initial_state<S: HasStateApi>(state_builder: &mut StateBuilder<S>) -> State<S> {
        let pricing = TierPricing::new(tier_params()).unwrap_abort();
        State::new(state_builder, OWNER_ACC, ORACLE, pricing, 6_000_000.into())
    }

    fn balances_total<S: HasStateApi>(state: &State<S>) -> u64 {
        state.balances.iter().map(|(_, v)| v.0).sum()
    }

    #[test]
    fn test_tier_config_rejected() {
        let two = tier_params().into_iter().take(2).collect();
        assert_eq!(
            TierPricing::new(two).expect_err_report("two tiers should not pass"),
            CustomContractError::InvalidTierConfig
        );

        let mut descending = tier_params();
        descending[2].price = 29;
        assert_eq!(
            TierPricing::new(descending).expect_err_report("prices must ascend"),
            CustomContractError::InvalidTierConfig
        );

        let mut huge = tier_params();
        huge[0].limit = u64::MAX;
        assert_eq!(
            TierPricing::new(huge).expect_err_report("capacity must fit"),
            CustomContractError::OverflowError
        );
    }

    #[test]
    fn test_consume_single_tier() {
        let mut pricing = TierPricing::new(tier_params()).unwrap();
        let (tokens, cost) = pricing.consume(2_800, 6_000_000);
        assert_eq!((tokens, cost), (100, 2_800));
        assert_eq!(pricing.tiers[0].sold, 100);
        assert_eq!(pricing.tiers[1].sold, 0);
    }

    #[test]
    fn test_consume_spans_tiers() {
        // 28_000_090 cents: the whole of tier 1 plus 90 cents, which
        // buys exactly three tokens at tier 2's price
        let mut pricing = TierPricing::new(tier_params()).unwrap();
        let (tokens, cost) = pricing.consume(28_000_090, 6_000_000);
        assert_eq!((tokens, cost), (1_000_003, 28_000_090));
        assert_eq!(pricing.tiers[0].sold, 1_000_000);
        assert_eq!(pricing.tiers[1].sold, 3);
        assert_eq!(pricing.tiers[2].sold, 0);
    }

    #[test]
    fn test_consume_remainder_below_next_price() {
        // 999_999 tokens left at tier 1; 28_000_001 cents buys them all
        // and the 29 cents left cannot afford a single tier-2 token
        let mut pricing = TierPricing::new(tier_params()).unwrap();
        pricing.tiers[0].sold = 1;
        let (tokens, cost) = pricing.consume(28_000_001, 6_000_000);
        assert_eq!(tokens, 999_999);
        assert_eq!(cost, 27_999_972);
        assert_eq!(pricing.tiers[0].sold, 1_000_000);
        assert_eq!(pricing.tiers[1].sold, 0);
    }

    #[test]
    fn test_consume_bounded_by_pool() {
        let mut pricing = TierPricing::new(tier_params()).unwrap();
        let (tokens, cost) = pricing.consume(2_800, 10);
        assert_eq!((tokens, cost), (10, 280));
        assert_eq!(pricing.tiers[0].sold, 10);
    }

    #[test]
    fn test_consume_sold_never_exceeds_limit() {
        let mut pricing = TierPricing::new(tier_params()).unwrap();
        // far more cents than all three tiers together can absorb
        let all_capacity: u64 = 1_000_000 * 28 + 2_000_000 * 30 + 3_000_000 * 32;
        let (tokens, cost) = pricing.consume(all_capacity + 1_000_000, u64::MAX);
        assert_eq!(tokens, 6_000_000);
        assert_eq!(cost, all_capacity);
        for tier in &pricing.tiers {
            assert_eq!(tier.sold, tier.limit);
        }
    }

    #[test]
    fn test_transfer_and_conservation() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);

        state
            .transfer_tokens(&OWNER_ADDR, &USER1_ADDR, 500.into())
            .unwrap();
        state
            .transfer_tokens(&USER1_ADDR, &USER2_ADDR, 200.into())
            .unwrap();

        assert_eq!(state.balance_of(&USER1_ADDR), 300.into());
        assert_eq!(state.balance_of(&USER2_ADDR), 200.into());
        assert_eq!(state.balance_of(&OWNER_ADDR), (6_000_000 - 500).into());
        assert_eq!(balances_total(&state), state.total_supply.0);
    }

    #[test]
    fn test_transfer_insufficient() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);

        assert_eq!(
            state.transfer_tokens(&USER1_ADDR, &USER2_ADDR, 1.into()),
            Err(ContractError::InsufficientFunds)
        );
        assert_eq!(balances_total(&state), state.total_supply.0);
    }

    #[test]
    fn test_holder_index_records_returning_holder_twice() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);

        state
            .transfer_tokens(&OWNER_ADDR, &USER1_ADDR, 500.into())
            .unwrap();
        state
            .transfer_tokens(&USER1_ADDR, &OWNER_ADDR, 500.into())
            .unwrap();
        state
            .transfer_tokens(&OWNER_ADDR, &USER1_ADDR, 200.into())
            .unwrap();

        let user1_entries = state.holders.iter().filter(|a| **a == USER1_ADDR).count();
        assert_eq!(user1_entries, 2);
        assert_eq!(state.balance_of(&USER1_ADDR), 200.into());
    }

    #[test]
    fn test_burn_exact_balance_then_fail() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .transfer_tokens(&OWNER_ADDR, &USER1_ADDR, 500.into())
            .unwrap();

        state.burn_tokens(&USER1_ADDR, 500.into()).unwrap();
        assert_eq!(state.balance_of(&USER1_ADDR), 0.into());
        assert_eq!(state.total_supply, (6_000_000 - 500).into());
        assert_eq!(balances_total(&state), state.total_supply.0);

        assert_eq!(
            state.burn_tokens(&USER1_ADDR, 1.into()),
            Err(ContractError::InsufficientFunds)
        );
    }

    #[test]
    fn test_purchase_requires_rate() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);

        assert_eq!(
            state.process_purchase(&USER1_ADDR, Amount::from_ccd(10)),
            Err(CustomContractError::RateUninitialized.into())
        );
        assert_eq!(state.balance_of(&USER1_ADDR), 0.into());
        assert_eq!(state.pricing.tiers[0].sold, 0);
    }

    #[test]
    fn test_purchase_hundred_tokens() {
        // rate 300 cents per CCD; 9_333_334 microCCD converts to
        // exactly 2_800 cents and buys 100 tier-1 tokens
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;

        let outcome = state
            .process_purchase(&USER1_ADDR, Amount::from_micro_ccd(9_333_334))
            .unwrap();
        assert_eq!(outcome.tokens, 100.into());
        assert_eq!(outcome.cost, Amount::from_micro_ccd(9_333_333));
        assert_eq!(outcome.refund, Amount::from_micro_ccd(1));

        assert_eq!(state.pricing.tiers[0].sold, 100);
        assert_eq!(state.balance_of(&USER1_ADDR), 100.into());
        assert_eq!(balances_total(&state), state.total_supply.0);
    }

    #[test]
    fn test_purchase_nothing_purchasable() {
        // 10_000 microCCD at rate 300 is 3 cents, below every tier price
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;

        assert_eq!(
            state.process_purchase(&USER1_ADDR, Amount::from_micro_ccd(10_000)),
            Err(CustomContractError::NothingPurchasable.into())
        );
        assert_eq!(state.pricing.tiers[0].sold, 0);
        assert_eq!(state.balance_of(&USER1_ADDR), 0.into());
    }

    #[test]
    fn test_purchase_refund_covers_unspent_remainder() {
        // 999_999 tier-1 tokens left; converted value is 28_000_001
        // cents, of which 27_999_972 are spendable; everything beyond
        // the floored microCCD cost comes back
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;
        state.pricing.tiers[0].sold = 1;

        let paid = Amount::from_micro_ccd(93_333_336_667);
        let outcome = state.process_purchase(&USER1_ADDR, paid).unwrap();
        assert_eq!(outcome.tokens, 999_999.into());
        assert_eq!(outcome.cost, Amount::from_micro_ccd(93_333_240_000));
        assert_eq!(outcome.refund, Amount::from_micro_ccd(96_667));
        assert_eq!(
            paid.micro_ccd,
            outcome.cost.micro_ccd + outcome.refund.micro_ccd
        );
        assert_eq!(state.pricing.tiers[1].sold, 0);
    }

    #[test]
    fn test_purchase_bounded_by_owner_pool() {
        let mut state_builder = TestStateBuilder::new();
        let pricing = TierPricing::new(tier_params()).unwrap_abort();
        // pool far smaller than the nominal tier limits
        let mut state = State::new(&mut state_builder, OWNER_ACC, ORACLE, pricing, 50.into());
        state.exchange_rate = 300;

        let outcome = state
            .process_purchase(&USER1_ADDR, Amount::from_micro_ccd(9_333_334))
            .unwrap();
        assert_eq!(outcome.tokens, 50.into());
        assert_eq!(state.balance_of(&OWNER_ADDR), 0.into());
        assert_eq!(state.pricing.tiers[0].sold, 50);
    }
}
