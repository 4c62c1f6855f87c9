use super::*;

#[concordium_cfg_test]
mod tests {
    use super::*;

    /// A payment before the first oracle callback must bounce whole:
    /// no tokens, no tier movement, no outgoing funds.
    #[concordium_test]
    fn test_buy_rejected_without_rate() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let paid = Amount::from_ccd(10);
        host.set_self_balance(paid);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, paid);
        claim_eq!(ret, Err(CustomContractError::RateUninitialized.into()));
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 0.into());
        claim_eq!(host.state().pricing.tiers[0].sold, 0);
        claim_eq!(host.get_transfers().len(), 0, "no funds may move");
    }

    #[concordium_test]
    fn test_buy_rejects_contract_sender() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;
        let mut host = TestHost::new(state, state_builder);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(ICO_ADDR));

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, Amount::from_ccd(10));
        claim_eq!(ret, Err(CustomContractError::AccountOnly.into()));
    }

    /// 9_333_334 microCCD at 300 cents per CCD converts to exactly
    /// 2_800 cents: one hundred tier-1 tokens, one microCCD back.
    #[concordium_test]
    fn test_buy_hundred_tokens() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;
        let mut host = TestHost::new(state, state_builder);

        let paid = Amount::from_micro_ccd(9_333_334);
        host.set_self_balance(paid);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, paid);
        claim!(ret.is_ok(), "buy should succeed");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 100.into());
        claim_eq!(host.state().balance_of(&OWNER_ADDR), (6_000_000 - 100).into());
        claim_eq!(host.state().pricing.tiers[0].sold, 100);
        claim_eq!(
            host.get_transfers(),
            [
                (OWNER_ACC, Amount::from_micro_ccd(9_333_333)),
                (BUYER1_ACC, Amount::from_micro_ccd(1)),
            ],
            "proceeds to the owner first, then the refund"
        );
    }

    /// A payment crossing the first tier boundary pays 28 cents for the
    /// tier-1 portion and 30 cents only for the overflow.
    #[concordium_test]
    fn test_buy_spans_two_tiers() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 100;
        let mut host = TestHost::new(state, state_builder);

        // 28_000_090 cents: all of tier 1 plus three tier-2 tokens
        let paid = Amount::from_micro_ccd(280_000_900_000);
        host.set_self_balance(paid);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, paid);
        claim!(ret.is_ok(), "buy should succeed");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 1_000_003.into());
        claim_eq!(host.state().pricing.tiers[0].sold, 1_000_000);
        claim_eq!(host.state().pricing.tiers[1].sold, 3);
        claim_eq!(host.state().pricing.tiers[2].sold, 0);
        claim_eq!(
            host.get_transfers(),
            [(OWNER_ACC, paid)],
            "an exactly spent payment leaves no refund"
        );
    }

    /// With 999_999 tier-1 tokens left and 29 cents short of a tier-2
    /// token, the excess must come back in full.
    #[concordium_test]
    fn test_buy_refunds_unspendable_remainder() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;
        state.pricing.tiers[0].sold = 1;
        let mut host = TestHost::new(state, state_builder);

        let paid = Amount::from_micro_ccd(93_333_336_667);
        host.set_self_balance(paid);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, paid);
        claim!(ret.is_ok(), "buy should succeed");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 999_999.into());
        claim_eq!(host.state().pricing.tiers[0].sold, 1_000_000);
        claim_eq!(host.state().pricing.tiers[1].sold, 0, "29 cents buy nothing at 30");
        claim_eq!(
            host.get_transfers(),
            [
                (OWNER_ACC, Amount::from_micro_ccd(93_333_240_000)),
                (BUYER1_ACC, Amount::from_micro_ccd(96_667)),
            ]
        );
    }

    #[concordium_test]
    fn test_buy_nothing_purchasable() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state.exchange_rate = 300;
        let mut host = TestHost::new(state, state_builder);

        // three cents cannot afford a 28-cent token
        let paid = Amount::from_micro_ccd(10_000);
        host.set_self_balance(paid);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);

        let ret: ContractResult<()> = contract_buy(&ctx, &mut host, paid);
        claim_eq!(ret, Err(CustomContractError::NothingPurchasable.into()));
        claim_eq!(host.state().balance_of(&OWNER_ADDR), 6_000_000.into());
        claim_eq!(host.get_transfers().len(), 0);
    }

    #[concordium_test]
    fn test_transfer_moves_balance() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER1_ADDR, 500.into())
            .unwrap_abort();
        let mut host = TestHost::new(state, state_builder);

        let params = TransferParam {
            to: BUYER2_ADDR,
            amount: 200.into(),
        };
        let parameter_bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_transfer(&ctx, &mut host);
        claim!(ret.is_ok(), "transfer should succeed");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 300.into());
        claim_eq!(host.state().balance_of(&BUYER2_ADDR), 200.into());
    }

    #[concordium_test]
    fn test_transfer_insufficient_balance() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let params = TransferParam {
            to: BUYER2_ADDR,
            amount: 1.into(),
        };
        let parameter_bytes = to_bytes(&params);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_transfer(&ctx, &mut host);
        claim_eq!(ret, Err(ContractError::InsufficientFunds));
    }

    /// Burning the whole balance works once and leaves a logged event;
    /// one more token is one too many.
    #[concordium_test]
    fn test_burn_whole_balance_then_fail() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER1_ADDR, 500.into())
            .unwrap_abort();
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = to_bytes(&ContractTokenAmount::from(500u64));
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(BUYER1_ADDR);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_burn(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "burn should succeed");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 0.into());
        claim_eq!(host.state().total_supply, (6_000_000 - 500).into());
        claim!(logger.logs.contains(&to_bytes(&IcoSaleEvent::Burn(BurnEvent {
            holder: BUYER1_ADDR,
            amount: 500.into(),
        }))));

        let parameter_bytes = to_bytes(&ContractTokenAmount::from(1u64));
        ctx.set_parameter(&parameter_bytes);
        let ret: ContractResult<()> = contract_burn(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(ContractError::InsufficientFunds));
    }
}
