use super::*;

#[concordium_cfg_test]
mod tests {
    use super::*;

    fn exchange_parameter(rate: u64) -> Vec<u8> {
        to_bytes(&ExchangeParams {
            target: ICO_ADDR,
            rate,
        })
    }

    #[concordium_test]
    fn test_exchange_requires_owner() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = exchange_parameter(2);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER_ACC));
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_exchange_to_ico(&ctx, &mut host);
        claim_eq!(ret, Err(ContractError::Unauthorized));
        claim_eq!(host.state().balance_of(&OWNER_ADDR), 6_000_000.into());
    }

    #[concordium_test]
    fn test_exchange_drains_every_holder() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER1_ADDR, 500.into())
            .unwrap_abort();
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER2_ADDR, 250.into())
            .unwrap_abort();
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            ICO_ADDR,
            OwnedEntrypointName::new_unchecked("credit".into()),
            MockFn::returning_ok(()),
        );

        let parameter_bytes = exchange_parameter(2);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(OWNER_ADDR);
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_exchange_to_ico(&ctx, &mut host);
        claim!(ret.is_ok(), "exchange should succeed");
        claim_eq!(host.state().balance_of(&OWNER_ADDR), 0.into());
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 0.into());
        claim_eq!(host.state().balance_of(&BUYER2_ADDR), 0.into());
    }

    /// A holder that went to zero and came back sits in the index
    /// twice; the drained first pass leaves nothing for the second.
    #[concordium_test]
    fn test_exchange_tolerates_duplicate_index_entries() {
        let mut state_builder = TestStateBuilder::new();
        let mut state = initial_state(&mut state_builder);
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER1_ADDR, 500.into())
            .unwrap_abort();
        state
            .transfer_tokens(&BUYER1_ADDR, &OWNER_ADDR, 500.into())
            .unwrap_abort();
        state
            .transfer_tokens(&OWNER_ADDR, &BUYER1_ADDR, 200.into())
            .unwrap_abort();
        let duplicates = state.holders.iter().filter(|a| **a == BUYER1_ADDR).count();
        claim_eq!(duplicates, 2, "the returning holder must be listed twice");
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            ICO_ADDR,
            OwnedEntrypointName::new_unchecked("credit".into()),
            MockFn::returning_ok(()),
        );

        let parameter_bytes = exchange_parameter(1);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(OWNER_ADDR);
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_exchange_to_ico(&ctx, &mut host);
        claim!(ret.is_ok(), "the repeated entry must be skipped, not crash");
        claim_eq!(host.state().balance_of(&BUYER1_ADDR), 0.into());
    }

    #[concordium_test]
    fn test_exchange_rejects_overflowing_multiplier() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = exchange_parameter(u64::MAX);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(OWNER_ADDR);
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_exchange_to_ico(&ctx, &mut host);
        claim_eq!(ret, Err(CustomContractError::OverflowError.into()));
    }

    #[concordium_test]
    fn test_set_owner() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = to_bytes(&BUYER1_ACC);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER_ACC));
        ctx.set_parameter(&parameter_bytes);

        let ret: ContractResult<()> = contract_set_owner(&ctx, &mut host);
        claim_eq!(ret, Err(ContractError::Unauthorized));

        ctx.set_sender(OWNER_ADDR);
        let ret: ContractResult<()> = contract_set_owner(&ctx, &mut host);
        claim!(ret.is_ok(), "the owner may hand over");
        claim_eq!(host.state().owner, BUYER1_ACC);
    }
}
