use super::*;

#[concordium_cfg_test]
mod tests {
    use super::*;

    fn callback_parameter(rate: ExchangeRate) -> Vec<u8> {
        to_bytes(&RateCallbackParams {
            query_id: 1,
            rate,
            proof: Vec::new(),
        })
    }

    /// A callback from the trusted oracle stores the rate and pays for
    /// the next query straight away.
    #[concordium_test]
    fn test_callback_sets_rate_and_rearms() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            ORACLE_ADDR,
            OwnedEntrypointName::new_unchecked("requestRate".into()),
            MockFn::returning_ok(()),
        );
        host.set_self_balance(Amount::from_micro_ccd(ORACLE_QUERY_FEE_MICRO_CCD));

        let parameter_bytes = callback_parameter(300);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(ORACLE_ADDR));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_rate_callback(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "authenticated callback should pass");
        claim_eq!(host.state().exchange_rate, 300);
        claim!(
            logger
                .logs
                .contains(&to_bytes(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
                    message: "oracle query dispatched".to_string(),
                }))),
            "the re-armed query must be reported"
        );
    }

    /// Anyone else delivering a rate is turned away and the sentinel
    /// stays in place.
    #[concordium_test]
    fn test_callback_rejects_forged_sender() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = callback_parameter(999);

        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(ICO_ADDR));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_rate_callback(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(CustomContractError::UnauthorizedCallback.into()));
        claim_eq!(host.state().exchange_rate, 0);

        ctx.set_sender(Address::Account(OTHER_ACC));
        let ret: ContractResult<()> = contract_rate_callback(&ctx, &mut host, &mut logger);
        claim_eq!(ret, Err(CustomContractError::UnauthorizedCallback.into()));
        claim_eq!(host.state().exchange_rate, 0);
    }

    /// When the balance cannot cover the query fee the callback still
    /// lands; only the refresh is skipped, with a notification.
    #[concordium_test]
    fn test_callback_rearm_skipped_when_underfunded() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        // no mock entrypoint: an attempted query would fail the test
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = callback_parameter(300);
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Contract(ORACLE_ADDR));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_rate_callback(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "an underfunded refresh is not fatal");
        claim_eq!(host.state().exchange_rate, 300);
        claim!(logger
            .logs
            .contains(&to_bytes(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
                message: "oracle query skipped: balance below query fee".to_string(),
            }))));
    }

    #[concordium_test]
    fn test_update_dispatches_query() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);
        host.setup_mock_entrypoint(
            ORACLE_ADDR,
            OwnedEntrypointName::new_unchecked("requestRate".into()),
            MockFn::returning_ok(()),
        );
        host.set_self_balance(Amount::from_micro_ccd(ORACLE_QUERY_FEE_MICRO_CCD));

        let parameter_bytes = to_bytes(&Duration::from_millis(0));
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER_ACC));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_update(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "update should succeed");
        claim!(logger
            .logs
            .contains(&to_bytes(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
                message: "oracle query dispatched".to_string(),
            }))));
    }

    #[concordium_test]
    fn test_update_soft_fails_without_funds() {
        let mut state_builder = TestStateBuilder::new();
        let state = initial_state(&mut state_builder);
        let mut host = TestHost::new(state, state_builder);

        let parameter_bytes = to_bytes(&Duration::from_millis(0));
        let mut ctx = TestReceiveContext::empty();
        ctx.set_sender(Address::Account(OTHER_ACC));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        let ret: ContractResult<()> = contract_update(&ctx, &mut host, &mut logger);
        claim!(ret.is_ok(), "a skipped query is not an error");
        claim_eq!(host.state().exchange_rate, 0);
        claim!(logger
            .logs
            .contains(&to_bytes(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
                message: "oracle query skipped: balance below query fee".to_string(),
            }))));
    }
}
