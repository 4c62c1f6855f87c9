use crate::{test_infrastructure::*, *};

const OWNER_ACC: AccountAddress = AccountAddress([0u8; 32]);
const OWNER_ADDR: Address = Address::Account(OWNER_ACC);
const BUYER1_ACC: AccountAddress = AccountAddress([10u8; 32]);
const BUYER1_ADDR: Address = Address::Account(BUYER1_ACC);
const BUYER2_ACC: AccountAddress = AccountAddress([11u8; 32]);
const BUYER2_ADDR: Address = Address::Account(BUYER2_ACC);
const OTHER_ACC: AccountAddress = AccountAddress([12u8; 32]);
const ORACLE_ADDR: ContractAddress = ContractAddress {
    index: 42,
    subindex: 0,
};
const ICO_ADDR: ContractAddress = ContractAddress {
    index: 77,
    subindex: 0,
};

pub(crate) fn init_parameter() -> InitParams {
    InitParams {
        oracle: ORACLE_ADDR,
        total_supply: 6_000_000.into(),
        tiers: vec![
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
        ],
    }
}

fn initial_state<S: HasStateApi>(state_builder: &mut StateBuilder<S>) -> State<S> {
    let params = init_parameter();
    let pricing = TierPricing::new(params.tiers).unwrap_abort();
    State::new(
        state_builder,
        OWNER_ACC,
        params.oracle,
        pricing,
        params.total_supply,
    )
}

mod oracle;
mod owner;
mod participant;

#[concordium_cfg_test]
mod test_init {
    use super::*;

    #[concordium_test]
    fn test_init_mints_pool_to_creator() {
        let params = init_parameter();
        let parameter_bytes = to_bytes(&params);

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_parameter(&parameter_bytes);

        let mut state_builder = TestStateBuilder::new();
        let state = contract_init(&ctx, &mut state_builder).expect_report("init failed");

        claim_eq!(state.owner, OWNER_ACC);
        claim_eq!(state.oracle, ORACLE_ADDR);
        claim_eq!(state.exchange_rate, 0, "rate must start at the sentinel");
        claim_eq!(state.total_supply, 6_000_000.into());
        claim_eq!(state.balance_of(&OWNER_ADDR), 6_000_000.into());
        claim_eq!(state.holders, vec![OWNER_ADDR]);
        claim_eq!(state.pricing.tiers.len(), 3);
    }

    #[concordium_test]
    fn test_init_rejects_short_tier_table() {
        let mut params = init_parameter();
        params.tiers.pop();
        let parameter_bytes = to_bytes(&params);

        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER_ACC);
        ctx.set_parameter(&parameter_bytes);

        let mut state_builder = TestStateBuilder::new();
        let result = contract_init(&ctx, &mut state_builder);
        claim!(result.is_err(), "two tiers must be rejected");
    }
}
