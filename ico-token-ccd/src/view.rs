use crate::state::{State, *};
use concordium_std::*;
// Disambiguate the crate's `ExchangeRate` (u64 alias) from the `ExchangeRate`
// struct now exported by `concordium_std::*`.
use sale_utils::types::ExchangeRate;

#[derive(Debug, Serialize, SchemaType)]
struct ViewResponse {
    owner: AccountAddress,
    oracle: ContractAddress,
    exchange_rate: ExchangeRate,
    total_supply: ContractTokenAmount,
    tiers: Vec<Tier>,
}

#[receive(
    contract = "ico_token_ccd",
    name = "view",
    return_value = "ViewResponse"
)]
fn contract_view<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewResponse> {
    let state = host.state();

    Ok(ViewResponse {
        owner: state.owner,
        oracle: state.oracle,
        exchange_rate: state.exchange_rate,
        total_supply: state.total_supply,
        tiers: state.pricing.tiers.clone(),
    })
}

// ------------------------------------------

type ViewHoldersResponse = Vec<Address>;

#[receive(
    contract = "ico_token_ccd",
    name = "viewHolders",
    return_value = "ViewHoldersResponse"
)]
fn contract_view_holders<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ViewHoldersResponse> {
    Ok(host.state().holders.clone())
}

// ------------------------------------------

#[receive(
    contract = "ico_token_ccd",
    name = "balanceOf",
    parameter = "Address",
    return_value = "ContractTokenAmount"
)]
fn contract_balance_of<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ContractTokenAmount> {
    let holder: Address = ctx.parameter_cursor().get()?;
    Ok(host.state().balance_of(&holder))
}

// ------------------------------------------

#[receive(
    contract = "ico_token_ccd",
    name = "totalSupply",
    return_value = "ContractTokenAmount"
)]
fn contract_total_supply<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<ContractTokenAmount> {
    Ok(host.state().total_supply)
}
