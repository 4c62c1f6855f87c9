//! Tiered ICO token sale funded with CCD.
//! Tokens are priced in stable cents; an oracle-fed exchange rate
//! converts each incoming payment before it is spent against the tiers.
#[cfg(any(feature = "wasm-test", test))]
mod sctest;
mod state;
mod view;

use concordium_std::*;
use sale_utils::{
    BurnEvent, FeedStatusEvent, IcoSaleEvent, ORACLE_QUERY_FEE_MICRO_CCD,
    RATE_REFRESH_DELAY_MILLIS,
};
use state::{State, *};
// Disambiguate the crate's `ExchangeRate` (u64 alias) from the `ExchangeRate`
// struct now exported by `concordium_std::*`.
use sale_utils::types::ExchangeRate;

/// The parameter schema for the `init` function.
#[derive(Debug, Serialize, SchemaType)]
pub struct InitParams {
    /// Oracle contract trusted to deliver exchange-rate callbacks
    pub oracle: ContractAddress,
    /// Tokens minted to the instance creator; this balance is the
    /// sellable pool
    pub total_supply: ContractTokenAmount,
    /// The pricing tiers, cheapest first
    pub tiers: Vec<TierParam>,
}

/// # Init Function
/// Mints the whole supply to the instance creator and installs the
/// tier table. The rate starts at zero, so sales stay disabled until
/// the first oracle callback.
///
/// Init functions cannot invoke other contracts, so the bootstrap
/// query is issued by calling `update` right after deployment.
#[init(contract = "ico_token_ccd", parameter = "InitParams")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    let params: InitParams = ctx.parameter_cursor().get()?;

    let pricing = TierPricing::new(params.tiers)?;

    Ok(State::new(
        state_builder,
        ctx.init_origin(),
        params.oracle,
        pricing,
        params.total_supply,
    ))
}

// ==============================================
// Token ledger
// ==========================================

/// The parameter type for the contract function `transfer`.
#[derive(Debug, Serialize, SchemaType)]
pub struct TransferParam {
    /// Receiving address
    pub to: Address,
    /// Quantity to move
    pub amount: ContractTokenAmount,
}

/// Move tokens from the sender to another holder.
///
/// Caller: Anyone
/// Reject if:
/// - Fails to parse parameter
/// - The sender's balance is short
/// - Crediting the receiver would overflow its balance
#[receive(
    contract = "ico_token_ccd",
    name = "transfer",
    parameter = "TransferParam",
    error = "ContractError",
    mutable
)]
fn contract_transfer<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    let params: TransferParam = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    host.state_mut()
        .transfer_tokens(&sender, &params.to, params.amount)
}

/// Destroy tokens from the sender's balance and shrink the supply.
///
/// Caller: Anyone
/// Reject if:
/// - Fails to parse parameter
/// - The sender's balance is short
#[receive(
    contract = "ico_token_ccd",
    name = "burn",
    parameter = "ContractTokenAmount",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_burn<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let amount: ContractTokenAmount = ctx.parameter_cursor().get()?;
    let sender = ctx.sender();

    host.state_mut().burn_tokens(&sender, amount)?;

    logger.log(&IcoSaleEvent::Burn(BurnEvent {
        holder: sender,
        amount,
    }))?;

    Ok(())
}

// ==============================================
// Sale processing
// ==========================================

/// Buy tokens with the attached CCD. The payment is converted to cents
/// at the current oracle rate and spent against the tiers in order;
/// purchased tokens come out of the owner's pool, proceeds go to the
/// owner, and the unspendable remainder returns to the payer.
///
/// State is fully updated before any CCD leaves the contract, and the
/// proceeds transfer precedes the refund.
///
/// Caller: Account only
/// Reject if:
/// - The sender is a contract
/// - No rate has been delivered yet
/// - The payment affords no token at any open tier
/// - Either outbound transfer fails
#[receive(
    contract = "ico_token_ccd",
    name = "buy",
    error = "ContractError",
    mutable,
    payable
)]
fn contract_buy<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
) -> ContractResult<()> {
    let payer = match ctx.sender() {
        Address::Account(addr) => addr,
        Address::Contract(_) => bail!(CustomContractError::AccountOnly.into()),
    };

    let outcome = host
        .state_mut()
        .process_purchase(&Address::Account(payer), amount)?;

    let owner = host.state().owner;
    let transfer_result = host.invoke_transfer(&owner, outcome.cost);
    ensure!(
        transfer_result.is_ok(),
        CustomContractError::TransferError.into()
    );

    if outcome.refund.micro_ccd > 0 {
        let transfer_result = host.invoke_transfer(&payer, outcome.refund);
        ensure!(
            transfer_result.is_ok(),
            CustomContractError::TransferError.into()
        );
    }

    Ok(())
}

// ==============================================
// Price feed
// ==========================================

/// The parameter type for the oracle's response.
#[derive(Debug, Serialize, SchemaType)]
pub struct RateCallbackParams {
    /// Query this response answers
    pub query_id: QueryId,
    /// Cents per CCD
    pub rate: ExchangeRate,
    /// Authenticity proof attached by the oracle service; verified on
    /// the oracle side, carried here untouched
    #[concordium(size_length = 2)]
    pub proof: Vec<u8>,
}

/// Invoke the oracle for a fresh rate, paying the query fee from the
/// contract balance. When the balance cannot cover the fee the query
/// is skipped and a status notification is logged instead; the feed
/// simply stays on its last delivered rate.
fn issue_rate_query<S: HasStateApi>(
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    delay: Duration,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let fee = Amount::from_micro_ccd(ORACLE_QUERY_FEE_MICRO_CCD);

    if host.self_balance() < fee {
        logger.log(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
            message: "oracle query skipped: balance below query fee".to_string(),
        }))?;
        return Ok(());
    }

    let oracle = host.state().oracle;
    let params = RateQueryParams {
        delay,
        callback: OwnedEntrypointName::new_unchecked("rateCallback".to_string()),
    };
    host.invoke_contract(
        &oracle,
        &params,
        EntrypointName::new_unchecked("requestRate"),
        fee,
    )?;

    logger.log(&IcoSaleEvent::FeedStatus(FeedStatusEvent {
        message: "oracle query dispatched".to_string(),
    }))?;

    Ok(())
}

/// Accept a rate from the oracle and re-arm the next refresh. This
/// callback is the only writer of the exchange rate and its sender
/// check is the only authentication in the contract.
///
/// Caller: the trusted oracle contract only
/// Reject if:
/// - Fails to parse parameter
/// - The sender is not the oracle
#[receive(
    contract = "ico_token_ccd",
    name = "rateCallback",
    parameter = "RateCallbackParams",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_rate_callback<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_contract(&host.state().oracle),
        CustomContractError::UnauthorizedCallback.into()
    );

    let params: RateCallbackParams = ctx.parameter_cursor().get()?;
    host.state_mut().exchange_rate = params.rate;

    issue_rate_query(
        host,
        Duration::from_millis(RATE_REFRESH_DELAY_MILLIS),
        logger,
    )
}

/// Trigger a rate query by hand, e.g. right after deployment or after
/// topping the contract up once queries were skipped for lack of funds.
///
/// Caller: Anyone
/// Soft-fails to a status notification when the fee cannot be covered.
#[receive(
    contract = "ico_token_ccd",
    name = "update",
    parameter = "Duration",
    error = "ContractError",
    enable_logger,
    mutable
)]
fn contract_update<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let delay: Duration = ctx.parameter_cursor().get()?;
    issue_rate_query(host, delay, logger)
}

// ==============================================
// For the owner
// ==========================================

/// The parameter type for the contract function `exchangeToIco`.
#[derive(Debug, Serialize, SchemaType)]
pub struct ExchangeParams {
    /// Successor contract exposing a `credit` entrypoint
    pub target: ContractAddress,
    /// Target tokens granted per local token
    pub rate: u64,
}

/// Drain every ledger balance into credits on a successor contract at
/// a fixed multiplier. The batch is not one atomic unit: a credit that
/// fails is dropped and iteration continues, leaving that balance
/// drained locally. Holder-index entries whose balance is already zero
/// (including repeated entries for the same address) are skipped.
///
/// Caller: contract owner only
/// Reject if:
/// - The sender is not the owner
/// - Fails to parse parameter
/// - A credited amount overflows at the given multiplier
#[receive(
    contract = "ico_token_ccd",
    name = "exchangeToIco",
    parameter = "ExchangeParams",
    error = "ContractError",
    mutable
)]
fn contract_exchange_to_ico<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&host.state().owner),
        ContractError::Unauthorized
    );

    let params: ExchangeParams = ctx.parameter_cursor().get()?;

    let holders = host.state().holders.clone();
    for holder in holders {
        let balance = host.state().balance_of(&holder);
        if balance.0 == 0 {
            continue;
        }
        let credited = balance
            .0
            .checked_mul(params.rate)
            .ok_or(ContractError::from(CustomContractError::OverflowError))?;

        host.state_mut().zero_balance(&holder);

        let _ = host.invoke_contract(
            &params.target,
            &CreditParams {
                account: holder,
                amount: credited.into(),
            },
            EntrypointName::new_unchecked("credit"),
            Amount::zero(),
        );
    }

    Ok(())
}

/// Hand the contract over to a new owner. The new owner's balance
/// becomes the sellable pool from this point on.
///
/// Caller: contract owner only
/// Reject if:
/// - The sender is not the owner
/// - Fails to parse parameter
#[receive(
    contract = "ico_token_ccd",
    name = "setOwner",
    parameter = "AccountAddress",
    error = "ContractError",
    mutable
)]
fn contract_set_owner<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
) -> ContractResult<()> {
    ensure!(
        ctx.sender().matches_account(&host.state().owner),
        ContractError::Unauthorized
    );

    let new_owner: AccountAddress = ctx.parameter_cursor().get()?;
    host.state_mut().owner = new_owner;

    Ok(())
}
