use concordium_cis2::{TokenAmountU64, TokenIdUnit};
use concordium_std::*;

pub type ContractTokenId = TokenIdUnit;
pub type ContractTokenAmount = TokenAmountU64;
pub type MicroCcd = u64;
/// Stable pricing unit for the sale tiers.
pub type UsdCents = u64;
/// Cents of stable value bought by one CCD.
/// Zero is the sentinel for "no rate delivered yet".
pub type ExchangeRate = u64;
/// Identifier the oracle echoes back with its response.
pub type QueryId = u64;

/// One pricing tier as supplied at init.
/// The contract keeps its own `sold` counter next to these values.
#[derive(Debug, Serialize, SchemaType, Clone, PartialEq, Eq)]
pub struct TierParam {
    /// Number of tokens sellable at this tier
    pub limit: u64,
    /// Fixed unit price in cents
    pub price: UsdCents,
}

/// Parameter for the oracle contract's `requestRate` entrypoint.
/// The oracle answers by invoking `callback` on the requesting contract
/// after at least `delay` has passed.
#[derive(Debug, Serialize, SchemaType)]
pub struct RateQueryParams {
    /// Requested delay before the oracle resolves the query
    pub delay: Duration,
    /// Entrypoint on the requesting contract to deliver the rate to
    pub callback: OwnedEntrypointName,
}

/// Parameter for the `credit` entrypoint of a successor ICO contract,
/// used by the bulk exchange operation.
#[derive(Debug, Serialize, SchemaType)]
pub struct CreditParams {
    /// Holder to be credited on the target contract
    pub account: Address,
    /// Amount of target tokens, already multiplied by the exchange ratio
    pub amount: ContractTokenAmount,
}
