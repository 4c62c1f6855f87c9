use concordium_std::{
    collections::BTreeMap, fmt::Debug, schema, Address, SchemaType, Serial, Write,
};

pub mod error;
pub mod types;

use types::ContractTokenAmount;

/// Number of pricing tiers every sale carries.
pub const TIER_COUNT: usize = 3;

/// MicroCCD per CCD; the oracle rate is quoted in cents per whole CCD.
pub const MICRO_CCD: u64 = 1_000_000;

/// Service fee attached to every oracle query, in microCCD.
pub const ORACLE_QUERY_FEE_MICRO_CCD: u64 = 5_000_000;

/// Delay for the self-rearming rate refresh (one hour).
pub const RATE_REFRESH_DELAY_MILLIS: u64 = 3_600_000;

// ---------------------------------------

/// Tag for the Burn event.
pub const BURN_EVENT_TAG: u8 = 1u8;
pub const FEED_STATUS_EVENT_TAG: u8 = 2u8;

/// A BurnEvent is logged whenever tokens are removed from supply.
#[derive(Serial, SchemaType, Debug)]
pub struct BurnEvent {
    pub holder: Address,
    pub amount: ContractTokenAmount,
}

/// The FeedStatusEvent reports the price feed's query activity
/// (query dispatched, or skipped for lack of funds).
#[derive(Debug, Serial, SchemaType)]
pub struct FeedStatusEvent {
    pub message: String,
}

/// Tagged events to be serialized for the event log.
#[derive(Debug)]
pub enum IcoSaleEvent {
    Burn(BurnEvent),
    FeedStatus(FeedStatusEvent),
}

impl Serial for IcoSaleEvent {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            IcoSaleEvent::Burn(event) => {
                out.write_u8(BURN_EVENT_TAG)?;
                event.serial(out)
            }
            IcoSaleEvent::FeedStatus(event) => {
                out.write_u8(FEED_STATUS_EVENT_TAG)?;
                event.serial(out)
            }
        }
    }
}

impl schema::SchemaType for IcoSaleEvent {
    fn get_type() -> schema::Type {
        let mut event_map = BTreeMap::new();
        event_map.insert(
            BURN_EVENT_TAG,
            (
                "Burn".to_string(),
                schema::Fields::Named(vec![
                    (String::from("holder"), Address::get_type()),
                    (String::from("amount"), ContractTokenAmount::get_type()),
                ]),
            ),
        );
        event_map.insert(
            FEED_STATUS_EVENT_TAG,
            (
                "FeedStatus".to_string(),
                schema::Fields::Named(vec![(String::from("message"), String::get_type())]),
            ),
        );
        schema::Type::TaggedEnum(event_map)
    }
}
