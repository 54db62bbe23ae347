//! Read-only projections of market and registry state
//!
//! The view instructions return these through `set_return_data`; clients
//! holding fetched account data can call the same functions directly.
//! Nothing here is cached: every value is derived from the ledger as passed in.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::state::{find_market_address, CreatorIndex, Market, Outcome, Registry};

/// Summary of one market for discovery and display
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarketInfo {
    pub market_id: u64,
    /// Market account address
    pub market: Pubkey,
    pub creator: Pubkey,
    pub question: String,
    pub end_time: i64,
    pub resolved: bool,
    pub winning_outcome: Option<Outcome>,
    pub pool: u64,
    pub total_shares: [u64; 2],
    /// YES probability in percent
    pub probability: u64,
    pub is_open: bool,
}

impl MarketInfo {
    pub fn new(address: Pubkey, market: &Market, current_time: i64) -> Self {
        Self {
            market_id: market.market_id,
            market: address,
            creator: market.creator,
            question: market.question.clone(),
            end_time: market.end_time,
            resolved: market.resolved,
            winning_outcome: market.winning_outcome,
            pool: market.pool,
            total_shares: market.total_shares,
            probability: market.probability(),
            is_open: market.is_open(current_time),
        }
    }
}

/// Market handles for a list of IDs
pub fn market_handles(program_id: &Pubkey, market_ids: &[u64]) -> Vec<Pubkey> {
    market_ids
        .iter()
        .map(|id| find_market_address(program_id, *id).0)
        .collect()
}

/// Page of every market, in creation order
pub fn all_markets(program_id: &Pubkey, registry: &Registry, offset: u64, limit: u64) -> Vec<Pubkey> {
    market_handles(program_id, &registry.market_ids_page(offset, limit))
}

/// Last `count` markets, most recent first
pub fn recent_markets(program_id: &Pubkey, registry: &Registry, count: u64) -> Vec<Pubkey> {
    market_handles(program_id, &registry.recent_market_ids(count))
}

/// Page of one creator's markets, in creation order
pub fn markets_by_creator(
    program_id: &Pubkey,
    index: &CreatorIndex,
    offset: u64,
    limit: u64,
) -> Vec<Pubkey> {
    market_handles(program_id, &index.page(offset, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        DEFAULT_CREATION_FEE, DEFAULT_FEE_BPS, DEFAULT_MIN_BUY, DEFAULT_SHARE_PRICE,
        MAX_QUESTION_LEN, MAX_RETURNED_MARKETS,
    };

    fn registry_with(count: u64) -> Registry {
        let mut registry = Registry::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            DEFAULT_CREATION_FEE,
            DEFAULT_SHARE_PRICE,
            DEFAULT_MIN_BUY,
            DEFAULT_FEE_BPS,
            255,
            0,
        );
        registry.market_count = count;
        registry
    }

    #[test]
    fn test_recent_markets_most_recent_first() {
        let program_id = Pubkey::new_unique();
        let registry = registry_with(5);

        let recent = recent_markets(&program_id, &registry, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0], find_market_address(&program_id, 4).0);
        assert_eq!(recent[2], find_market_address(&program_id, 2).0);

        assert_eq!(recent_markets(&program_id, &registry, 50).len(), 5);
    }

    #[test]
    fn test_all_markets_paged() {
        let program_id = Pubkey::new_unique();
        let registry = registry_with(40);

        let first = all_markets(&program_id, &registry, 0, 100);
        assert_eq!(first.len(), MAX_RETURNED_MARKETS);
        assert_eq!(first[0], find_market_address(&program_id, 0).0);

        let rest = all_markets(&program_id, &registry, MAX_RETURNED_MARKETS as u64, 100);
        assert_eq!(rest.len(), 40 - MAX_RETURNED_MARKETS);
    }

    #[test]
    fn test_markets_by_creator() {
        let program_id = Pubkey::new_unique();
        let mut index = CreatorIndex::new(Pubkey::new_unique(), 1);
        index.market_ids.extend([3, 8]);
        assert_eq!(
            markets_by_creator(&program_id, &index, 0, 10),
            vec![
                find_market_address(&program_id, 3).0,
                find_market_address(&program_id, 8).0,
            ]
        );
    }

    #[test]
    fn test_market_info_fits_in_return_data() {
        let registry = registry_with(0);
        let market = Market::new(
            0,
            Pubkey::new_unique(),
            &registry,
            "q".repeat(MAX_QUESTION_LEN),
            String::new(),
            100,
            1,
            0,
        );
        let info = MarketInfo::new(Pubkey::new_unique(), &market, 0);
        assert!(info.is_open);
        assert_eq!(info.probability, 50);
        assert!(info.try_to_vec().unwrap().len() <= solana_program::program::MAX_RETURN_DATA);

        let handles = vec![Pubkey::new_unique(); MAX_RETURNED_MARKETS];
        assert!(handles.try_to_vec().unwrap().len() <= solana_program::program::MAX_RETURN_DATA);
    }
}
