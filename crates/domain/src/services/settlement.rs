//! Settlement grouping.

use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::settlement::{HostSettlement, SettlementCandidate};

/// Groups eligible reservations by host and sums their amounts.
///
/// Hosts come out ordered by id; reservation ids keep their input order.
pub fn group_by_host(candidates: &[SettlementCandidate]) -> Vec<HostSettlement> {
    let mut by_host: BTreeMap<Uuid, HostSettlement> = BTreeMap::new();

    for candidate in candidates {
        let entry = by_host
            .entry(candidate.host_id)
            .or_insert_with(|| HostSettlement {
                host_id: candidate.host_id,
                amount: 0,
                reservation_ids: Vec::new(),
            });
        entry.amount += candidate.amount;
        entry.reservation_ids.push(candidate.reservation_id);
    }

    by_host.into_values().collect()
}
