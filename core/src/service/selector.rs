use crate::error::SelectionError;
use crate::model::standings::Standings;
use crate::service::dto::LeaderEntry;

/// Returns the cities tied with the best ranking key.
///
/// Relies on `standings` being in ranking order, so ties with the leader sit
/// contiguously at the front.
pub fn select_leaders(standings: &Standings) -> Result<Vec<LeaderEntry>, SelectionError> {
    let mut entries = standings.iter();
    let (leader_city, leader) = entries.next().ok_or(SelectionError::NoCandidates)?;
    let target = leader.ranking_key();

    let mut leaders = vec![LeaderEntry {
        city: leader_city.to_string(),
        summary: leader.clone(),
    }];
    for (city, entry) in entries {
        if entry.ranking_key() != target {
            break;
        }
        tracing::info!("Tied for first place: {}", city);
        leaders.push(LeaderEntry {
            city: city.to_string(),
            summary: entry.clone(),
        });
    }
    Ok(leaders)
}
