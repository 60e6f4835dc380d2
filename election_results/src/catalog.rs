// Reference catalogs: voting groups, result stat types, parties and the
// result styles built from them. Everything here is immutable after load
// and shared through `Arc`.

use log::debug;
use snafu::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::*;

/// Id of the voting group that holds the total of all subtotals.
pub const TOTAL_VOTING_GROUP_ID: &str = "TO";

/// Ballot sheets submitted by voters.
pub const STAT_BALLOTS_CAST: &str = "RSCst";
/// Sum of the valid votes reported.
pub const STAT_TOTAL_VOTES: &str = "RSTot";
/// Voters registered for computing turnout.
pub const STAT_REGISTERED: &str = "RSReg";

/// Id of the party standing for all voters in turnout breakdowns.
pub const ALL_PARTIES_ID: &str = "0";

/// Anything stored in a catalog, looked up by its id.
pub trait Identified {
    /// Name of the kind of object, used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// An ordered, id-indexed collection of shared objects.
///
/// Insertion order is preserved and ids are unique.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: Vec<Arc<T>>,
    by_id: HashMap<String, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Catalog {
            items: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<T: Identified> Catalog<T> {
    pub fn new() -> Catalog<T> {
        Catalog::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = T>) -> ResultsResult<Catalog<T>> {
        let mut catalog = Catalog::new();
        for item in items {
            catalog.insert(item)?;
        }
        Ok(catalog)
    }

    /// Adds an object, failing if its id is empty or already present.
    pub fn insert(&mut self, item: T) -> ResultsResult<Arc<T>> {
        let id = item.id().to_string();
        ensure!(
            !id.is_empty(),
            MissingIdSnafu {
                kind: T::KIND,
                data: String::new()
            }
        );
        ensure!(
            !self.by_id.contains_key(&id),
            DuplicateIdSnafu { kind: T::KIND, id }
        );
        debug!("catalog: adding {} {:?}", T::KIND, id);
        let item = Arc::new(item);
        self.by_id.insert(id, self.items.len());
        self.items.push(item.clone());
        Ok(item)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<T>> {
        self.by_id.get(id).map(|idx| &self.items[*idx])
    }

    /// Like `get`, but a missing id is an unresolved reference.
    pub fn lookup(&self, id: &str, referrer: &str) -> ResultsResult<Arc<T>> {
        self.get(id).cloned().context(UnknownReferenceSnafu {
            kind: T::KIND,
            id,
            referrer,
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A subtotal category, e.g. election day or vote by mail.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct VotingGroup {
    pub id: String,
    pub display_text: String,
}

impl VotingGroup {
    pub fn new(id: &str, display_text: &str) -> VotingGroup {
        VotingGroup {
            id: id.to_string(),
            display_text: display_text.to_string(),
        }
    }

    pub fn is_total(&self) -> bool {
        self.id == TOTAL_VOTING_GROUP_ID
    }
}

impl Identified for VotingGroup {
    const KIND: &'static str = "voting group";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A non-choice result category (registered voters, ballots cast, ...).
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ResultStatType {
    pub id: String,
    pub display_text: String,
    pub is_percent: bool,
}

impl ResultStatType {
    pub fn new(id: &str, display_text: &str) -> ResultStatType {
        ResultStatType {
            id: id.to_string(),
            display_text: display_text.to_string(),
            is_percent: false,
        }
    }
}

impl Identified for ResultStatType {
    const KIND: &'static str = "result stat type";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A party, used to break down turnout.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Party {
    pub id: String,
    pub display_text: String,
}

impl Party {
    pub fn new(id: &str, display_text: &str) -> Party {
        Party {
            id: id.to_string(),
            display_text: display_text.to_string(),
        }
    }

    pub fn all_parties() -> Party {
        Party::new(ALL_PARTIES_ID, "All Parties")
    }
}

impl Identified for Party {
    const KIND: &'static str = "party";
    fn id(&self) -> &str {
        &self.id
    }
}

/// The shape of the result rows of a contest: which stats come first in
/// every row, and which voting groups every area is broken down into.
///
/// Invariant: `stat_id_to_index` and `vg_id_to_index` are bijections onto
/// the positions of their lists.
#[derive(Debug, Clone)]
pub struct ResultStyle {
    pub id: String,
    pub description: String,
    pub is_rcv: bool,
    result_stat_types: Vec<Arc<ResultStatType>>,
    voting_groups: Vec<Arc<VotingGroup>>,
    stat_id_to_index: HashMap<String, usize>,
    vg_id_to_index: HashMap<String, usize>,
}

impl ResultStyle {
    pub fn new(
        id: &str,
        description: &str,
        is_rcv: bool,
        result_stat_types: Vec<Arc<ResultStatType>>,
        voting_groups: Vec<Arc<VotingGroup>>,
    ) -> ResultsResult<ResultStyle> {
        let stat_id_to_index = index_by_id(&result_stat_types)?;
        let vg_id_to_index = index_by_id(&voting_groups)?;
        Ok(ResultStyle {
            id: id.to_string(),
            description: description.to_string(),
            is_rcv,
            result_stat_types,
            voting_groups,
            stat_id_to_index,
            vg_id_to_index,
        })
    }

    pub fn result_stat_types(&self) -> &[Arc<ResultStatType>] {
        &self.result_stat_types
    }

    pub fn voting_groups(&self) -> &[Arc<VotingGroup>] {
        &self.voting_groups
    }

    pub fn stat_count(&self) -> usize {
        self.result_stat_types.len()
    }

    pub fn voting_group_count(&self) -> usize {
        self.voting_groups.len()
    }

    pub fn has_stat(&self, stat_id: &str) -> bool {
        self.stat_id_to_index.contains_key(stat_id)
    }

    pub fn stat_index(&self, stat_id: &str) -> ResultsResult<usize> {
        self.stat_id_to_index
            .get(stat_id)
            .cloned()
            .context(UnknownStatSnafu {
                id: stat_id,
                style: self.id.clone(),
            })
    }

    pub fn voting_group_index(&self, vg_id: &str) -> ResultsResult<usize> {
        self.vg_id_to_index
            .get(vg_id)
            .cloned()
            .context(UnknownVotingGroupSnafu {
                id: vg_id,
                style: self.id.clone(),
            })
    }

    pub fn get_voting_group(&self, vg_id: &str) -> ResultsResult<&Arc<VotingGroup>> {
        let idx = self.voting_group_index(vg_id)?;
        Ok(&self.voting_groups[idx])
    }

    /// The voting group used when a query does not name one: the "total"
    /// group if the style has it, otherwise the first one.
    pub fn default_voting_group(&self) -> Option<&Arc<VotingGroup>> {
        self.voting_groups
            .iter()
            .find(|vg| vg.is_total())
            .or_else(|| self.voting_groups.first())
    }
}

impl Identified for ResultStyle {
    const KIND: &'static str = "result style";
    fn id(&self) -> &str {
        &self.id
    }
}

fn index_by_id<T: Identified>(items: &[Arc<T>]) -> ResultsResult<HashMap<String, usize>> {
    let mut res: HashMap<String, usize> = HashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let previous = res.insert(item.id().to_string(), idx);
        ensure!(
            previous.is_none(),
            DuplicateIdSnafu {
                kind: T::KIND,
                id: item.id()
            }
        );
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_style() -> ResultStyle {
        let stats = vec![
            Arc::new(ResultStatType::new("RSReg", "Registered Voters")),
            Arc::new(ResultStatType::new("RSCst", "Ballots Cast")),
            Arc::new(ResultStatType::new("RSTot", "Total Votes")),
        ];
        let vgs = vec![
            Arc::new(VotingGroup::new("ED", "Election Day")),
            Arc::new(VotingGroup::new("TO", "Total")),
        ];
        ResultStyle::new("RS1", "Sample", false, stats, vgs).unwrap()
    }

    #[test]
    fn style_indices_are_bijective() {
        let style = sample_style();
        let mut stat_positions: Vec<usize> = style
            .result_stat_types()
            .iter()
            .map(|s| style.stat_index(&s.id).unwrap())
            .collect();
        stat_positions.sort_unstable();
        assert_eq!(stat_positions, (0..style.stat_count()).collect::<Vec<_>>());

        for (idx, vg) in style.voting_groups().iter().enumerate() {
            assert_eq!(style.voting_group_index(&vg.id).unwrap(), idx);
        }
    }

    #[test]
    fn style_rejects_duplicate_stats() {
        let stats = vec![
            Arc::new(ResultStatType::new("RSReg", "Registered Voters")),
            Arc::new(ResultStatType::new("RSReg", "Registered again")),
        ];
        let res = ResultStyle::new("RS1", "", false, stats, vec![]);
        assert!(matches!(res, Err(ResultsError::DuplicateId { .. })));
    }

    #[test]
    fn default_voting_group_prefers_total() {
        let style = sample_style();
        assert_eq!(style.default_voting_group().unwrap().id, "TO");
        assert!(style.has_stat("RSTot"));
        assert!(!style.has_stat("RSExh"));
        assert!(style.stat_index("RSExh").is_err());
    }

    #[test]
    fn catalog_keeps_order_and_rejects_duplicates() {
        let mut catalog: Catalog<Party> = Catalog::new();
        catalog.insert(Party::new("0", "All Parties")).unwrap();
        catalog.insert(Party::new("DEM", "Democratic")).unwrap();
        assert!(catalog.insert(Party::new("DEM", "Again")).is_err());
        assert!(catalog.insert(Party::new("", "No id")).is_err());
        let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "DEM"]);
        assert_eq!(catalog.index_of("DEM"), Some(1));
        assert!(catalog.lookup("REP", "test").is_err());
    }
}
