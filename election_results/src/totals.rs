// Query layer over one row of totals.

use log::debug;
use snafu::prelude::*;

use crate::catalog::{STAT_BALLOTS_CAST, STAT_TOTAL_VOTES};
use crate::error::*;
use crate::format::compute_percent;
use crate::mapping::{spaced_tokens, ItemRef, MappedItem, ResolvedIndex};

/// Maps a query key to the columns it stands for.
pub type Resolver<'a> = Box<dyn Fn(ItemRef<'_>) -> ResultsResult<Vec<ResolvedIndex<'a>>> + 'a>;

/// One total together with the stat or choice it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultTotal<'a> {
    pub item: MappedItem<'a>,
    pub total: i64,
}

impl<'a> ResultTotal<'a> {
    pub fn percent_of(&self, denominator: i64) -> f64 {
        compute_percent(self.total, denominator)
    }
}

/// A row of totals that can be queried by stat id, choice id or wildcard.
///
/// This is a transient view: build one per query.
pub struct IndexedTotals<'a> {
    name: String,
    totals: &'a [i64],
    resolver: Resolver<'a>,
    headers: Option<Vec<String>>,
    can_vote_for_multiple: bool,
}

impl<'a> std::fmt::Debug for IndexedTotals<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedTotals")
            .field("name", &self.name)
            .field("totals", &self.totals)
            .field("headers", &self.headers)
            .field("can_vote_for_multiple", &self.can_vote_for_multiple)
            .finish()
    }
}

impl<'a> IndexedTotals<'a> {
    pub fn new(
        name: &str,
        totals: &'a [i64],
        resolver: impl Fn(ItemRef<'_>) -> ResultsResult<Vec<ResolvedIndex<'a>>> + 'a,
    ) -> IndexedTotals<'a> {
        IndexedTotals {
            name: name.to_string(),
            totals,
            resolver: Box::new(resolver),
            headers: None,
            can_vote_for_multiple: false,
        }
    }

    pub fn with_headers(mut self, headers: Vec<String>) -> IndexedTotals<'a> {
        self.headers = Some(headers);
        self
    }

    pub fn with_vote_for_multiple(mut self, can_vote_for_multiple: bool) -> IndexedTotals<'a> {
        self.can_vote_for_multiple = can_vote_for_multiple;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn can_vote_for_multiple(&self) -> bool {
        self.can_vote_for_multiple
    }

    fn resolve(&self, key: ItemRef<'_>) -> ResultsResult<Vec<ResultTotal<'a>>> {
        let resolved = (self.resolver)(key)?;
        resolved
            .into_iter()
            .map(|ri| -> ResultsResult<ResultTotal<'a>> {
                let total = self.totals.get(ri.index).cloned().context(NoValuesSnafu {
                    indices: vec![ri.index],
                })?;
                Ok(ResultTotal {
                    item: ri.item,
                    total,
                })
            })
            .collect()
    }

    /// The single total for `key`. Zero or several matches is an error.
    pub fn get_total(&self, key: ItemRef<'_>) -> ResultsResult<ResultTotal<'a>> {
        let mut res = self.resolve(key)?;
        ensure!(
            res.len() == 1,
            AmbiguousTotalSnafu {
                name: self.name.clone(),
                key: key.to_string(),
                count: res.len()
            }
        );
        Ok(res.remove(0))
    }

    /// Totals for each whitespace-separated token, in token order.
    pub fn iter_totals(&self, spaced_ids: &str) -> ResultsResult<Vec<ResultTotal<'a>>> {
        let mut res: Vec<ResultTotal<'a>> = Vec::new();
        for token in spaced_tokens(spaced_ids) {
            res.extend(self.resolve(ItemRef::Id(token))?);
        }
        debug!(
            "iter_totals: {}: {:?} -> {} totals",
            self.name,
            spaced_ids,
            res.len()
        );
        Ok(res)
    }

    /// Like `iter_totals`, largest first. Equal totals keep their order.
    pub fn sorted_totals(&self, spaced_ids: &str) -> ResultsResult<Vec<ResultTotal<'a>>> {
        let mut res = self.iter_totals(spaced_ids)?;
        res.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(res)
    }

    pub fn get_max_total(&self, spaced_ids: &str) -> ResultsResult<i64> {
        let totals = self.iter_totals(spaced_ids)?;
        totals
            .iter()
            .map(|rt| rt.total)
            .max()
            .context(EmptyTotalsSnafu {
                name: self.name.clone(),
                key: spaced_ids,
            })
    }

    /// The denominator for choice percentages: ballots cast when several
    /// choices can be voted for, total votes otherwise.
    pub fn get_voted_ballots(&self) -> ResultsResult<ResultTotal<'a>> {
        let stat_id = if self.can_vote_for_multiple {
            STAT_BALLOTS_CAST
        } else {
            STAT_TOTAL_VOTES
        };
        self.get_total(ItemRef::Id(stat_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ResultStatType, ResultStyle, VotingGroup};
    use crate::choice::Choice;
    use crate::mapping::ResultsMapping;
    use std::sync::Arc;

    fn style() -> ResultStyle {
        ResultStyle::new(
            "RS",
            "",
            false,
            vec![
                Arc::new(ResultStatType::new("RSCst", "Ballots Cast")),
                Arc::new(ResultStatType::new("RSTot", "Total Votes")),
            ],
            vec![Arc::new(VotingGroup::new("TO", "Total"))],
        )
        .unwrap()
    }

    fn choices() -> Vec<Choice> {
        vec![
            Choice::new("1", "Yes").with_index(0),
            Choice::new("2", "No").with_index(1),
            Choice::new("3", "Maybe").with_index(2),
        ]
    }

    const ROW: [i64; 5] = [1000, 950, 300, 500, 300];

    #[test]
    fn single_total() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let totals = IndexedTotals::new("measure", &ROW, move |k| mapping.get_summary_index(k));

        let t = totals.get_total(ItemRef::Id("RSTot")).unwrap();
        assert_eq!(t.total, 950);
        assert_eq!(t.item.id(), "RSTot");
        let t = totals.get_total(ItemRef::Choice(&choices[1])).unwrap();
        assert_eq!(t.total, 500);
        assert_eq!(totals.get_voted_ballots().unwrap().total, 950);
    }

    #[test]
    fn get_total_requires_exactly_one_match() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let totals = IndexedTotals::new("measure", &ROW, move |k| mapping.get_summary_index(k));
        assert!(matches!(
            totals.get_total(ItemRef::Id("CHOICES")),
            Err(ResultsError::AmbiguousTotal { count: 3, .. })
        ));

        let empty = IndexedTotals::new("empty", &ROW, |_| Ok(vec![]));
        assert!(matches!(
            empty.get_total(ItemRef::Id("RSTot")),
            Err(ResultsError::AmbiguousTotal { count: 0, .. })
        ));
        assert!(matches!(
            empty.get_max_total("*"),
            Err(ResultsError::EmptyTotals { .. })
        ));
    }

    #[test]
    fn sorted_totals_are_stable() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let totals = IndexedTotals::new("measure", &ROW, move |k| mapping.get_summary_index(k));
        let ids: Vec<&str> = totals
            .sorted_totals("CHOICES")
            .unwrap()
            .iter()
            .map(|rt| rt.item.id())
            .collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
        assert_eq!(totals.get_max_total("CHOICES").unwrap(), 500);
        assert_eq!(totals.iter_totals("RSTot RSTot").unwrap().len(), 2);
    }

    #[test]
    fn multiple_vote_contests_use_ballots_cast() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let totals = IndexedTotals::new("board", &ROW, move |k| mapping.get_summary_index(k))
            .with_vote_for_multiple(true);
        let voted = totals.get_voted_ballots().unwrap();
        assert_eq!(voted.total, 1000);
        let yes = totals.get_total(ItemRef::Id("1")).unwrap();
        assert!((yes.percent_of(voted.total) - 30.0).abs() < 1e-9);
    }
}
