// Translation of symbolic ids into column positions of a result row.
//
// A row is laid out as [stat_0 .. stat_{k-1}, choice_0 .. choice_{n-1}].

use log::debug;
use snafu::prelude::*;
use std::fmt::Display;
use std::ops::Range;

use crate::catalog::{ResultStatType, ResultStyle};
use crate::choice::Choice;
use crate::error::*;

/// Selects every result stat column.
pub const ALL_STATS_TOKEN: &str = "*";
/// Selects every choice column.
pub const CHOICES_TOKEN: &str = "CHOICES";

/// Something a column can be looked up by.
#[derive(Debug, Clone, Copy)]
pub enum ItemRef<'k> {
    /// A stat id, a choice id or one of the wildcard tokens.
    Id(&'k str),
    Stat(&'k ResultStatType),
    Choice(&'k Choice),
}

impl Display for ItemRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemRef::Id(s) => write!(f, "id {:?}", s),
            ItemRef::Stat(s) => write!(f, "stat {:?}", s.id),
            ItemRef::Choice(c) => write!(f, "choice {:?}", c.id),
        }
    }
}

/// The object sitting at a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedItem<'a> {
    Stat(&'a ResultStatType),
    Choice(&'a Choice),
}

impl<'a> MappedItem<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            MappedItem::Stat(s) => &s.id,
            MappedItem::Choice(c) => &c.id,
        }
    }

    pub fn display_text(&self) -> &'a str {
        match self {
            MappedItem::Stat(s) => &s.display_text,
            MappedItem::Choice(c) => &c.ballot_title,
        }
    }

    pub fn as_choice(&self) -> Option<&'a Choice> {
        match self {
            MappedItem::Choice(c) => Some(c),
            MappedItem::Stat(_) => None,
        }
    }
}

/// A column together with the object that lives there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedIndex<'a> {
    pub item: MappedItem<'a>,
    pub index: usize,
}

/// The column layout of the results of one contest (or turnout).
///
/// This is a borrowed view: it is cheap to build and holds no state.
#[derive(Debug, Clone, Copy)]
pub struct ResultsMapping<'a> {
    result_style: &'a ResultStyle,
    choices: &'a [Choice],
}

impl<'a> ResultsMapping<'a> {
    /// `choices` must be sorted by their index.
    pub fn new(result_style: &'a ResultStyle, choices: &'a [Choice]) -> ResultsMapping<'a> {
        debug_assert!(choices
            .iter()
            .enumerate()
            .all(|(idx, c)| c.index.map_or(true, |ci| ci == idx)));
        ResultsMapping {
            result_style,
            choices,
        }
    }

    pub fn result_style(&self) -> &'a ResultStyle {
        self.result_style
    }

    pub fn choices(&self) -> &'a [Choice] {
        self.choices
    }

    pub fn stat_count(&self) -> usize {
        self.result_style.stat_count()
    }

    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// Width of a result row.
    pub fn column_count(&self) -> usize {
        self.stat_count() + self.choice_count()
    }

    pub fn has_stat(&self, stat_id: &str) -> bool {
        self.result_style.has_stat(stat_id)
    }

    pub fn get_stat_index(&self, stat: &ResultStatType) -> ResultsResult<usize> {
        self.result_style.stat_index(&stat.id)
    }

    pub fn get_choice_index(&self, choice: &Choice) -> ResultsResult<usize> {
        let idx = choice
            .index
            .context(UnindexedChoiceSnafu { id: &choice.id })?;
        // The index must point back at the same choice of this contest.
        ensure!(
            self.choices.get(idx).map_or(false, |c| c.id == choice.id),
            UnknownChoiceSnafu { id: &choice.id }
        );
        Ok(self.stat_count() + idx)
    }

    pub fn get_stat_or_choice_index(&self, item: ItemRef<'_>) -> ResultsResult<usize> {
        match item {
            ItemRef::Id(stat_id) => self.result_style.stat_index(stat_id),
            ItemRef::Stat(stat) => self.get_stat_index(stat),
            ItemRef::Choice(choice) => self.get_choice_index(choice),
        }
    }

    pub fn find_choice(&self, choice_id: &str) -> Option<&'a Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    pub fn item_at(&self, index: usize) -> Option<MappedItem<'a>> {
        let stats = self.result_style.result_stat_types();
        if index < stats.len() {
            Some(MappedItem::Stat(&stats[index]))
        } else {
            self.choices
                .get(index - stats.len())
                .map(MappedItem::Choice)
        }
    }

    /// Every column, stats first.
    pub fn all_items(&self) -> Vec<MappedItem<'a>> {
        (0..self.column_count())
            .filter_map(|idx| self.item_at(idx))
            .collect()
    }

    pub fn iter_indices_by_id(&self, token: &str) -> ResultsResult<Range<usize>> {
        match token {
            ALL_STATS_TOKEN => Ok(0..self.stat_count()),
            CHOICES_TOKEN => Ok(self.stat_count()..self.column_count()),
            stat_id => {
                let idx = self.result_style.stat_index(stat_id)?;
                Ok(idx..idx + 1)
            }
        }
    }

    /// Resolves whitespace-separated tokens, in order. Repeated tokens give
    /// repeated columns. An empty text selects every stat.
    pub fn iter_indices_by_spaced_ids(&self, text: &str) -> ResultsResult<Vec<usize>> {
        let mut res: Vec<usize> = Vec::new();
        for token in spaced_tokens(text) {
            res.extend(self.iter_indices_by_id(token)?);
        }
        debug!("iter_indices_by_spaced_ids: {:?} -> {:?}", text, res);
        Ok(res)
    }

    /// The resolver behind summary totals. Besides the wildcards and stat
    /// ids, choice ids are accepted too.
    pub fn get_summary_index(&self, key: ItemRef<'_>) -> ResultsResult<Vec<ResolvedIndex<'a>>> {
        let indices: Vec<usize> = match key {
            ItemRef::Id(token @ (ALL_STATS_TOKEN | CHOICES_TOKEN)) => {
                self.iter_indices_by_id(token)?.collect()
            }
            ItemRef::Id(id) if self.has_stat(id) => vec![self.result_style.stat_index(id)?],
            ItemRef::Id(id) => {
                let choice = self.find_choice(id).context(UnknownStatSnafu {
                    id,
                    style: self.result_style.id.clone(),
                })?;
                vec![self.get_choice_index(choice)?]
            }
            other => vec![self.get_stat_or_choice_index(other)?],
        };
        indices
            .into_iter()
            .map(|index| -> ResultsResult<ResolvedIndex<'a>> {
                let item = self.item_at(index).context(UnknownChoiceSnafu {
                    id: index.to_string(),
                })?;
                Ok(ResolvedIndex { item, index })
            })
            .collect()
    }

    /// Column titles for the selected columns, for table headers.
    pub fn headers(&self, spaced_ids: &str) -> ResultsResult<Vec<String>> {
        Ok(self
            .iter_indices_by_spaced_ids(spaced_ids)?
            .into_iter()
            .filter_map(|idx| self.item_at(idx))
            .map(|item| item.display_text().to_string())
            .collect())
    }
}

/// Splits on whitespace, falling back to the all-stats wildcard.
pub(crate) fn spaced_tokens(text: &str) -> Vec<&str> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        vec![ALL_STATS_TOKEN]
    } else {
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::VotingGroup;
    use std::sync::Arc;

    fn style() -> ResultStyle {
        ResultStyle::new(
            "RS",
            "",
            false,
            vec![
                Arc::new(ResultStatType::new("RSReg", "Registered Voters")),
                Arc::new(ResultStatType::new("RSCst", "Ballots Cast")),
                Arc::new(ResultStatType::new("RSTot", "Total Votes")),
            ],
            vec![Arc::new(VotingGroup::new("TO", "Total"))],
        )
        .unwrap()
    }

    fn choices() -> Vec<Choice> {
        ["ALICE", "BOB", "CATHY"]
            .iter()
            .enumerate()
            .map(|(idx, name)| Choice::new(&format!("10{}", idx), name).with_index(idx))
            .collect()
    }

    #[test]
    fn choice_index_follows_stats() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        for (i, c) in choices.iter().enumerate() {
            assert_eq!(mapping.get_choice_index(c).unwrap(), 3 + i);
        }
        assert_eq!(mapping.all_items().len(), mapping.column_count());
    }

    #[test]
    fn unindexed_choice_fails() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let loose = Choice::new("999", "NOBODY");
        assert!(matches!(
            mapping.get_choice_index(&loose),
            Err(ResultsError::UnindexedChoice { .. })
        ));
    }

    #[test]
    fn foreign_choice_fails() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let stranger = Choice::candidate("ZZZ", "NOBODY", None).with_index(0);
        assert!(matches!(
            mapping.get_choice_index(&stranger),
            Err(ResultsError::UnknownChoice { .. })
        ));
        let out_of_range = Choice::new("999", "NOBODY").with_index(choices.len());
        assert!(matches!(
            mapping.get_choice_index(&out_of_range),
            Err(ResultsError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn wildcards_cover_every_column_once() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let indices = mapping.iter_indices_by_spaced_ids("* CHOICES").unwrap();
        assert_eq!(indices, (0..6).collect::<Vec<usize>>());
    }

    #[test]
    fn spaced_ids_keep_order_and_duplicates() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let indices = mapping
            .iter_indices_by_spaced_ids("CHOICES  RSTot RSReg RSTot")
            .unwrap();
        assert_eq!(indices, vec![3, 4, 5, 2, 0, 2]);
        assert_eq!(mapping.iter_indices_by_spaced_ids("").unwrap(), vec![0, 1, 2]);
        assert!(mapping.iter_indices_by_spaced_ids("RSTot RSExh").is_err());
    }

    #[test]
    fn stat_or_choice_lookup() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let stat = ResultStatType::new("RSCst", "Ballots Cast");
        assert_eq!(mapping.get_stat_or_choice_index(ItemRef::Id("RSTot")).unwrap(), 2);
        assert_eq!(mapping.get_stat_or_choice_index(ItemRef::Stat(&stat)).unwrap(), 1);
        assert_eq!(
            mapping
                .get_stat_or_choice_index(ItemRef::Choice(&choices[2]))
                .unwrap(),
            5
        );
        assert!(mapping.get_stat_or_choice_index(ItemRef::Id("101")).is_err());
    }

    #[test]
    fn summary_index_accepts_choice_ids() {
        let style = style();
        let choices = choices();
        let mapping = ResultsMapping::new(&style, &choices);
        let res = mapping.get_summary_index(ItemRef::Id("101")).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].index, 4);
        assert_eq!(res[0].item.display_text(), "BOB");
        assert_eq!(mapping.get_summary_index(ItemRef::Id("*")).unwrap().len(), 3);
        assert!(mapping.get_summary_index(ItemRef::Id("nope")).is_err());
        assert_eq!(
            mapping.headers("RSTot CHOICES").unwrap(),
            vec!["Total Votes", "ALICE", "BOB", "CATHY"]
        );
    }
}
