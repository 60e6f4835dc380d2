use log::debug;
use snafu::prelude::*;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::catalog::{Identified, ResultStyle, VotingGroup};
use crate::error::*;

/// Id of the aggregate area of a contest.
pub const ALL_AREA_ID: &str = "ALL";

/// A geographic or precinct area results are reported for.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Area {
    pub id: String,
    pub classification: Option<String>,
    pub name: String,
    pub short_name: Option<String>,
    pub is_vbm: bool,
    /// For a district: the areas whose results are reported under it, in
    /// report order.
    pub consolidated_ids: Vec<String>,
    /// The voting groups this area is broken down into. Empty means every
    /// voting group of the contest's result style.
    pub reporting_group_ids: Vec<String>,
}

impl Area {
    /// The aggregate area used when the definition does not declare one.
    pub fn all_area() -> Area {
        Area {
            id: ALL_AREA_ID.to_string(),
            name: "All Areas".to_string(),
            ..Default::default()
        }
    }

    pub fn is_all(&self) -> bool {
        self.id == ALL_AREA_ID
    }

    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

impl Identified for Area {
    const KIND: &'static str = "area";
    fn id(&self) -> &str {
        &self.id
    }
}

/// The key of one row of a results matrix.
#[derive(Debug, Clone)]
pub struct ReportingGroup {
    pub area: Arc<Area>,
    pub voting_group: Arc<VotingGroup>,
    /// Row position in the results matrix.
    pub index: usize,
}

impl ReportingGroup {
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.area.display_name(),
            self.voting_group.display_text
        )
    }

    fn key(&self) -> (&str, &str) {
        (&self.area.id, &self.voting_group.id)
    }
}

// Reporting groups are identified by their (area, voting group) pair only.
impl PartialEq for ReportingGroup {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ReportingGroup {}

impl Hash for ReportingGroup {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// The ordered row keys of a results matrix, with a reverse index.
///
/// Rows start with the aggregate area across every voting group of the
/// style, followed by the reporting groups of each reporting area in order.
#[derive(Debug, Clone)]
pub struct ReportingGroups {
    groups: Vec<ReportingGroup>,
    by_key: HashMap<(String, String), usize>,
    summary_len: usize,
}

impl ReportingGroups {
    pub fn enumerate(
        all_area: &Arc<Area>,
        areas: &[Arc<Area>],
        style: &ResultStyle,
    ) -> ResultsResult<ReportingGroups> {
        let mut res = ReportingGroups {
            groups: Vec::new(),
            by_key: HashMap::new(),
            summary_len: 0,
        };
        for vg in style.voting_groups() {
            res.push(all_area, vg)?;
        }
        res.summary_len = res.groups.len();

        for area in areas.iter().filter(|a| !a.is_all()) {
            if area.reporting_group_ids.is_empty() {
                for vg in style.voting_groups() {
                    res.push(area, vg)?;
                }
            } else {
                for vg_id in area.reporting_group_ids.iter() {
                    let vg = style.get_voting_group(vg_id)?;
                    res.push(area, vg)?;
                }
            }
        }
        debug!(
            "enumerate: style {:?}: {} reporting groups ({} summary)",
            style.id,
            res.groups.len(),
            res.summary_len
        );
        Ok(res)
    }

    fn push(&mut self, area: &Arc<Area>, vg: &Arc<VotingGroup>) -> ResultsResult<()> {
        let index = self.groups.len();
        let key = (area.id.clone(), vg.id.clone());
        ensure!(
            !self.by_key.contains_key(&key),
            DuplicateIdSnafu {
                kind: "reporting group",
                id: format!("{}:{}", key.0, key.1)
            }
        );
        self.by_key.insert(key, index);
        self.groups.push(ReportingGroup {
            area: area.clone(),
            voting_group: vg.clone(),
            index,
        });
        Ok(())
    }

    pub fn find(&self, area_id: &str, vg_id: &str) -> Option<&ReportingGroup> {
        self.by_key
            .get(&(area_id.to_string(), vg_id.to_string()))
            .map(|idx| &self.groups[*idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportingGroup> {
        self.groups.iter()
    }

    pub fn as_slice(&self) -> &[ReportingGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of leading rows that belong to the aggregate area.
    pub fn summary_len(&self) -> usize {
        self.summary_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResultStatType;

    fn style() -> ResultStyle {
        ResultStyle::new(
            "RS",
            "",
            false,
            vec![Arc::new(ResultStatType::new("RSTot", "Total"))],
            vec![
                Arc::new(VotingGroup::new("TO", "Total")),
                Arc::new(VotingGroup::new("ED", "Election Day")),
                Arc::new(VotingGroup::new("MV", "Vote by Mail")),
            ],
        )
        .unwrap()
    }

    fn area(id: &str, groups: &[&str]) -> Arc<Area> {
        Arc::new(Area {
            id: id.to_string(),
            name: format!("Precinct {}", id),
            reporting_group_ids: groups.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn aggregate_area_comes_first() {
        let all = Arc::new(Area::all_area());
        let areas = vec![area("P1", &["ED", "MV"]), area("P2", &[])];
        let rgs = ReportingGroups::enumerate(&all, &areas, &style()).unwrap();

        let keys: Vec<(String, String, usize)> = rgs
            .iter()
            .map(|rg| (rg.area.id.clone(), rg.voting_group.id.clone(), rg.index))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("ALL".to_string(), "TO".to_string(), 0),
                ("ALL".to_string(), "ED".to_string(), 1),
                ("ALL".to_string(), "MV".to_string(), 2),
                ("P1".to_string(), "ED".to_string(), 3),
                ("P1".to_string(), "MV".to_string(), 4),
                ("P2".to_string(), "TO".to_string(), 5),
                ("P2".to_string(), "ED".to_string(), 6),
                ("P2".to_string(), "MV".to_string(), 7),
            ]
        );
        assert_eq!(rgs.summary_len(), 3);
        assert_eq!(rgs.find("P1", "MV").map(|rg| rg.index), Some(4));
        assert!(rgs.find("P1", "TO").is_none());
    }

    #[test]
    fn equality_ignores_index() {
        let all = Arc::new(Area::all_area());
        let vg = Arc::new(VotingGroup::new("TO", "Total"));
        let a = ReportingGroup {
            area: all.clone(),
            voting_group: vg.clone(),
            index: 0,
        };
        let b = ReportingGroup {
            area: all,
            voting_group: vg,
            index: 7,
        };
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_voting_group_fails() {
        let all = Arc::new(Area::all_area());
        let areas = vec![area("P1", &["EV"])];
        let res = ReportingGroups::enumerate(&all, &areas, &style());
        assert!(matches!(res, Err(ResultsError::UnknownVotingGroup { .. })));
    }

    #[test]
    fn duplicate_area_fails() {
        let all = Arc::new(Area::all_area());
        let areas = vec![area("P1", &["ED"]), area("P1", &["ED"])];
        let res = ReportingGroups::enumerate(&all, &areas, &style());
        assert!(matches!(res, Err(ResultsError::DuplicateId { .. })));
    }
}
