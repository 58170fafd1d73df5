use crate::identifier::{format_id, IdPattern};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One rename: `from` becomes `to`, both bare filenames within one directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub from: String,
    pub to: String,
}

impl PlanEntry {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// How new names are built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingOptions {
    /// Leading text of every new name
    pub target_prefix: String,
    /// Text placed between the target prefix and the numeric ID
    pub id_prefix: String,
    /// First numeric ID handed out
    pub start: u64,
    /// Increment between groups
    pub step: u64,
    /// Minimum digit count, zero padded
    pub width: usize,
}

impl Default for NamingOptions {
    fn default() -> Self {
        Self {
            target_prefix: String::new(),
            id_prefix: "i".to_string(),
            start: 10,
            step: 10,
            width: 4,
        }
    }
}

/// Ordered renames for one directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub entries: Vec<PlanEntry>,
    /// Numeric ID given to the last group, `None` when nothing was grouped
    pub last_id: Option<u64>,
    /// Number of IDs handed out
    pub groups: usize,
}

impl RenamePlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Assign sequential IDs to the candidates, one per identifier group.
///
/// Candidates are visited in order. The first unconsumed candidate carrying
/// an identifier opens a group: it and every later unconsumed candidate that
/// starts with the same full identifier receive the current ID, keeping
/// whatever followed the identifier. The ID then advances by `step`.
/// Candidates without an identifier are left alone.
pub fn plan_renames<S: AsRef<str>>(
    candidates: &[S],
    pattern: &IdPattern,
    naming: &NamingOptions,
) -> RenamePlan {
    let mut plan = RenamePlan::default();
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut current = naming.start;

    for (i, candidate) in candidates.iter().enumerate() {
        if consumed.contains(&i) {
            continue;
        }
        let Some(full_id) = pattern.full_identifier(candidate.as_ref()) else {
            continue;
        };

        let stub = format!(
            "{}{}{}",
            naming.target_prefix,
            naming.id_prefix,
            format_id(current, naming.width)
        );

        let mut used = false;
        for (j, member) in candidates.iter().enumerate().skip(i) {
            let member = member.as_ref();
            if consumed.contains(&j) || !member.starts_with(full_id) {
                continue;
            }
            plan.entries.push(PlanEntry::new(
                member,
                format!("{stub}{}", &member[full_id.len()..]),
            ));
            consumed.insert(j);
            used = true;
        }

        if used {
            plan.last_id = Some(current);
            plan.groups += 1;
            current = current.saturating_add(naming.step);
        }
    }

    plan
}

/// Insert `__<tag>` before the extension of `name`, or append it when there
/// is no extension
pub fn tagged_name(name: &str, tag: &str) -> String {
    match name.rfind('.') {
        Some(dot) => format!("{}__{}{}", &name[..dot], tag, &name[dot..]),
        None => format!("{name}__{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::DEFAULT_ID_REGEX;

    fn naming(prefix: &str, id_prefix: &str, start: u64, step: u64, width: usize) -> NamingOptions {
        NamingOptions {
            target_prefix: prefix.to_string(),
            id_prefix: id_prefix.to_string(),
            start,
            step,
            width,
        }
    }

    #[test]
    fn test_groups_share_an_id() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let candidates = ["a_10.jpg", "c_10_a.jpg", "a_10_a.jpg"];

        let plan = plan_renames(&candidates, &pattern, &naming("b_1965", "_i", 10, 4, 4));

        assert_eq!(
            plan.entries,
            vec![
                PlanEntry::new("a_10.jpg", "b_1965_i0010.jpg"),
                PlanEntry::new("a_10_a.jpg", "b_1965_i0010_a.jpg"),
                PlanEntry::new("c_10_a.jpg", "b_1965_i0014_a.jpg"),
            ]
        );
        assert_eq!(plan.last_id, Some(14));
        assert_eq!(plan.groups, 2);
    }

    #[test]
    fn test_unmatched_names_do_not_advance() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let candidates = ["readme.txt", "x_200.png", "cover.jpg", "y_300.png"];

        let plan = plan_renames(&candidates, &pattern, &naming("p_", "", 1, 1, 3));

        assert_eq!(
            plan.entries,
            vec![
                PlanEntry::new("x_200.png", "p_001.png"),
                PlanEntry::new("y_300.png", "p_002.png"),
            ]
        );
    }

    #[test]
    fn test_members_follow_list_order_not_name_order() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let candidates = ["g_50_z.jpg", "h_60.jpg", "g_50_a.jpg", "g_50.jpg"];

        let plan = plan_renames(&candidates, &pattern, &naming("n", "", 10, 10, 2));

        let pairs: Vec<(&str, &str)> = plan
            .entries
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("g_50_z.jpg", "n10_z.jpg"),
                ("g_50_a.jpg", "n10_a.jpg"),
                ("g_50.jpg", "n10.jpg"),
                ("h_60.jpg", "n20.jpg"),
            ]
        );
    }

    #[test]
    fn test_earlier_entries_never_join_a_later_group() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        // `a_10.jpg` does not start with `a_100`, so it opens its own group
        let candidates = ["a_100.jpg", "a_10.jpg"];

        let plan = plan_renames(&candidates, &pattern, &naming("", "i", 10, 10, 4));

        assert_eq!(
            plan.entries,
            vec![
                PlanEntry::new("a_100.jpg", "i0010.jpg"),
                PlanEntry::new("a_10.jpg", "i0020.jpg"),
            ]
        );
    }

    #[test]
    fn test_prefix_equality_pulls_in_longer_ids() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let candidates = ["a_10.jpg", "a_100.jpg"];

        let plan = plan_renames(&candidates, &pattern, &naming("", "i", 10, 10, 4));

        assert_eq!(
            plan.entries,
            vec![
                PlanEntry::new("a_10.jpg", "i0010.jpg"),
                PlanEntry::new("a_100.jpg", "i00100.jpg"),
            ]
        );
    }

    #[test]
    fn test_width_overflow_grows_the_id() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let candidates = ["a_11.jpg", "b_22.jpg"];

        let plan = plan_renames(&candidates, &pattern, &naming("", "", 95, 10, 2));

        assert_eq!(plan.entries[0].to, "95.jpg");
        assert_eq!(plan.entries[1].to, "105.jpg");
    }

    #[test]
    fn test_empty_candidates_give_empty_plan() {
        let pattern = IdPattern::new(DEFAULT_ID_REGEX).unwrap();
        let empty: [&str; 0] = [];
        let plan = plan_renames(&empty, &pattern, &NamingOptions::default());
        assert!(plan.is_empty());
        assert_eq!(plan.last_id, None);
    }

    #[test]
    fn test_tagged_name() {
        assert_eq!(tagged_name("fssort.ini", "2024_01_02"), "fssort__2024_01_02.ini");
        assert_eq!(tagged_name("fssort", "2024"), "fssort__2024");
        assert_eq!(
            tagged_name("rename_history.csv", "2024_01_02_03_04_05"),
            "rename_history__2024_01_02_03_04_05.csv"
        );
    }
}
