use std::collections::{HashMap, HashSet};

use crate::accumulator::StyleAccumulator;

#[derive(Clone, Debug)]
struct RuleGroup {
    id: String,
    rules: Vec<String>,
}

/// In-memory accumulator that groups rules by component id.
///
/// Every `(id, name)` pair is inserted at most once. The name registry
/// survives `reset`, so a component rendered again after its CSS was flushed
/// does not emit the same rules a second time.
#[derive(Clone, Debug, Default)]
pub struct RuleSheet {
    groups: Vec<RuleGroup>,
    group_index: HashMap<String, usize>,
    names: HashMap<String, HashSet<String>>,
}

impl RuleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_name_for_id(&self, id: &str, name: &str) -> bool {
        self.names.get(id).is_some_and(|names| names.contains(name))
    }

    /// Returns `false` (and inserts nothing) when `name` was already
    /// registered for `id`.
    pub fn insert_rules<I, S>(&mut self, id: &str, name: &str, rules: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.has_name_for_id(id, name) {
            return false;
        }
        self.names
            .entry(id.to_string())
            .or_default()
            .insert(name.to_string());
        let group = self.group_mut(id);
        group.rules.extend(rules.into_iter().map(Into::into));
        true
    }

    /// Unnamed rules (global styles); never deduplicated.
    pub fn push_rule(&mut self, id: &str, rule: impl Into<String>) {
        self.group_mut(id).rules.push(rule.into());
    }

    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.id.as_str())
    }

    fn group_mut(&mut self, id: &str) -> &mut RuleGroup {
        let idx = match self.group_index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.groups.push(RuleGroup {
                    id: id.to_string(),
                    rules: Vec::new(),
                });
                self.group_index.insert(id.to_string(), idx);
                idx
            }
        };
        &mut self.groups[idx]
    }
}

impl StyleAccumulator for RuleSheet {
    fn render(&self) -> String {
        let mut css = String::new();
        for group in &self.groups {
            for rule in &group.rules {
                css.push_str(rule);
            }
        }
        css
    }

    fn reset(&mut self) {
        self.groups.clear();
        self.group_index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_groups_in_first_insertion_order() {
        let mut sheet = RuleSheet::new();
        sheet.insert_rules("sc-a", "x1", [".x1{color:red}"]);
        sheet.insert_rules("sc-b", "y1", [".y1{margin:0}"]);
        sheet.insert_rules("sc-a", "x2", [".x2{color:blue}"]);
        assert_eq!(
            sheet.render(),
            ".x1{color:red}.x2{color:blue}.y1{margin:0}"
        );
        assert_eq!(sheet.group_ids().collect::<Vec<_>>(), ["sc-a", "sc-b"]);
    }

    #[test]
    fn duplicate_name_is_not_inserted_twice() {
        let mut sheet = RuleSheet::new();
        assert!(sheet.insert_rules("sc-a", "x1", [".x1{}"]));
        assert!(!sheet.insert_rules("sc-a", "x1", [".x1{}"]));
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn names_survive_reset() {
        let mut sheet = RuleSheet::new();
        sheet.insert_rules("sc-a", "x1", [".x1{}"]);
        assert_eq!(sheet.drain(), ".x1{}");
        assert!(sheet.is_empty());
        assert!(sheet.has_name_for_id("sc-a", "x1"));
        assert!(!sheet.insert_rules("sc-a", "x1", [".x1{}"]));
        assert_eq!(sheet.render(), "");
    }

    #[test]
    fn pushed_rules_are_kept_verbatim() {
        let mut sheet = RuleSheet::new();
        sheet.push_rule("global", "body{margin:0}");
        sheet.push_rule("global", "body{margin:0}");
        assert_eq!(sheet.render(), "body{margin:0}body{margin:0}");
    }
}
