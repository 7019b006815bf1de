// Search term grouping - pure logic plus the provider seam used by Jump Back In.

use std::collections::HashMap;

use futures_util::future::{BoxFuture, FutureExt};

use crate::state::{Tab, TabGroup};

const MIN_TABS_PER_GROUP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrdering {
    /// Most recently used group first.
    Descending,
    Ascending,
}

/// Supplies tab groups for a set of tabs.
pub trait TabGroupProvider: Send + Sync {
    fn tab_groups(&self, tabs: Vec<Tab>, ordering: GroupOrdering) -> BoxFuture<'static, Vec<TabGroup>>;
}

/// Groups tabs that were opened from the same search.
#[derive(Debug, Default, Clone)]
pub struct SearchTermGroups;

impl TabGroupProvider for SearchTermGroups {
    fn tab_groups(&self, tabs: Vec<Tab>, ordering: GroupOrdering) -> BoxFuture<'static, Vec<TabGroup>> {
        async move {
            let (groups, _) = group_by_search_term(tabs, ordering);
            groups
        }
        .boxed()
    }
}

/// Split tabs into search term groups and the tabs that belong to none.
///
/// Terms match case-insensitively after trimming. A term needs at least two tabs
/// to form a group. Tabs keep their input order inside a group and in the
/// ungrouped list; groups are sorted by their most recent tab.
pub fn group_by_search_term(tabs: Vec<Tab>, ordering: GroupOrdering) -> (Vec<TabGroup>, Vec<Tab>) {
    let keys: Vec<Option<String>> = tabs.iter().map(group_key).collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_default() += 1;
    }

    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Tab>> = HashMap::new();
    let mut ungrouped = Vec::new();

    for (tab, key) in tabs.into_iter().zip(keys.iter()) {
        match key {
            Some(key) if counts.get(key.as_str()).copied().unwrap_or(0) >= MIN_TABS_PER_GROUP => {
                if !buckets.contains_key(key) {
                    order.push(key.clone());
                }
                buckets.entry(key.clone()).or_default().push(tab);
            }
            _ => ungrouped.push(tab),
        }
    }

    let mut groups = Vec::new();
    for key in order {
        let Some(members) = buckets.remove(&key) else { continue };
        let Some(timestamp) = members.iter().map(|t| t.last_executed).max() else { continue };
        let search_term = members[0].search_term.as_deref().unwrap_or(&key).trim().to_string();

        groups.push(TabGroup {
            search_term,
            grouped_items: members,
            timestamp,
        });
    }

    match ordering {
        GroupOrdering::Descending => groups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        GroupOrdering::Ascending => groups.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
    }

    log::debug!("[TabGroups] Built {} groups, {} ungrouped tabs", groups.len(), ungrouped.len());
    (groups, ungrouped)
}

fn group_key(tab: &Tab) -> Option<String> {
    tab.search_term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}
