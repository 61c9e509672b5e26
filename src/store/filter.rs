use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::resources::{ClusterResource, ResourceSnapshot};

/// Namespace selection meaning "no namespace filter".
pub const ALL_NAMESPACES: &str = "All namespaces";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub selected_namespace: String,
    pub search_term: String,
    pub selected_cluster: Option<String>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            selected_namespace: ALL_NAMESPACES.to_string(),
            search_term: String::new(),
            selected_cluster: None,
        }
    }
}

impl FilterSelection {
    pub fn all_namespaces(&self) -> bool {
        self.selected_namespace == ALL_NAMESPACES
    }

    /// Namespace to push down to the backend, if any.
    pub fn namespace_filter(&self) -> Option<&str> {
        if self.all_namespaces() {
            None
        } else {
            Some(&self.selected_namespace)
        }
    }
}

/// Applies namespace equality then the search term, keeping snapshot order.
#[derive(Debug, Clone, Copy)]
pub struct RecordFilter<'a> {
    selection: &'a FilterSelection,
    search_matches_namespace: bool,
}

impl<'a> RecordFilter<'a> {
    pub fn new(selection: &'a FilterSelection, search_matches_namespace: bool) -> Self {
        Self {
            selection,
            search_matches_namespace,
        }
    }

    pub fn matches(&self, record: &impl ClusterResource) -> bool {
        self.matches_namespace(record) && self.matches_search(record)
    }

    pub fn matches_namespace(&self, record: &impl ClusterResource) -> bool {
        if self.selection.all_namespaces() {
            return true;
        }
        match record.namespace() {
            Some(ns) => ns == self.selection.selected_namespace,
            None => true,
        }
    }

    fn matches_search(&self, record: &impl ClusterResource) -> bool {
        let term = &self.selection.search_term;
        if term.is_empty() {
            return true;
        }
        if contains_ignore_case(record.name(), term) {
            return true;
        }
        self.search_matches_namespace
            && record
                .namespace()
                .is_some_and(|ns| contains_ignore_case(ns, term))
    }

    pub fn apply<'r, T: ClusterResource>(&self, records: &'r [T]) -> Vec<&'r T> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Sorted namespaces of the namespaced kinds, led by [`ALL_NAMESPACES`].
pub fn unique_namespaces(snapshot: &ResourceSnapshot) -> Vec<String> {
    let mut set = BTreeSet::new();
    let namespaced = snapshot
        .pods
        .iter()
        .map(|p| p.namespace.as_str())
        .chain(snapshot.deployments.iter().map(|d| d.namespace.as_str()))
        .chain(snapshot.services.iter().map(|s| s.namespace.as_str()));
    for ns in namespaced {
        if !ns.is_empty() {
            set.insert(ns);
        }
    }

    let mut out = Vec::with_capacity(set.len() + 1);
    out.push(ALL_NAMESPACES.to_string());
    out.extend(set.into_iter().map(str::to_string));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resources::{NodeRecord, PodRecord, ServiceRecord};

    fn pod(name: &str, ns: &str) -> PodRecord {
        PodRecord {
            name: name.to_string(),
            namespace: ns.to_string(),
            status: "Running".to_string(),
            ..Default::default()
        }
    }

    fn selection(ns: &str, term: &str) -> FilterSelection {
        FilterSelection {
            selected_namespace: ns.to_string(),
            search_term: term.to_string(),
            selected_cluster: None,
        }
    }

    #[test]
    fn namespace_filter_keeps_only_matching_records() {
        let pods = vec![pod("nginx-pod-1", "default"), pod("mysql-pod-1", "database")];
        let sel = selection("database", "");
        let got = RecordFilter::new(&sel, false).apply(&pods);

        assert_eq!(got, vec![&pods[1]]);
    }

    #[test]
    fn search_is_case_insensitive_on_name() {
        let pods = vec![
            pod("nginx-pod-1", "default"),
            pod("mysql-pod-1", "database"),
            pod("NGINX-canary", "edge"),
        ];
        let sel = selection(ALL_NAMESPACES, "NGINX");
        let got = RecordFilter::new(&sel, false).apply(&pods);

        assert_eq!(got, vec![&pods[0], &pods[2]]);
    }

    #[test]
    fn search_ignores_namespace_unless_enabled() {
        let pods = vec![pod("redis-pod-1", "cache")];
        let sel = selection(ALL_NAMESPACES, "CACHE");

        assert!(RecordFilter::new(&sel, false).apply(&pods).is_empty());
        assert_eq!(RecordFilter::new(&sel, true).apply(&pods).len(), 1);
    }

    #[test]
    fn cluster_scoped_records_skip_namespace_filter() {
        let nodes = vec![NodeRecord {
            name: "ip-10-0-1-23.ec2.internal".to_string(),
            ..Default::default()
        }];
        let sel = selection("database", "");

        assert_eq!(RecordFilter::new(&sel, false).apply(&nodes).len(), 1);
    }

    #[test]
    fn empty_namespace_does_not_match_a_selected_namespace() {
        let pods = vec![pod("orphan", "")];
        let sel = selection("default", "");

        assert!(RecordFilter::new(&sel, false).apply(&pods).is_empty());
    }

    #[test]
    fn unique_namespaces_are_sorted_and_exclude_nodes() {
        let snapshot = ResourceSnapshot {
            pods: vec![pod("a", "zeta"), pod("b", "alpha"), pod("c", "zeta")],
            services: vec![ServiceRecord {
                name: "svc".to_string(),
                namespace: "middle".to_string(),
                ..Default::default()
            }],
            nodes: vec![NodeRecord {
                name: "node".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        assert_eq!(
            unique_namespaces(&snapshot),
            vec![ALL_NAMESPACES, "alpha", "middle", "zeta"]
        );
    }

    #[test]
    fn unique_namespaces_of_empty_snapshot_is_just_the_sentinel() {
        assert_eq!(
            unique_namespaces(&ResourceSnapshot::default()),
            vec![ALL_NAMESPACES]
        );
    }
}
