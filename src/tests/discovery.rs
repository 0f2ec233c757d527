//! Tests for edge discovery against the in-memory record store

use super::helpers::*;
use crate::{
    config::AssociationConfig,
    discovery::discover,
    edge::Edge,
    properties::{Record, RelationKind},
    BuildonomyError,
};
use enumset::EnumSet;
use std::collections::BTreeSet;
use test_log::test;

fn edges(list: &[(&str, &str, RelationKind)]) -> BTreeSet<Edge> {
    list.iter()
        .map(|(p, c, r)| Edge::between(*p, *c, *r))
        .collect()
}

#[test(tokio::test)]
async fn test_discover_parents_and_children() {
    let store = create_test_graph();
    let found = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap();

    assert_eq!(found.root.id, "root");
    assert_eq!(
        found.edges,
        edges(&[
            ("p1", "root", RelationKind::Related),
            ("p2", "root", RelationKind::Derived),
            ("root", "c1", RelationKind::Related),
            ("root", "c1", RelationKind::Derived),
            ("root", "c2", RelationKind::Derived),
        ])
    );
    assert_eq!(found.parent_edges().count(), 2);
    assert_eq!(found.child_edges().count(), 3);
    // one query for root + parents, one for children
    assert_eq!(store.query_count(), 2);
}

#[test(tokio::test)]
async fn test_discovered_edges_carry_snapshots() {
    let store = create_test_graph();
    let found = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap();
    let edge = found
        .edges
        .iter()
        .find(|e| e.parent_id() == "p2")
        .unwrap();
    assert_eq!(edge.parent().relation_ids(RelationKind::Related), vec!["other"]);
    assert_eq!(edge.child().strings("title"), vec!["Record root"]);
}

#[test(tokio::test)]
async fn test_substring_match_is_not_an_edge() {
    let store = create_test_graph();
    let found = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap();
    assert!(found.edges.iter().all(|e| !e.touches("decoy")));
}

#[test(tokio::test)]
async fn test_root_without_edges_skips_child_query() {
    let store = create_test_store([Record::new("alone")]);
    let found = discover(&store, &AssociationConfig::default(), "alone")
        .await
        .unwrap();
    assert!(found.edges.is_empty());
    assert_eq!(store.query_count(), 1);
}

#[test(tokio::test)]
async fn test_dangling_child_reference_yields_no_edge() {
    let store = create_test_store([create_test_record("root", &["gone", "here"], &[]), Record::new("here")]);
    let found = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap();
    assert_eq!(found.edges, edges(&[("root", "here", RelationKind::Related)]));
}

#[test(tokio::test)]
async fn test_missing_root_is_not_found() {
    let store = create_test_graph();
    let err = discover(&store, &AssociationConfig::default(), "nope")
        .await
        .unwrap_err();
    assert!(matches!(err, BuildonomyError::NotFound(_)));
}

#[test(tokio::test)]
async fn test_query_failures_abort_discovery() {
    let store = create_test_graph();
    store.fail_query(0, BuildonomyError::BackendUnavailable("down".into()));
    let err = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap_err();
    assert_eq!(err, BuildonomyError::BackendUnavailable("down".into()));

    // the child query fails after the parent query succeeded
    store.fail_query(1, BuildonomyError::Federation("remote catalog".into()));
    let err = discover(&store, &AssociationConfig::default(), "root")
        .await
        .unwrap_err();
    assert_eq!(err, BuildonomyError::Federation("remote catalog".into()));
}

#[test(tokio::test)]
async fn test_disabled_relation_kind_is_ignored() {
    let store = create_test_graph();
    let config = AssociationConfig {
        relations: EnumSet::only(RelationKind::Related),
        ..Default::default()
    };
    let found = discover(&store, &config, "root").await.unwrap();
    assert_eq!(
        found.edges,
        edges(&[
            ("p1", "root", RelationKind::Related),
            ("root", "c1", RelationKind::Related),
        ])
    );
}

#[test(tokio::test)]
async fn test_self_reference() {
    let store = create_test_store([create_test_record("loop", &["loop"], &[])]);
    let found = discover(&store, &AssociationConfig::default(), "loop")
        .await
        .unwrap();
    assert_eq!(found.edges, edges(&[("loop", "loop", RelationKind::Related)]));
}
