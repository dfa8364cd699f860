//! Integration tests for tier matching and nearest-candidate selection.
//!
//! # Test Strategy
//!
//! 1. **Nearest selection**: specificity ordering, ties, fallback, empty input
//! 2. **Comparison modes**: literal vs resolved-address matching of node tiers
//! 3. **Thread safety**: concurrent nearest calls over shared candidates

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use locality::{
    AddressResolver, CompareMode, LocalityConfig, LocalityTier, MatchContext, ResolveError,
    StaticResolver, SystemResolver, TieredIdentity,
};

fn id(pairs: &[(&str, &str)]) -> TieredIdentity {
    TieredIdentity::from_pairs(pairs.iter().copied())
}

fn racks() -> Vec<TieredIdentity> {
    vec![
        id(&[("node", "A"), ("rack", "rack1")]),
        id(&[("node", "B"), ("rack", "rack2")]),
        id(&[("node", "C"), ("rack", "rack2")]),
    ]
}

// ============================================================================
// Nearest Selection Tests
// ============================================================================

#[test]
fn test_nearest_specificity_ordering() {
    let ctx = MatchContext::literal();
    let identities = racks();

    let nearest = |query: &[(&str, &str)]| id(query).nearest(&identities, &ctx).cloned();
    assert_eq!(nearest(&[("node", "D"), ("rack", "rack1")]), Some(identities[0].clone()));
    assert_eq!(nearest(&[("node", "B"), ("rack", "rack2")]), Some(identities[1].clone()));
    assert_eq!(nearest(&[("node", "C"), ("rack", "rack2")]), Some(identities[2].clone()));
    // No tier matches: first candidate in list order
    assert_eq!(nearest(&[("node", "D"), ("rack", "rack3")]), Some(identities[0].clone()));
}

#[test]
fn test_nearest_never_empty_for_non_empty_input() {
    let ctx = MatchContext::literal();
    let identities = racks();
    let stranger = id(&[("node", ""), ("rack", "")]);
    assert!(stranger.nearest(&identities, &ctx).is_some());
    assert!(stranger.nearest(&[], &ctx).is_none());
}

#[test]
fn test_nearest_three_tier_zone_fallback() {
    let ctx = MatchContext::literal();
    let candidates = vec![
        id(&[("node", "n1"), ("rack", "r1"), ("zone", "us-east-1a")]),
        id(&[("node", "n2"), ("rack", "r7"), ("zone", "us-west-2b")]),
        id(&[("node", "n3"), ("rack", "r8"), ("zone", "us-west-2b")]),
    ];
    let client = id(&[("node", "client-9"), ("rack", "r9"), ("zone", "us-west-2b")]);
    assert_eq!(client.nearest_index(&candidates, &ctx), Some(1));
}

#[test]
fn test_nearest_is_pure() {
    let ctx = MatchContext::literal();
    let identities = racks();
    let snapshot = identities.clone();
    let me = id(&[("node", "C"), ("rack", "rack2")]);
    let first = me.nearest_index(&identities, &ctx);
    let second = me.nearest_index(&identities, &ctx);
    assert_eq!(first, second);
    assert_eq!(identities, snapshot);
}

// ============================================================================
// Comparison Mode Tests
// ============================================================================

#[test]
fn test_resolution_mode_toggles_node_matching() {
    let resolver = StaticResolver::new().with_host("localhost", IpAddr::V4(Ipv4Addr::LOCALHOST));
    let resolving = MatchContext::with_resolver(CompareMode::ResolvedAddress, resolver.clone());
    let literal = MatchContext::with_resolver(CompareMode::Literal, resolver);

    let lt1 = LocalityTier::new("node", "localhost");
    let lt2 = LocalityTier::new("node", "127.0.0.1");
    assert!(lt1.matches(&lt2, &resolving));
    assert!(lt2.matches(&lt1, &resolving));
    assert!(!lt1.matches(&lt2, &literal));
}

#[test]
fn test_resolution_mode_steers_nearest() {
    let resolver = StaticResolver::new()
        .with_host("worker-1.internal", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        .with_host("worker-2.internal", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)));
    let ctx = MatchContext::with_resolver(CompareMode::ResolvedAddress, resolver);

    let workers = vec![
        id(&[("node", "worker-1.internal"), ("rack", "r1")]),
        id(&[("node", "worker-2.internal"), ("rack", "r2")]),
    ];
    let client = id(&[("node", "10.0.0.2"), ("rack", "r1")]);
    assert_eq!(client.nearest_index(&workers, &ctx), Some(1));
    assert_eq!(client.nearest_index(&workers, &MatchContext::literal()), Some(0));
}

#[test]
fn test_system_resolver_localhost() {
    let resolver = SystemResolver::new(Duration::from_secs(2));
    if resolver.resolve("localhost") != Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)) {
        // Host does not map localhost to 127.0.0.1.
        return;
    }
    let config = LocalityConfig {
        compare_node_ip: true,
        resolve_timeout_ms: 2000,
    };
    let lt1 = LocalityTier::new("node", "localhost");
    let lt2 = LocalityTier::new("node", "127.0.0.1");
    assert!(lt1.matches(&lt2, &MatchContext::from_config(&config)));
    assert!(!lt1.matches(&lt2, &MatchContext::from_config(&LocalityConfig::default())));
}

#[test]
fn test_unresolvable_node_falls_back_to_strings() {
    let ctx = MatchContext::resolving(Duration::from_millis(500));
    let lt1 = LocalityTier::new("node", "no-such-host.invalid");
    assert!(lt1.matches(&lt1.clone(), &ctx));
    assert!(!lt1.matches(&LocalityTier::new("node", "other-host.invalid"), &ctx));
}

#[test]
fn test_zero_timeout_is_treated_as_failure() {
    let resolver = SystemResolver::new(Duration::ZERO);
    let result = resolver.resolve("slow-host.invalid");
    assert!(
        matches!(
            result,
            Err(ResolveError::Timeout { .. })
                | Err(ResolveError::Lookup { .. })
                | Err(ResolveError::UnknownHost(_))
        ),
        "{:?}",
        result
    );

    let ctx = MatchContext::with_resolver(CompareMode::ResolvedAddress, SystemResolver::new(Duration::ZERO));
    let tier = LocalityTier::new("node", "slow-host.invalid");
    assert!(tier.matches(&tier.clone(), &ctx));
    assert!(!tier.matches(&LocalityTier::new("node", "other-host.invalid"), &ctx));
}

// ============================================================================
// Thread Safety Tests
// ============================================================================

#[test]
fn test_concurrent_nearest() {
    let ctx = MatchContext::literal();
    let identities = racks();
    let queries = [
        (id(&[("node", "D"), ("rack", "rack1")]), 0usize),
        (id(&[("node", "B"), ("rack", "rack2")]), 1),
        (id(&[("node", "C"), ("rack", "rack2")]), 2),
        (id(&[("node", "D"), ("rack", "rack3")]), 0),
    ];

    crossbeam::scope(|scope| {
        for (query, expected) in &queries {
            let ctx = &ctx;
            let identities = &identities;
            scope.spawn(move |_| {
                for _ in 0..100 {
                    assert_eq!(query.nearest_index(identities, ctx), Some(*expected));
                }
            });
        }
    })
    .unwrap();
}
