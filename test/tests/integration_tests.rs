//! # Confidential Aggregation: Integration Tests
//!
//! End-to-end tests over the aggregator, reference engine and gateway:
//! - property-based tests for batch alternation, aggregate correctness,
//!   replay immunity, tamper detection, cooldowns and authorization
//! - state exploration with invariant verification
//! - the operating scenarios, step by step

extern crate std;

use proptest::prelude::*;
use soroban_sdk::Bytes;

use confidential_aggregator::AggregatorError;
use test_framework::generators::*;
use test_framework::invariants::*;
use test_framework::state_explorer::*;
use test_framework::*;

// ═════════════════════════════════════════════════════════════════════════════
//  Property-Based Tests
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    /// **Property**: open/close strictly alternate; an out-of-turn call fails
    /// `InvalidArgument` and leaves state unchanged.
    #[test]
    fn prop_batches_alternate(opens in prop::collection::vec(any::<bool>(), 1..=12)) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, None);
        let owner = harness.owner.clone();

        for open in opens {
            let before = harness.snapshot(&[], &[]);
            let result = if open { harness.open_batch(&owner) } else { harness.close_batch(&owner) };

            if open != before.batch_open {
                let id = result.unwrap();
                let expected = if open { before.current_batch_id + 1 } else { before.current_batch_id };
                prop_assert_eq!(id, expected);
                prop_assert_eq!(harness.client.is_batch_open(), open);
            } else {
                prop_assert_eq!(result, Err(AggregatorError::InvalidArgument));
                prop_assert_eq!(harness.snapshot(&[], &[]), before);
            }
        }
    }

    /// **Property**: the revealed total equals the sum of every submission,
    /// including repeats by the same user.
    #[test]
    fn prop_aggregate_is_sum(
        values in contribution_batch_strategy(12),
        repeat_user in any::<bool>(),
    ) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, Some(1));
        let provider = harness.create_provider();
        let users = env.generate_addresses(values.len());

        let batch = harness.open_batch(&provider).unwrap();
        for (i, value) in values.iter().enumerate() {
            let user = if repeat_user { &users[0] } else { &users[i] };
            harness.submit(&provider, user, *value).unwrap();
            env.advance_time(1);
        }
        harness.close_batch(&provider).unwrap();

        let request_id = harness.request_decryption(&provider, batch).unwrap();
        let total = harness.fulfill(request_id).unwrap();
        prop_assert_eq!(total, values.iter().sum::<i128>());
    }

    /// **Property**: any second delivery for a completed request fails
    /// `ReplayAttempt` and changes nothing.
    #[test]
    fn prop_replay_always_rejected(
        value in contribution_strategy(),
        cleartext in cleartext_strategy(),
        proof in proof_strategy(),
    ) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, None);
        let owner = harness.owner.clone();
        let user = env.generate_address();

        let batch = harness.open_batch(&owner).unwrap();
        harness.submit(&owner, &user, value).unwrap();
        harness.close_batch(&owner).unwrap();
        let request_id = harness.request_decryption(&owner, batch).unwrap();
        prop_assert_eq!(harness.fulfill(request_id), Ok(value));
        prop_assert_eq!(harness.published_events(), 1);

        let before = harness.snapshot(&[], &[request_id]);
        let cleartext = Bytes::from_slice(&env.env, &cleartext);
        let proof = Bytes::from_array(&env.env, &proof);
        prop_assert_eq!(
            harness.callback(request_id, &cleartext, &proof),
            Err(AggregatorError::ReplayAttempt)
        );
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(harness.fulfill(request_id), Err(AggregatorError::ReplayAttempt));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(harness.snapshot(&[], &[request_id]), before);
    }

    /// **Property**: a submission between request and delivery makes the
    /// delivery fail `StateMismatch`, even with a valid proof.
    #[test]
    fn prop_tampering_detected(
        first in contribution_strategy(),
        late in contribution_strategy(),
    ) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, None);
        let owner = harness.owner.clone();

        let batch = harness.open_batch(&owner).unwrap();
        harness.submit(&owner, &env.generate_address(), first).unwrap();
        let request_id = harness.request_decryption(&owner, batch).unwrap();
        let (cleartext, proof) = harness.relay(request_id);

        env.advance_time(60);
        harness.submit(&owner, &env.generate_address(), late).unwrap();

        prop_assert!(harness.gateway.verify(&request_id, &cleartext, &proof));
        prop_assert_eq!(
            harness.callback(request_id, &cleartext, &proof),
            Err(AggregatorError::StateMismatch)
        );
        let ctx = harness.client.get_decryption_context(&request_id).unwrap();
        prop_assert!(!ctx.processed);
    }

    /// **Property**: a second submission by one provider succeeds exactly
    /// when the cooldown has elapsed.
    #[test]
    fn prop_cooldown_monotonic(cooldown in cooldown_strategy(), gap in 0u64..=7_200u64) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, Some(cooldown));
        let provider = harness.create_provider();
        let user = env.generate_address();

        harness.open_batch(&provider).unwrap();
        harness.submit(&provider, &user, 1).unwrap();
        env.advance_time(gap);

        let second = harness.submit(&provider, &user, 1);
        if gap >= cooldown {
            prop_assert_eq!(second, Ok(()));
            prop_assert_eq!(harness.client.last_submission_at(&provider), Some(env.timestamp()));
        } else {
            prop_assert_eq!(second, Err(AggregatorError::CooldownActive));
        }
    }

    /// **Property**: privileged calls from an unprivileged principal fail with
    /// the role error and leave state unchanged.
    #[test]
    fn prop_unprivileged_calls_rejected(value in contribution_strategy(), seconds in cooldown_strategy()) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, None);
        let owner = harness.owner.clone();
        harness.open_batch(&owner).unwrap();

        let stranger = env.generate_address();
        let provider = harness.create_provider();
        let before = harness.snapshot(&[stranger.clone(), provider.clone()], &[]);

        prop_assert_eq!(harness.close_batch(&stranger), Err(AggregatorError::NotProvider));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(harness.submit(&stranger, &stranger, value), Err(AggregatorError::NotProvider));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(harness.request_decryption(&stranger, 1), Err(AggregatorError::NotProvider));
        prop_assert_eq!(harness.published_events(), 0);

        prop_assert_eq!(flatten(harness.client.try_add_provider(&provider, &stranger)), Err(AggregatorError::NotOwner));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(flatten(harness.client.try_remove_provider(&provider, &provider)), Err(AggregatorError::NotOwner));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(flatten(harness.client.try_set_cooldown(&provider, &seconds)), Err(AggregatorError::NotOwner));
        prop_assert_eq!(harness.published_events(), 0);
        prop_assert_eq!(flatten(harness.client.try_pause(&stranger)), Err(AggregatorError::NotOwner));
        prop_assert_eq!(harness.published_events(), 0);

        prop_assert_eq!(harness.snapshot(&[stranger.clone(), provider.clone()], &[]), before);
        prop_assert_eq!(harness.client.get_contribution(&1, &stranger), None);
    }

    /// **Property**: invariants hold after arbitrary action sequences.
    #[test]
    fn prop_invariants_hold_under_random_actions(
        actions in aggregator_action_sequence(4, 3, 25),
    ) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, Some(30));
        let config = ExplorerConfig { max_steps: 25, fail_fast: true, record_snapshots: false };
        let mut explorer = StateExplorer::new(&harness, InvariantSet::aggregation_defaults(), config, 2, 3);

        let result = explorer.explore(&actions);
        prop_assert!(result.passed(),
            "Invariant violations: {:?}", result.summary.invariant_violations);
    }

    /// **Property**: replayed usage patterns never violate invariants.
    #[test]
    fn prop_usage_patterns_hold(pattern in usage_pattern_strategy()) {
        let env = TestEnv::new();
        let harness = AggregationHarness::new(&env, None);
        let mut explorer = StateExplorer::with_defaults(&harness, 2, 2);

        let result = explorer.explore(&pattern_to_actions(&pattern));
        prop_assert!(result.passed(),
            "{:?}: {:?}", pattern, result.summary.invariant_violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════════
//  Scenarios
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_scenario_reveal_batch_total() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let provider = harness.create_provider();
    let (alice, bob) = (env.generate_address(), env.generate_address());

    assert_eq!(harness.open_batch(&harness.owner), Ok(1));
    harness.submit(&provider, &alice, 5).unwrap();
    env.advance_time(60);
    harness.submit(&provider, &bob, 3).unwrap();
    assert_eq!(harness.close_batch(&provider), Ok(1));

    let request_id = harness.request_decryption(&provider, 1).unwrap();
    assert_eq!(harness.fulfill(request_id), Ok(8));

    let ctx = harness.client.get_decryption_context(&request_id).unwrap();
    assert!(ctx.processed);
    let result = harness.client.get_decryption_result(&request_id).unwrap();
    assert_eq!((result.request_id, result.batch_id, result.total), (request_id, 1, 8));
}

#[test]
fn test_scenario_replayed_callback() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let owner = harness.owner.clone();

    harness.open_batch(&owner).unwrap();
    harness.submit(&owner, &env.generate_address(), 8).unwrap();
    harness.close_batch(&owner).unwrap();
    let request_id = harness.request_decryption(&owner, 1).unwrap();

    let (cleartext, proof) = harness.relay(request_id);
    assert_eq!(harness.callback(request_id, &cleartext, &proof), Ok(8));
    assert_eq!(
        harness.callback(request_id, &encode_total(&env.env, 8), &proof),
        Err(AggregatorError::ReplayAttempt)
    );
}

#[test]
fn test_scenario_submission_after_request() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let provider = harness.create_provider();

    harness.open_batch(&provider).unwrap();
    harness.close_batch(&provider).unwrap();
    assert_eq!(harness.open_batch(&provider), Ok(2));

    harness.submit(&provider, &env.generate_address(), 10).unwrap();
    let request_id = harness.request_decryption(&provider, 2).unwrap();
    let (cleartext, proof) = harness.relay(request_id);

    env.advance_time(60);
    harness.submit(&provider, &env.generate_address(), 1).unwrap();
    assert_eq!(
        harness.callback(request_id, &cleartext, &proof),
        Err(AggregatorError::StateMismatch)
    );
}

#[test]
fn test_scenario_stranger_submission() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    harness.open_batch(&harness.owner).unwrap();

    let stranger = env.generate_address();
    let user = env.generate_address();
    assert_eq!(harness.submit(&stranger, &user, 4), Err(AggregatorError::NotProvider));
    assert_eq!(harness.client.get_contribution(&1, &user), None);
    assert_eq!(harness.batch_total(1), Some(0));
}

#[test]
fn test_scenario_double_open() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let provider = harness.create_provider();

    harness.open_batch(&provider).unwrap();
    assert_eq!(harness.open_batch(&provider), Err(AggregatorError::InvalidArgument));
    assert_eq!(harness.client.current_batch_id(), 1);
}

#[test]
fn test_scenario_zero_cooldown() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, Some(45));
    assert_eq!(
        flatten(harness.client.try_set_cooldown(&harness.owner, &0)),
        Err(AggregatorError::InvalidArgument)
    );
    assert_eq!(harness.client.get_cooldown(), 45);
}

// ═════════════════════════════════════════════════════════════════════════════
//  Invariant & Explorer Tests
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_all_invariants_hold_on_fresh_contract() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    InvariantSet::aggregation_defaults().assert_all(&harness.snapshot(&[], &[]));
}

#[test]
fn test_double_submission_pinned() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let owner = harness.owner.clone();
    let user = env.generate_address();

    harness.open_batch(&owner).unwrap();
    let before = harness.snapshot(&[], &[]);
    harness.submit(&owner, &user, 4).unwrap();
    env.advance_time(60);
    let middle = harness.snapshot(&[], &[]);
    harness.submit(&owner, &user, 6).unwrap();
    let after = harness.snapshot(&[], &[]);

    let first = ContributionAccumulates { batch_id: 1, value: 4 };
    let second = ContributionAccumulates { batch_id: 1, value: 6 };
    assert!(first.check(&before, &middle).is_ok());
    assert!(second.check(&middle, &after).is_ok());
    assert_eq!(harness.batch_total(1), Some(10));
}

#[test]
fn test_rejection_detected_by_unchanged() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let before = harness.snapshot(&[], &[]);
    harness.open_batch(&harness.owner).unwrap();
    let after = harness.snapshot(&[], &[]);

    // A successful open is a real change.
    assert!(Unchanged.check(&before, &after).is_err());
    assert!(BatchIdMonotonic.check(&before, &after).is_ok());
    assert!(BatchIdMonotonic.check(&after, &before).is_err());
}

#[test]
fn test_explorer_single_batch_reveal() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let config = ExplorerConfig { record_snapshots: true, ..ExplorerConfig::default() };
    let mut explorer = StateExplorer::new(&harness, InvariantSet::aggregation_defaults(), config, 1, 2);

    let result = explorer.explore(&pattern_to_actions(&UsagePattern::SingleBatchReveal));
    assert!(result.passed(), "{:?}", result.summary.invariant_violations);
    assert_eq!(result.snapshots.len(), 8);
    assert_eq!(result.request_ids.len(), 1);
    let ctx = result.snapshots.last().unwrap().context_of(result.request_ids[0]).unwrap();
    assert!(ctx.processed);
    assert!(result.action_log.iter().all(|(_, o)| *o == ActionOutcome::Ok));
}

#[test]
fn test_explorer_records_expected_rejections() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let mut explorer = StateExplorer::with_defaults(&harness, 1, 2);

    let late = explorer.explore(&pattern_to_actions(&UsagePattern::LateSubmission));
    assert!(late.passed(), "{:?}", late.summary.invariant_violations);
    assert_eq!(
        late.action_log.last().unwrap().1,
        ActionOutcome::ExpectedError(AggregatorError::StateMismatch as u32)
    );
}

#[test]
fn test_explorer_double_delivery_and_incident() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let mut explorer = StateExplorer::with_defaults(&harness, 1, 1);

    let replay = explorer.explore(&pattern_to_actions(&UsagePattern::DoubleDelivery));
    assert!(replay.passed(), "{:?}", replay.summary.invariant_violations);
    assert_eq!(
        replay.action_log.last().unwrap().1,
        ActionOutcome::ExpectedError(AggregatorError::ReplayAttempt as u32)
    );

    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let mut explorer = StateExplorer::with_defaults(&harness, 1, 1);
    let incident = explorer.explore(&pattern_to_actions(&UsagePattern::IncidentResponse));
    assert!(incident.passed(), "{:?}", incident.summary.invariant_violations);
    // The removed provider's later submission is refused.
    assert_eq!(
        incident.action_log[6].1,
        ActionOutcome::ExpectedError(AggregatorError::NotProvider as u32)
    );
}

#[test]
fn test_explorer_coverage_tracking() {
    let env = TestEnv::new();
    let harness = AggregationHarness::new(&env, None);
    let mut explorer = StateExplorer::with_defaults(&harness, 1, 2);

    let mut actions = pattern_to_actions(&UsagePattern::SingleBatchReveal);
    actions.extend(pattern_to_actions(&UsagePattern::IncidentResponse));
    actions.push(AggregatorAction::SetCooldown { seconds: 10 });
    actions.push(AggregatorAction::AddProvider { principal_index: 1 });

    let result = explorer.explore(&actions);
    assert!(result.passed(), "{:?}", result.summary.invariant_violations);
    let coverage = result.summary.entry_point_coverage(AGGREGATOR_ENTRY_POINTS.len());
    assert!(coverage >= 1.0, "coverage {}", coverage);
}
