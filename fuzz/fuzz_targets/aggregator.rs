#![no_main]

use std::collections::{BTreeMap, BTreeSet};

use arbitrary::Arbitrary;
use confidential_aggregator::{ConfidentialAggregator, ConfidentialAggregatorClient};
use decryption_gateway::{DecryptionGatewayContract, DecryptionGatewayContractClient};
use fhe_engine::{paillier::PaillierKeyPair, FheEngineContract, FheEngineContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Bytes, BytesN, Env,
};

/// Actions covering every aggregator entry point plus forged deliveries.
///
/// Values are bounded so batch totals stay below the engine's plaintext
/// modulus for any realistic corpus length.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    OpenBatch,
    CloseBatch,
    Submit { user: u8, value: u8 },
    /// Ciphertext 1: a valid encryption of 0 that `add` leaves unchanged.
    SubmitIdentity { user: u8 },
    RequestDecryption { batch_offset: u8 },
    Deliver { request: u8 },
    ForgeDelivery { request: u8, cleartext: [u8; 16], proof: [u8; 32] },
    AddProvider,
    RemoveProvider,
    SetCooldown { seconds: u8 },
    Pause,
    Unpause,
    AdvanceTime { delta: u16 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let relayer = Address::generate(&env);
    let owner = Address::generate(&env);

    let engine = FheEngineContractClient::new(&env, &env.register(FheEngineContract, ()));
    let keys = PaillierKeyPair::from_primes(1009, 1013).unwrap();
    engine.initialize(&admin, &relayer, &keys.public, &keys.private);

    let gateway =
        DecryptionGatewayContractClient::new(&env, &env.register(DecryptionGatewayContract, ()));
    gateway.initialize(&admin);
    gateway.add_relayer(&admin, &relayer);

    let client = ConfidentialAggregatorClient::new(&env, &env.register(ConfidentialAggregator, ()));
    if client
        .try_initialize(&owner, &engine.address, &gateway.address, &Some(10))
        .is_err()
    {
        return;
    }

    let mut principals = vec![owner.clone()];
    let users: Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    let mut requests: Vec<u64> = Vec::new();
    let mut processed: Vec<u64> = Vec::new();
    // Cleartext model of every batch aggregate.
    let mut sums: BTreeMap<u64, i128> = BTreeMap::new();
    // Requests overtaken by a later submission to their batch.
    let mut stale: BTreeSet<u64> = BTreeSet::new();

    for (i, action) in actions.into_iter().enumerate() {
        let caller = principals[i % principals.len()].clone();
        match action {
            FuzzAction::OpenBatch => {
                if let Ok(Ok(id)) = client.try_open_batch(&caller) {
                    sums.insert(id, 0);
                }
            }
            FuzzAction::CloseBatch => {
                let _ = client.try_close_batch(&caller);
            }
            FuzzAction::Submit { user, value } => {
                let user = &users[user as usize % users.len()];
                let batch = client.current_batch_id();
                let handle = engine.encrypt(&(value as i128));
                if let Ok(Ok(())) = client.try_submit_contribution(&caller, user, &handle) {
                    *sums.entry(batch).or_insert(0) += value as i128;
                    assert_eq!(client.get_contribution(&batch, user), Some(handle));
                    mark_stale(&client, &requests, batch, &mut stale);
                }
            }
            FuzzAction::SubmitIdentity { user } => {
                let user = &users[user as usize % users.len()];
                let batch = client.current_batch_id();
                let mut raw = engine.encrypt(&0).to_array();
                raw[16..].copy_from_slice(&1i128.to_be_bytes());
                let handle = BytesN::from_array(&env, &raw);
                if let Ok(Ok(())) = client.try_submit_contribution(&caller, user, &handle) {
                    mark_stale(&client, &requests, batch, &mut stale);
                }
            }
            FuzzAction::RequestDecryption { batch_offset } => {
                let batch = client.current_batch_id().saturating_sub(batch_offset as u64 % 3);
                if let Ok(Ok(id)) = client.try_request_decryption(&caller, &batch) {
                    assert!(!requests.contains(&id), "request id reused");
                    requests.push(id);
                }
            }
            FuzzAction::Deliver { request } => {
                if let Some(id) = requests.get(request as usize % requests.len().max(1)) {
                    let exported = gateway.get_request(id).handles.get(0).unwrap();
                    let mut raw = [0u8; 32];
                    exported.copy_into_slice(&mut raw);
                    let total = engine.decrypt(&relayer, &BytesN::from_array(&env, &raw));
                    let cleartext = Bytes::from_array(&env, &total.to_be_bytes());
                    let proof = match gateway.get_attestation(id) {
                        Some(a) => a.digest.into(),
                        None => gateway.attest(&relayer, id, &cleartext),
                    };
                    let was_processed = processed.contains(id);
                    match client.try_on_decryption_callback(id, &cleartext, &proof) {
                        Ok(Ok(revealed)) => {
                            assert!(!was_processed, "request {} completed twice", id);
                            assert!(!stale.contains(id), "request {} completed on a stale snapshot", id);
                            let ctx = client.get_decryption_context(id).unwrap();
                            assert_eq!(revealed, sums[&ctx.batch_id]);
                            processed.push(*id);
                        }
                        _ => assert!(
                            was_processed || !client.get_decryption_context(id).unwrap().processed
                        ),
                    }
                }
            }
            FuzzAction::ForgeDelivery { request, cleartext, proof } => {
                let id = requests.get(request as usize % requests.len().max(1)).copied().unwrap_or(1);
                let before = client.get_decryption_context(&id);
                let attested = gateway.get_attestation(&id).map(|a| a.digest.to_array());
                let forged = Bytes::from_array(&env, &proof);
                let result = client.try_on_decryption_callback(
                    &id,
                    &Bytes::from_array(&env, &cleartext),
                    &forged,
                );
                if attested != Some(proof) {
                    assert!(result.is_err(), "forged proof accepted");
                    assert_eq!(client.get_decryption_context(&id), before);
                } else if let Ok(Ok(_)) = result {
                    assert!(!stale.contains(&id), "request {} completed on a stale snapshot", id);
                    processed.push(id);
                }
            }
            FuzzAction::AddProvider => {
                let p = Address::generate(&env);
                client.add_provider(&owner, &p);
                principals.push(p);
            }
            FuzzAction::RemoveProvider => {
                if principals.len() > 1 {
                    let p = principals.pop().unwrap();
                    client.remove_provider(&owner, &p);
                }
            }
            FuzzAction::SetCooldown { seconds } => {
                let r = client.try_set_cooldown(&owner, &(seconds as u64));
                assert_eq!(r.is_ok(), seconds > 0);
            }
            FuzzAction::Pause => {
                let _ = client.try_pause(&owner);
            }
            FuzzAction::Unpause => {
                client.unpause(&owner);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let current = client.current_batch_id();
        if client.is_batch_open() {
            assert!(current >= 1, "INVARIANT VIOLATION: open batch with id 0");
            let aggregate = client.get_aggregate(&current).unwrap();
            assert!(engine.is_initialized(&aggregate), "INVARIANT VIOLATION: open batch without aggregate");
        }
        for (batch, sum) in &sums {
            let aggregate = client.get_aggregate(batch).unwrap();
            assert_eq!(engine.decrypt(&relayer, &aggregate), *sum, "INVARIANT VIOLATION: aggregate drifted");
        }
        for id in &processed {
            let ctx = client.get_decryption_context(id).unwrap();
            assert!(ctx.processed, "INVARIANT VIOLATION: request {} reverted to pending", id);
        }
        assert!(client.is_provider(&owner), "INVARIANT VIOLATION: owner lost provider role");
    }
});

/// Marks every pending request on `batch` as overtaken.
fn mark_stale(
    client: &ConfidentialAggregatorClient,
    requests: &[u64],
    batch: u64,
    stale: &mut BTreeSet<u64>,
) {
    for id in requests {
        if let Some(ctx) = client.get_decryption_context(id) {
            if ctx.batch_id == batch && !ctx.processed {
                stale.insert(*id);
            }
        }
    }
}
