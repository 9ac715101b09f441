//! Stress test: one verification engine shared by many threads, and
//! readers resolving pointers while a writer extends the chain.

use std::sync::{Arc, RwLock};
use std::thread;

use ledger_identity::{
    Claim, Command, LifecycleCommand, LinearPointer, LinearState, LocalIdentity, Pointer, Record,
    SignedTransaction, TransactionBuilder, Vault, VerificationEngine,
};

#[test]
fn stress_8_threads_share_one_engine() {
    let engine = Arc::new(VerificationEngine::standard());
    let mut handles = Vec::new();

    for t in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let identity = LocalIdentity::new(format!("worker-{t}"));
            let mut accepted = 0;
            for i in 0..50_i64 {
                let claim = Claim::self_issued(identity.party(), format!("metric-{i}"), i);
                let tx = TransactionBuilder::new()
                    .output(&claim)
                    .unwrap()
                    .command(Command::for_state::<Claim<i64>>(
                        LifecycleCommand::Issue,
                        vec![identity.public_key()],
                    ))
                    .build();
                let signed = SignedTransaction::new(tx).sign(&identity);
                signed
                    .verify(&engine)
                    .unwrap_or_else(|e| panic!("thread {t} tx {i} should verify: {e}"));
                accepted += 1;
            }
            accepted
        }));
    }

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 400);
}

#[test]
fn stress_readers_never_see_two_heads() {
    let issuer = LocalIdentity::new("writer");
    let engine = VerificationEngine::standard();
    let vault = Arc::new(RwLock::new(Vault::new()));

    let claim = Claim::self_issued(issuer.party(), "sequence", 0_u64);
    let chain_id = claim.linear_id().clone();
    let tx = TransactionBuilder::new()
        .output(&claim)
        .unwrap()
        .command(Command::for_state::<Claim<u64>>(
            LifecycleCommand::Issue,
            vec![issuer.public_key()],
        ))
        .build();
    vault.write().unwrap().record_transaction(&tx).unwrap();
    let mut current = Record::new(claim, tx.out_ref(0));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let vault = Arc::clone(&vault);
        let pointer = LinearPointer::<Claim<u64>>::new(chain_id.clone());
        readers.push(thread::spawn(move || {
            let mut last_seen = 0;
            for _ in 0..200 {
                let guard = vault.read().unwrap();
                let head = pointer
                    .resolve_local(&guard)
                    .expect("a chain never has two live heads")
                    .expect("the chain is never revoked");
                let value = *head.state.value();
                assert!(value >= last_seen, "versions must not go backwards");
                last_seen = value;
            }
            last_seen
        }));
    }

    for i in 1..=100_u64 {
        let next = current.state.amend(current.reference, i);
        let tx = TransactionBuilder::new()
            .input(&current)
            .unwrap()
            .output(&next)
            .unwrap()
            .command(Command::for_state::<Claim<u64>>(
                LifecycleCommand::Amend,
                vec![issuer.public_key()],
            ))
            .build();
        let signed = SignedTransaction::new(tx).sign(&issuer);
        signed.verify(&engine).unwrap();
        vault.write().unwrap().record_transaction(&signed.tx).unwrap();
        current = Record::new(next, signed.tx.out_ref(0));
    }

    for reader in readers {
        let last_seen = reader.join().unwrap();
        assert!(last_seen <= 100);
    }
    let final_head = LinearPointer::<Claim<u64>>::new(chain_id)
        .resolve_local(&vault.read().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(*final_head.state.value(), 100);
}
