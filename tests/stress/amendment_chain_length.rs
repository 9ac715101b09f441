//! Stress test: long amendment chains of claims and attestations must stay
//! verifiable, with exactly one live version and every old version
//! reachable by exact reference.

use std::time::Instant;

use ledger_identity::{
    Attestation, AttestationAmendment, AttestationPointer, AttestationStatus, Claim, Command,
    ContractState, LedgerTransaction, LifecycleCommand, LinearPointer, LinearState, LocalIdentity,
    Metadata, Pointer, QueryCriteria, Record, SignedTransaction, StaticPointer,
    TransactionBuilder, Vault, VerificationEngine,
};

fn amend_tx<S: ContractState>(
    input: &Record<S>,
    output: &S,
    signer: &LocalIdentity,
) -> SignedTransaction {
    let tx = TransactionBuilder::new()
        .input(input)
        .unwrap()
        .output(output)
        .unwrap()
        .command(Command::for_state::<S>(
            LifecycleCommand::Amend,
            vec![signer.public_key()],
        ))
        .build();
    SignedTransaction::new(tx).sign(signer)
}

fn issue_tx<S: ContractState>(state: &S, signer: &LocalIdentity) -> SignedTransaction {
    let tx: LedgerTransaction = TransactionBuilder::new()
        .output(state)
        .unwrap()
        .command(Command::for_state::<S>(
            LifecycleCommand::Issue,
            vec![signer.public_key()],
        ))
        .build();
    SignedTransaction::new(tx).sign(signer)
}

#[test]
fn stress_claim_amendment_chain_500() {
    let engine = VerificationEngine::standard();
    let issuer = LocalIdentity::new("counter");
    let mut vault = Vault::new();
    let start = Instant::now();

    let claim = Claim::self_issued(issuer.party(), "counter", 0_u64);
    let issued = issue_tx(&claim, &issuer);
    issued.verify(&engine).unwrap();
    vault.record_transaction(&issued.tx).unwrap();

    let first = Record::new(claim, issued.tx.out_ref(0));
    let mut current = first.clone();
    for i in 1..=500_u64 {
        let next = current.state.amend(current.reference, i);
        let signed = amend_tx(&current, &next, &issuer);
        signed
            .verify(&engine)
            .unwrap_or_else(|e| panic!("amendment {i} should verify: {e}"));
        vault.record_transaction(&signed.tx).unwrap();
        current = Record::new(next, signed.tx.out_ref(0));
    }

    let elapsed = start.elapsed();
    assert!(
        elapsed.as_secs() < 30,
        "500 amendments took too long: {elapsed:?}"
    );

    let chain_id = current.state.linear_id().clone();
    let live = vault.query(
        &QueryCriteria::unconsumed()
            .of_type::<Claim<u64>>()
            .chain_id(chain_id.clone()),
    );
    assert_eq!(live.len(), 1);
    assert_eq!(vault.len(), 501);
    assert_eq!(vault.unconsumed_len(), 1);

    let head = LinearPointer::<Claim<u64>>::new(chain_id)
        .resolve_local(&vault)
        .unwrap()
        .unwrap();
    assert_eq!(*head.state.value(), 500);

    let oldest = StaticPointer::to_record(&first)
        .resolve_local(&vault)
        .unwrap()
        .unwrap();
    assert_eq!(*oldest.state.value(), 0);

    // Walking the links back reaches the first version.
    let mut steps = 0;
    let mut cursor = head;
    while let Some(prev) = ledger_identity::ChainedState::previous_record_ref(&cursor.state) {
        let prev = vault.get(prev).unwrap().decode::<Claim<u64>>().unwrap();
        cursor = prev;
        steps += 1;
    }
    assert_eq!(steps, 500);
    assert_eq!(cursor, first);
}

#[test]
fn stress_attestation_amendment_chain_200() {
    let engine = VerificationEngine::standard();
    let issuer = LocalIdentity::new("issuer");
    let auditor = LocalIdentity::new("auditor");
    let mut vault = Vault::new();

    let claim = Claim::self_issued(issuer.party(), "verified", true);
    let issued = issue_tx(&claim, &issuer);
    vault.record_transaction(&issued.tx).unwrap();
    let claim = Record::new(claim, issued.tx.out_ref(0));

    let attestation =
        Attestation::builder(auditor.party(), AttestationPointer::linear_to(&claim))
            .attestee(issuer.party())
            .build()
            .unwrap();
    let issued = issue_tx(&attestation, &auditor);
    issued.verify(&engine).unwrap();
    vault.record_transaction(&issued.tx).unwrap();
    let mut current = Record::new(attestation, issued.tx.out_ref(0));

    for i in 0..200 {
        let status = if i % 2 == 0 {
            AttestationStatus::Rejected
        } else {
            AttestationStatus::Accepted
        };
        let metadata = Metadata::from_pairs([("round", i.to_string())]).unwrap();
        let next = current.state.amend(
            current.reference,
            AttestationAmendment::new(status).metadata(metadata),
        );
        let signed = amend_tx(&current, &next, &auditor);
        signed
            .verify(&engine)
            .unwrap_or_else(|e| panic!("attestation amendment {i} should verify: {e}"));
        vault.record_transaction(&signed.tx).unwrap();
        current = Record::new(next, signed.tx.out_ref(0));
    }

    assert_eq!(current.state.status(), AttestationStatus::Accepted);
    assert_eq!(current.state.metadata().get("round"), Some("199"));
    let witnessed = current.state.pointer().resolve_local(&vault).unwrap();
    assert_eq!(witnessed, Some(claim));
}
