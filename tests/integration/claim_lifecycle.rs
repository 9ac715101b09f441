//! Integration test: claim lifecycle end to end.
//!
//! Issues, amends and revokes claims through signed transactions, records
//! them in a vault, persists them to a transaction store, and checks that
//! derived claim types with their own immutable fields are enforced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ledger_identity::contract::claim::{AMEND_IMMUTABLE, AMEND_ISSUER_SIGNS, REVOKE_ISSUER_SIGNS};
use ledger_identity::storage::TransactionStore;
use ledger_identity::{
    AbstractParty, ChainId, ChainedState, Claim, ClaimContract, ClaimState, Command,
    ContractState, LedgerError, LedgerTransaction, LifecycleCommand, LinearState, LocalIdentity,
    QueryCriteria, Record, RecordRef, RuleViolation, SecureHash, SignedTransaction, StateStatus,
    StateType, TransactionBuilder, Vault, VerificationEngine, VerificationError,
};

fn commit(
    engine: &VerificationEngine,
    vault: &mut Vault,
    signer: &LocalIdentity,
    tx: LedgerTransaction,
) -> ledger_identity::Result<SignedTransaction> {
    let signed = SignedTransaction::new(tx).sign(signer);
    signed.verify(engine)?;
    vault.record_transaction(&signed.tx)?;
    Ok(signed)
}

fn rule_of(err: LedgerError) -> &'static str {
    match err {
        LedgerError::Verification(VerificationError::Rule(RuleViolation { rule })) => rule,
        other => panic!("expected a rule violation, got {other:?}"),
    }
}

fn issue_tx<S: ContractState>(state: &S, signer: &LocalIdentity) -> LedgerTransaction {
    TransactionBuilder::new()
        .output(state)
        .unwrap()
        .command(Command::for_state::<S>(
            LifecycleCommand::Issue,
            vec![signer.public_key()],
        ))
        .build()
}

fn amend_tx<S: ContractState>(
    input: &Record<S>,
    output: &S,
    signer: &LocalIdentity,
) -> LedgerTransaction {
    TransactionBuilder::new()
        .input(input)
        .unwrap()
        .output(output)
        .unwrap()
        .command(Command::for_state::<S>(
            LifecycleCommand::Amend,
            vec![signer.public_key()],
        ))
        .build()
}

fn head<S: LinearState>(vault: &Vault, chain_id: &ChainId) -> Record<S> {
    let found = vault.query(
        &QueryCriteria::unconsumed()
            .of_type::<S>()
            .chain_id(chain_id.clone()),
    );
    assert_eq!(found.len(), 1, "chain should have exactly one live version");
    found[0].decode::<S>().unwrap()
}

#[test]
fn claim_issue_amend_revoke() {
    let engine = VerificationEngine::standard();
    let mut vault = Vault::new();
    let registrar = LocalIdentity::new("registrar");
    let citizen = LocalIdentity::new("citizen");

    // ── Issue ───────────────────────────────────────────────────────────
    let claim = Claim::issue(registrar.party(), citizen.party(), "age", 30_i64);
    let chain_id = claim.linear_id().clone();
    let first_hash = claim.compute_hash();
    let issued = commit(&engine, &mut vault, &registrar, issue_tx(&claim, &registrar)).unwrap();

    let v1 = head::<Claim<i64>>(&vault, &chain_id);
    assert_eq!(v1.reference, issued.tx.out_ref(0));
    assert_eq!(*v1.state.value(), 30);
    assert!(v1.state.previous_record_ref().is_none());

    // ── Amend twice ─────────────────────────────────────────────────────
    let v2_state = v1.state.amend(v1.reference, 31);
    commit(&engine, &mut vault, &registrar, amend_tx(&v1, &v2_state, &registrar)).unwrap();
    let v2 = head::<Claim<i64>>(&vault, &chain_id);
    assert_eq!(*v2.state.value(), 31);
    assert_eq!(v2.state.previous_record_ref(), Some(&v1.reference));

    let v3_state = v2.state.amend(v2.reference, 32);
    commit(&engine, &mut vault, &registrar, amend_tx(&v2, &v3_state, &registrar)).unwrap();
    let v3 = head::<Claim<i64>>(&vault, &chain_id);
    assert_eq!(*v3.state.value(), 32);

    // Older versions stay queryable by hash, but only as consumed records.
    assert!(vault.contains_hash(&first_hash, StateStatus::Consumed));
    assert!(!vault.contains_hash(&first_hash, StateStatus::Unconsumed));
    assert!(vault.contains_hash(&v3.state.compute_hash(), StateStatus::Unconsumed));

    let history = vault.query(
        &QueryCriteria::all()
            .of_type::<Claim<i64>>()
            .chain_id(chain_id.clone()),
    );
    assert_eq!(history.len(), 3);

    // ── Revoke ──────────────────────────────────────────────────────────
    let revoke = TransactionBuilder::new()
        .input(&v3)
        .unwrap()
        .command(Command::for_state::<Claim<i64>>(
            LifecycleCommand::Revoke,
            vec![registrar.public_key()],
        ))
        .build();
    commit(&engine, &mut vault, &registrar, revoke).unwrap();

    let live = vault.query(&QueryCriteria::unconsumed().chain_id(chain_id));
    assert!(live.is_empty(), "a revoked chain has no live version");
}

#[test]
fn claim_only_issuer_may_amend_or_revoke() {
    let engine = VerificationEngine::standard();
    let mut vault = Vault::new();
    let issuer = LocalIdentity::new("issuer");
    let holder = LocalIdentity::new("holder");

    let claim = Claim::issue(issuer.party(), holder.party(), "licensed", true);
    let issued = commit(&engine, &mut vault, &issuer, issue_tx(&claim, &issuer)).unwrap();
    let record = Record::new(claim, issued.tx.out_ref(0));

    // The holder signs its own amendment: signatures check out, the rule does not.
    let amended = record.state.amend(record.reference, false);
    let err = commit(&engine, &mut vault, &holder, amend_tx(&record, &amended, &holder))
        .unwrap_err();
    assert_eq!(rule_of(err), AMEND_ISSUER_SIGNS);

    let revoke = TransactionBuilder::new()
        .input(&record)
        .unwrap()
        .command(Command::for_state::<Claim<bool>>(
            LifecycleCommand::Revoke,
            vec![holder.public_key()],
        ))
        .build();
    let err = commit(&engine, &mut vault, &holder, revoke).unwrap_err();
    assert_eq!(rule_of(err), REVOKE_ISSUER_SIGNS);

    // Nothing was recorded by the rejected attempts.
    assert!(!vault.is_consumed(&record.reference));
}

#[test]
fn claim_double_amend_is_a_conflict() {
    let engine = VerificationEngine::standard();
    let mut vault = Vault::new();
    let issuer = LocalIdentity::new("issuer");

    let claim = Claim::self_issued(issuer.party(), "nickname", "ace".to_string());
    let issued = commit(&engine, &mut vault, &issuer, issue_tx(&claim, &issuer)).unwrap();
    let record = Record::new(claim, issued.tx.out_ref(0));

    let first = record.state.amend(record.reference, "ace2".to_string());
    let first_tx = commit(&engine, &mut vault, &issuer, amend_tx(&record, &first, &issuer)).unwrap();

    // A competing amendment of the same version is valid on its own...
    let second = record.state.amend(record.reference, "ace3".to_string());
    let second_tx = amend_tx(&record, &second, &issuer);
    let signed = SignedTransaction::new(second_tx).sign(&issuer);
    signed.verify(&engine).unwrap();

    // ...but the vault refuses to consume the record twice.
    match vault.record_transaction(&signed.tx) {
        Err(LedgerError::StateAlreadyConsumed {
            reference,
            consumed_by,
        }) => {
            assert_eq!(reference, record.reference);
            assert_eq!(consumed_by, *first_tx.id());
        }
        other => panic!("expected StateAlreadyConsumed, got {other:?}"),
    }
}

#[test]
fn claim_history_survives_the_transaction_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = TransactionStore::new(dir.path().join("transactions")).unwrap();
    let engine = VerificationEngine::standard();
    let mut vault = Vault::new();
    let issuer = LocalIdentity::new("issuer");

    let claim = Claim::self_issued(issuer.party(), "score", 1.5_f64);
    let chain_id = claim.linear_id().clone();
    let mut current = {
        let signed = commit(&engine, &mut vault, &issuer, issue_tx(&claim, &issuer)).unwrap();
        store.save(&signed).unwrap();
        Record::new(claim, signed.tx.out_ref(0))
    };
    for i in 2..=5 {
        let next = current.state.amend(current.reference, i as f64 * 1.5);
        let signed =
            commit(&engine, &mut vault, &issuer, amend_tx(&current, &next, &issuer)).unwrap();
        store.save(&signed).unwrap();
        current = Record::new(next, signed.tx.out_ref(0));
    }

    // Rebuild from disk and re-verify every stored transaction.
    let stored = store.load_all().unwrap();
    assert_eq!(stored.len(), 5);
    let mut rebuilt = Vault::new();
    for signed in &stored {
        signed.verify(&engine).unwrap();
        rebuilt.record_transaction(&signed.tx).unwrap();
    }

    let restored = head::<Claim<f64>>(&rebuilt, &chain_id);
    assert_eq!(restored, current);
    assert_eq!(rebuilt.len(), vault.len());
    assert_eq!(rebuilt.unconsumed_len(), 1);
}

// ── Derived claim type ──────────────────────────────────────────────────────

/// An email claim that also records the verifying domain, which may never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct VerifiedEmail {
    claim: Claim<String>,
    domain: String,
}

impl ContractState for VerifiedEmail {
    fn state_type() -> StateType {
        StateType::new("example/verified-email")
    }

    fn participants(&self) -> Vec<AbstractParty> {
        self.claim.participants()
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(self.claim.linear_id())
    }

    fn content_hash(&self) -> Option<SecureHash> {
        Some(self.claim.compute_hash())
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        let mut fields = self.claim.claim_query_fields();
        fields.insert("email.domain".to_string(), self.domain.clone());
        fields
    }
}

impl LinearState for VerifiedEmail {
    fn linear_id(&self) -> &ChainId {
        self.claim.linear_id()
    }
}

impl ChainedState for VerifiedEmail {
    fn previous_record_ref(&self) -> Option<&RecordRef> {
        self.claim.previous_record_ref()
    }

    fn hash(&self) -> SecureHash {
        self.claim.compute_hash()
    }
}

impl ClaimState for VerifiedEmail {
    type Value = String;

    fn claim(&self) -> &Claim<String> {
        &self.claim
    }

    fn amend(&self, previous_record_ref: RecordRef, value: String) -> Self {
        Self {
            claim: self.claim.amend(previous_record_ref, value),
            domain: self.domain.clone(),
        }
    }

    fn immutable_equals(&self, other: &Self) -> bool {
        self.domain == other.domain
    }
}

#[test]
fn derived_claim_keeps_its_immutable_fields() {
    let engine = VerificationEngine::standard().with_contract(ClaimContract::<VerifiedEmail>::default());
    let mut vault = Vault::new();
    let provider = LocalIdentity::new("provider");
    let user = LocalIdentity::new("user");

    let email = VerifiedEmail {
        claim: Claim::issue(
            provider.party(),
            user.party(),
            "email",
            "user@example.org".to_string(),
        ),
        domain: "example.org".to_string(),
    };
    let issued = commit(&engine, &mut vault, &provider, issue_tx(&email, &provider)).unwrap();
    let record = Record::new(email, issued.tx.out_ref(0));

    // The custom query column is indexed.
    let by_domain = vault.query(
        &QueryCriteria::unconsumed()
            .of_type::<VerifiedEmail>()
            .field("email.domain", "example.org"),
    );
    assert_eq!(by_domain.len(), 1);

    // Changing the value through `amend` keeps the domain.
    let amended = ClaimState::amend(&record.state, record.reference, "me@example.org".to_string());
    assert_eq!(amended.domain, "example.org");
    let amend = amend_tx(&record, &amended, &provider);
    assert!(SignedTransaction::new(amend.clone())
        .sign(&provider)
        .verify(&engine)
        .is_ok());

    // Tampering with the domain is caught by the wrapper's immutability check.
    let mut tampered = amended.clone();
    tampered.domain = "evil.example".to_string();
    let err = commit(&engine, &mut vault, &provider, amend_tx(&record, &tampered, &provider))
        .unwrap_err();
    assert_eq!(rule_of(err), AMEND_IMMUTABLE);

    // Without its contract registered the engine refuses the type outright.
    let bare = VerificationEngine::standard();
    let err = SignedTransaction::new(amend)
        .sign(&provider)
        .verify(&bare)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Verification(VerificationError::UnrecognizedStateType(_))
    ));
}

/// Same shape as `VerifiedEmail`, but keeps the default `immutable_equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UncheckedEmail {
    claim: Claim<String>,
    domain: String,
}

impl ContractState for UncheckedEmail {
    fn state_type() -> StateType {
        StateType::new("example/unchecked-email")
    }

    fn participants(&self) -> Vec<AbstractParty> {
        self.claim.participants()
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(self.claim.linear_id())
    }

    fn content_hash(&self) -> Option<SecureHash> {
        Some(self.claim.compute_hash())
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        self.claim.claim_query_fields()
    }
}

impl LinearState for UncheckedEmail {
    fn linear_id(&self) -> &ChainId {
        self.claim.linear_id()
    }
}

impl ChainedState for UncheckedEmail {
    fn previous_record_ref(&self) -> Option<&RecordRef> {
        self.claim.previous_record_ref()
    }

    fn hash(&self) -> SecureHash {
        self.claim.compute_hash()
    }
}

impl ClaimState for UncheckedEmail {
    type Value = String;

    fn claim(&self) -> &Claim<String> {
        &self.claim
    }

    fn amend(&self, previous_record_ref: RecordRef, value: String) -> Self {
        Self {
            claim: self.claim.amend(previous_record_ref, value),
            domain: self.domain.clone(),
        }
    }
}

// Known gap: a wrapper with extra immutable fields that does not override
// `immutable_equals` gets no protection for them. Only the base claim
// fields are checked.
#[test]
fn derived_claim_without_override_does_not_protect_extra_fields() {
    let engine =
        VerificationEngine::standard().with_contract(ClaimContract::<UncheckedEmail>::default());
    let mut vault = Vault::new();
    let provider = LocalIdentity::new("provider");
    let user = LocalIdentity::new("user");

    let email = UncheckedEmail {
        claim: Claim::issue(
            provider.party(),
            user.party(),
            "email",
            "user@example.org".to_string(),
        ),
        domain: "example.org".to_string(),
    };
    let issued = commit(&engine, &mut vault, &provider, issue_tx(&email, &provider)).unwrap();
    let record = Record::new(email, issued.tx.out_ref(0));

    let mut rehomed = ClaimState::amend(&record.state, record.reference, "me@evil.example".to_string());
    rehomed.domain = "evil.example".to_string();
    assert!(commit(&engine, &mut vault, &provider, amend_tx(&record, &rehomed, &provider)).is_ok());

    let head = vault.query(
        &QueryCriteria::unconsumed()
            .of_type::<UncheckedEmail>()
            .chain_id(rehomed.claim.linear_id().clone()),
    );
    assert_eq!(head.len(), 1);
    assert_eq!(head[0].decode::<UncheckedEmail>().unwrap().state.domain, "evil.example");
}
