//! Integration test: attestation workflow.
//!
//! An auditor witnesses claims and accounts, follows them through
//! amendments, changes its verdict, and is held to its immutable fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ledger_identity::contract::attestation::{AMEND_CHAIN_LINK, AMEND_IMMUTABLE};
use ledger_identity::{
    AbstractParty, Account, AccountState, Attestation, AttestationAmendment, AttestationContract,
    AttestationPointer, AttestationState, AttestationStatus, ChainId, ChainedState, Claim,
    Command, ConstructionError, ContractState, LedgerError, LedgerTransaction, LifecycleCommand,
    LinearState, LocalIdentity, Metadata, Pointer, Record, RecordRef, ResolutionError,
    ResolutionPosition, RuleViolation, SecureHash, SignedTransaction, StateStatus, StateType,
    TransactionBuilder, TransactionState, Vault, VerificationEngine, VerificationError,
};

type AgeClaim = Claim<i64>;
type AgeAttestation = Attestation<AgeClaim>;

struct Parties {
    registrar: LocalIdentity,
    citizen: LocalIdentity,
    auditor: LocalIdentity,
}

struct Ledger {
    engine: VerificationEngine,
    vault: Vault,
}

fn setup() -> (Ledger, Parties) {
    let ledger = Ledger {
        engine: VerificationEngine::standard(),
        vault: Vault::new(),
    };
    let parties = Parties {
        registrar: LocalIdentity::new("registrar"),
        citizen: LocalIdentity::new("citizen"),
        auditor: LocalIdentity::new("auditor"),
    };
    (ledger, parties)
}

impl Ledger {
    fn commit(
        &mut self,
        signer: &LocalIdentity,
        tx: LedgerTransaction,
    ) -> ledger_identity::Result<LedgerTransaction> {
        let signed = SignedTransaction::new(tx).sign(signer);
        signed.verify(&self.engine)?;
        self.vault.record_transaction(&signed.tx)?;
        Ok(signed.tx)
    }

    fn issue<S: ContractState>(&mut self, signer: &LocalIdentity, state: S) -> Record<S> {
        let tx = TransactionBuilder::new()
            .output(&state)
            .unwrap()
            .command(Command::for_state::<S>(
                LifecycleCommand::Issue,
                vec![signer.public_key()],
            ))
            .build();
        let tx = self.commit(signer, tx).unwrap();
        Record::new(state, tx.out_ref(0))
    }

    fn amend<S: ContractState>(
        &mut self,
        signer: &LocalIdentity,
        input: &Record<S>,
        output: S,
    ) -> ledger_identity::Result<Record<S>> {
        let tx = TransactionBuilder::new()
            .input(input)?
            .output(&output)?
            .command(Command::for_state::<S>(
                LifecycleCommand::Amend,
                vec![signer.public_key()],
            ))
            .build();
        let tx = self.commit(signer, tx)?;
        Ok(Record::new(output, tx.out_ref(0)))
    }

    fn age_claim(&mut self, p: &Parties, age: i64) -> Record<AgeClaim> {
        let claim = Claim::issue(p.registrar.party(), p.citizen.party(), "age", age);
        self.issue(&p.registrar, claim)
    }
}

fn rule_of(err: LedgerError) -> &'static str {
    match err {
        LedgerError::Verification(VerificationError::Rule(RuleViolation { rule })) => rule,
        other => panic!("expected a rule violation, got {other:?}"),
    }
}

#[test]
fn linear_attestation_follows_amended_claim() {
    let (mut fx, p) = setup();
    let (auditor, registrar) = (&p.auditor, &p.registrar);
    let claim = fx.age_claim(&p, 30);

    let attestation = AgeAttestation::builder(auditor.party(), AttestationPointer::linear_to(&claim))
        .attestee(p.citizen.party())
        .metadata("method", "passport")
        .build()
        .unwrap();
    let attestation = fx.issue(auditor, attestation);
    assert_eq!(attestation.state.status(), AttestationStatus::Accepted);
    assert_eq!(attestation.state.metadata().get("method"), Some("passport"));

    let resolved = attestation
        .state
        .pointer()
        .resolve_local(&fx.vault)
        .unwrap()
        .unwrap();
    assert_eq!(resolved, claim);

    // Amending the claim moves the linear attestation along with it.
    let amended = claim.state.amend(claim.reference, 31);
    let amended = fx.amend(registrar, &claim, amended).unwrap();
    let resolved = attestation
        .state
        .pointer()
        .resolve_local(&fx.vault)
        .unwrap()
        .unwrap();
    assert_eq!(resolved, amended);
    assert_eq!(*resolved.state.value(), 31);
}

#[test]
fn static_attestation_stays_on_its_version() {
    let (mut fx, p) = setup();
    let (auditor, registrar) = (&p.auditor, &p.registrar);
    let claim = fx.age_claim(&p, 30);

    let attestation = AgeAttestation::witness(
        auditor.party(),
        [AbstractParty::from(p.citizen.party())],
        AttestationPointer::static_to(&claim),
        AttestationStatus::Accepted,
    );
    let attestation = fx.issue(auditor, attestation);

    let newer = claim.state.amend(claim.reference, 31);
    let newer = fx.amend(registrar, &claim, newer).unwrap();

    // The witnessed version is now consumed, but the exact pointer still finds it.
    let resolved = attestation
        .state
        .pointer()
        .resolve_local(&fx.vault)
        .unwrap()
        .unwrap();
    assert_eq!(resolved, claim);
    assert!(fx.vault.is_consumed(&resolved.reference));

    // Re-attesting the newer version keeps the pointer kind and type.
    let refreshed = attestation.state.amend(
        attestation.reference,
        AttestationAmendment::new(AttestationStatus::Accepted)
            .pointer(AttestationPointer::static_to(&newer)),
    );
    let refreshed = fx.amend(auditor, &attestation, refreshed).unwrap();
    let resolved = refreshed
        .state
        .pointer()
        .resolve_local(&fx.vault)
        .unwrap()
        .unwrap();
    assert_eq!(*resolved.state.value(), 31);
}

#[test]
fn attestor_changes_verdict_but_not_identity() {
    let (mut fx, p) = setup();
    let auditor = &p.auditor;
    let claim = fx.age_claim(&p, 17);

    let attestation = AgeAttestation::builder(auditor.party(), AttestationPointer::linear_to(&claim))
        .attestee(p.citizen.party())
        .build()
        .unwrap();
    let attestation = fx.issue(auditor, attestation);

    let metadata = Metadata::from_pairs([("reason", "document expired")]).unwrap();
    let rejected = attestation.state.amend(
        attestation.reference,
        AttestationAmendment::new(AttestationStatus::Rejected).metadata(metadata),
    );
    let rejected = fx.amend(auditor, &attestation, rejected).unwrap();
    assert_eq!(rejected.state.status(), AttestationStatus::Rejected);
    assert_eq!(rejected.state.linear_id(), attestation.state.linear_id());

    let by_status = fx.vault.query(
        &ledger_identity::QueryCriteria::unconsumed()
            .of_type::<AgeAttestation>()
            .field("attestation.status", "rejected"),
    );
    assert_eq!(by_status.len(), 1);

    // Switching from chain-following to exact witnessing is not an amendment.
    let switched = rejected.state.amend(
        rejected.reference,
        AttestationAmendment::new(AttestationStatus::Accepted)
            .pointer(AttestationPointer::static_to(&claim)),
    );
    let err = fx.amend(auditor, &rejected, switched).unwrap_err();
    assert_eq!(rule_of(err), AMEND_IMMUTABLE);

    // An amendment must link to the record it consumes.
    let unlinked = attestation.state.amend(
        attestation.reference,
        AttestationAmendment::new(AttestationStatus::Accepted),
    );
    let err = fx.amend(auditor, &rejected, unlinked).unwrap_err();
    assert_eq!(rule_of(err), AMEND_CHAIN_LINK);
}

#[test]
fn attestation_of_an_account() {
    let (mut fx, p) = setup();
    let (auditor, citizen) = (&p.auditor, &p.citizen);

    let account = fx.issue(citizen, Account::new(citizen.party()));
    let holder = account.state.account_party();

    let attestation = Attestation::<Account>::builder(
        auditor.party(),
        AttestationPointer::linear_to(&account),
    )
    .attestee(holder.clone())
    .build()
    .unwrap();
    let attestation = fx.issue(auditor, attestation);

    assert!(attestation
        .state
        .participants()
        .contains(&AbstractParty::from(holder.clone())));
    let resolved = holder
        .account_pointer::<Account>()
        .resolve_local(&fx.vault)
        .unwrap()
        .unwrap();
    assert_eq!(resolved, account);
    assert_eq!(
        attestation.state.pointer().resolve_local(&fx.vault).unwrap(),
        Some(account)
    );
}

#[test]
fn attestation_resolves_against_transaction_references() {
    let (mut fx, p) = setup();
    let auditor = &p.auditor;
    let claim = fx.age_claim(&p, 40);

    let attestation = AgeAttestation::builder(auditor.party(), AttestationPointer::static_to(&claim))
        .build()
        .unwrap();
    let tx = TransactionBuilder::new()
        .output(&attestation)
        .unwrap()
        .reference(&claim)
        .unwrap()
        .command(Command::for_state::<AgeAttestation>(
            LifecycleCommand::Issue,
            vec![auditor.public_key()],
        ))
        .build();

    let pointer = attestation.pointer();
    assert_eq!(
        pointer
            .resolve_in_transaction(&tx, ResolutionPosition::Reference)
            .unwrap(),
        Some(claim.clone())
    );
    assert_eq!(
        pointer
            .resolve_in_transaction(&tx, ResolutionPosition::Input)
            .unwrap(),
        None
    );

    fx.commit(auditor, tx).unwrap();
    // Referencing a record does not consume it.
    assert!(!fx.vault.is_consumed(&claim.reference));
    assert!(fx
        .vault
        .contains_hash(&claim.state.compute_hash(), StateStatus::Unconsumed));
}

#[test]
fn metadata_limits_are_enforced_at_construction_and_decoding() {
    let (_, p) = setup();
    let claim = Record::new(
        Claim::self_issued(p.registrar.party(), "age", 30_i64),
        ledger_identity::RecordRef::new(ledger_identity::SecureHash::sha256(b"tx"), 0),
    );

    let mut builder =
        AgeAttestation::builder(p.auditor.party(), AttestationPointer::linear_to(&claim));
    for i in 0..11 {
        builder = builder.metadata(format!("k{i}"), "v");
    }
    assert_eq!(
        builder.build().unwrap_err(),
        ConstructionError::TooManyMetadataEntries { count: 11, max: 10 }
    );

    let long_key = "k".repeat(257);
    assert!(matches!(
        Metadata::from_pairs([(long_key.as_str(), "v")]),
        Err(ConstructionError::MetadataKeyTooLong { .. })
    ));

    // Multi-byte characters count once each.
    let at_limit = "é".repeat(1024);
    assert!(Metadata::from_pairs([("note", at_limit.as_str())]).is_ok());

    // A hand-edited envelope with oversize metadata cannot be decoded.
    let valid = AgeAttestation::builder(p.auditor.party(), AttestationPointer::linear_to(&claim))
        .build()
        .unwrap();
    let mut envelope = TransactionState::encode(&valid).unwrap();
    envelope.data["metadata"] = serde_json::json!({ "v": "x".repeat(1025) });
    assert!(matches!(
        envelope.decode::<AgeAttestation>(),
        Err(ResolutionError::Undecodable { .. })
    ));
}

// ── Derived attestation type without its own immutability check ─────────────

/// An age attestation that also names the issuing jurisdiction, but keeps
/// the default `immutable_equals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JurisdictionAttestation {
    attestation: AgeAttestation,
    jurisdiction: String,
}

impl ContractState for JurisdictionAttestation {
    fn state_type() -> StateType {
        StateType::new("example/jurisdiction-attestation")
    }

    fn participants(&self) -> Vec<AbstractParty> {
        self.attestation.participants()
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(self.attestation.linear_id())
    }

    fn content_hash(&self) -> Option<SecureHash> {
        Some(self.attestation.compute_hash())
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        self.attestation.attestation_query_fields()
    }
}

impl LinearState for JurisdictionAttestation {
    fn linear_id(&self) -> &ChainId {
        self.attestation.linear_id()
    }
}

impl ChainedState for JurisdictionAttestation {
    fn previous_record_ref(&self) -> Option<&RecordRef> {
        self.attestation.previous_record_ref()
    }

    fn hash(&self) -> SecureHash {
        self.attestation.compute_hash()
    }
}

impl AttestationState for JurisdictionAttestation {
    type Target = AgeClaim;

    fn attestation(&self) -> &Attestation<AgeClaim> {
        &self.attestation
    }

    fn amend(
        &self,
        previous_record_ref: RecordRef,
        amendment: AttestationAmendment<AgeClaim>,
    ) -> Self {
        Self {
            attestation: self.attestation.amend(previous_record_ref, amendment),
            jurisdiction: self.jurisdiction.clone(),
        }
    }
}

// Known gap: without an `immutable_equals` override the wrapper's own
// fields are unprotected. Only the base attestation fields are checked.
#[test]
fn derived_attestation_without_override_does_not_protect_extra_fields() {
    let (mut fx, p) = setup();
    fx.engine = VerificationEngine::standard()
        .with_contract(AttestationContract::<JurisdictionAttestation>::default());
    let claim = fx.age_claim(&p, 30);

    let attestation = AgeAttestation::builder(p.auditor.party(), AttestationPointer::linear_to(&claim))
        .attestee(p.citizen.party())
        .build()
        .unwrap();
    let record = fx.issue(
        &p.auditor,
        JurisdictionAttestation {
            attestation,
            jurisdiction: "NL".to_string(),
        },
    );

    let mut moved = AttestationState::amend(
        &record.state,
        record.reference,
        AttestationAmendment::new(AttestationStatus::Accepted),
    );
    moved.jurisdiction = "XX".to_string();
    let amended = fx.amend(&p.auditor, &record, moved).unwrap();
    assert_eq!(amended.state.jurisdiction, "XX");

    // The base fields are still guarded: switching the pointer kind fails.
    let mut switched = AttestationState::amend(
        &amended.state,
        amended.reference,
        AttestationAmendment::new(AttestationStatus::Accepted)
            .pointer(AttestationPointer::static_to(&claim)),
    );
    switched.jurisdiction = "NL".to_string();
    let err = fx.amend(&p.auditor, &amended, switched).unwrap_err();
    assert_eq!(rule_of(err), AMEND_IMMUTABLE);
}
