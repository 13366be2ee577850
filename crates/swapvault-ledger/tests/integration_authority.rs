//! Derived-address authority across programs.
//!
//! A token account owned by a derived address can only be debited by the
//! program that derived it, from inside a transaction opened with that
//! program's key.

use swapvault_ledger::{Ledger, ProgramKey, Signers};
use swapvault_types::{
    derivation::find_program_address, Address, EngineConfig, EscrowError, Keypair,
};

struct Setup {
    ledger: Ledger,
    user: Keypair,
    mint: Address,
    user_tokens: Address,
    program: ProgramKey,
    pda: Address,
    bump: u8,
    pda_tokens: Address,
}

fn setup() -> Setup {
    let mut ledger = Ledger::new(&EngineConfig::default());
    let user = Keypair::generate();
    let mint = Address::from_label("test:mint");
    let program_id = Address::from_label("test:program");
    let (pda, bump) = find_program_address(&[b"pool"], &program_id).unwrap();
    let program = ledger.deploy(program_id).unwrap();

    ledger.create_wallet(user.address(), 1_000_000_000).unwrap();
    ledger.create_mint(mint, 0).unwrap();
    let user_tokens = ledger
        .create_associated_token_account(user.address(), mint)
        .unwrap();
    let pda_tokens = ledger.create_associated_token_account(pda, mint).unwrap();
    ledger.mint_to(&user_tokens, 100).unwrap();
    ledger.mint_to(&pda_tokens, 50).unwrap();

    Setup {
        ledger,
        user,
        mint,
        user_tokens,
        program,
        pda,
        bump,
        pda_tokens,
    }
}

#[test]
fn owning_program_can_sign_with_seeds() {
    let mut s = setup();
    let (from, to, bump) = (s.pda_tokens, s.user_tokens, s.bump);
    s.ledger
        .transact(&s.program, &Signers::default(), |tx| {
            let authority = tx.sign_with_seeds(&[b"pool", &[bump]])?;
            tx.transfer(&from, &to, &authority, 50)
        })
        .unwrap();
    assert_eq!(s.ledger.token_balance(&s.user_tokens).unwrap(), 150);
    assert_eq!(s.ledger.token_balance(&s.pda_tokens).unwrap(), 0);
}

#[test]
fn other_program_derives_a_different_authority() {
    let mut s = setup();
    let (from, to, bump, pda) = (s.pda_tokens, s.user_tokens, s.bump, s.pda);
    let evil = s.ledger.deploy(Address::from_label("evil:program")).unwrap();
    let before = s.ledger.clone();
    let err = s
        .ledger
        .transact(&evil, &Signers::default(), |tx| {
            let _ = tx.sign_with_seeds(&[b"pool", &[bump]]);
            tx.transfer(&from, &to, &pda, 50)
        })
        .unwrap_err();
    assert_eq!(err, EscrowError::MissingSignature(s.pda));
    assert_eq!(s.ledger, before);
}

#[test]
fn user_signature_does_not_move_pda_funds() {
    let mut s = setup();
    let signers = Signers::pre_verified([s.user.address()]).unwrap();
    let (from, to, user) = (s.pda_tokens, s.user_tokens, s.user.address());
    let err = s
        .ledger
        .transact(&s.program, &signers, |tx| tx.transfer(&from, &to, &user, 1))
        .unwrap_err();
    assert!(matches!(err, EscrowError::TokenOwnerMismatch { .. }));
}

#[test]
fn verified_user_moves_own_tokens() {
    let mut s = setup();
    let message = b"transfer 10";
    let signers = Signers::verify(message, &[s.user.sign(message)]).unwrap();
    let (from, to, user) = (s.user_tokens, s.pda_tokens, s.user.address());
    s.ledger
        .transact(&s.program, &signers, |tx| tx.transfer(&from, &to, &user, 10))
        .unwrap();
    assert_eq!(s.ledger.token_balance(&s.pda_tokens).unwrap(), 60);
    assert_eq!(s.ledger.circulating(&s.mint), 150);
}

#[test]
fn idempotent_ata_create_validates_existing() {
    let mut s = setup();
    let signers = Signers::pre_verified([s.user.address()]).unwrap();
    let (user, mint) = (s.user.address(), s.mint);
    let lamports = s.ledger.lamports(&user);

    let address = s
        .ledger
        .transact(&s.program, &signers, |tx| {
            tx.create_associated_token_account(&user, &user, &mint)
        })
        .unwrap();
    assert_eq!(address, s.user_tokens);
    assert_eq!(s.ledger.lamports(&user), lamports);
}

#[test]
fn program_id_cannot_be_claimed_twice() {
    let mut s = setup();
    let program_id = s.program.program_id();
    assert_eq!(
        s.ledger.deploy(program_id).unwrap_err(),
        EscrowError::ProgramAlreadyDeployed(program_id)
    );
}

#[test]
fn self_issued_key_does_not_carry_over() {
    let mut s = setup();
    let (from, to, bump) = (s.pda_tokens, s.user_tokens, s.bump);
    let mut elsewhere = Ledger::new(&EngineConfig::default());
    let forged = elsewhere.deploy(s.program.program_id()).unwrap();
    let before = s.ledger.clone();

    let err = s
        .ledger
        .transact(&forged, &Signers::default(), |tx| {
            let authority = tx.sign_with_seeds(&[b"pool", &[bump]])?;
            tx.transfer(&from, &to, &authority, 50)
        })
        .unwrap_err();
    assert_eq!(err, EscrowError::InvalidProgramKey(s.program.program_id()));
    assert_eq!(s.ledger, before);
}
