//! End-to-end tests of the escrow lifecycle.
//!
//! `make → take` and `make → refund` against a real ledger, checking every
//! balance that moves and that nothing else does.

mod common;

use common::{Market, MAKER_X, RECORD_RENT, TAKER_Y, TOKEN_ACCOUNT_RENT, WALLET_LAMPORTS};
use swapvault_engine::{Instruction, MakeArgs};
use swapvault_types::{CustodyRecord, EscrowError, ReceiptType};

const OFFERED: u64 = 1_000_000;
const REQUESTED: u64 = 500_000;

#[test]
fn make_locks_offered_amount() {
    let mut m = Market::new();
    let total_before = m.ledger.total_lamports();

    let receipt = m.make(1, OFFERED, REQUESTED).unwrap();
    assert_eq!(receipt.receipt_type, ReceiptType::Made);
    assert!(receipt.verify_hash());
    assert_eq!(receipt.offered_amount, OFFERED);
    assert_eq!(receipt.record, m.record(1));

    assert_eq!(m.balance(&m.vault(1)), OFFERED);
    assert_eq!(m.balance(&m.maker_x), MAKER_X - OFFERED);

    let terms = m.engine.fetch_record(&m.ledger, &m.record(1)).unwrap();
    assert_eq!(terms.nonce, 1);
    assert_eq!(terms.maker, m.maker.address());
    assert_eq!(terms.offered_asset, m.mint_x);
    assert_eq!(terms.requested_asset, m.mint_y);
    assert_eq!(terms.requested_amount, REQUESTED);
    assert_eq!(terms, receipt.terms);

    let record_account = m.ledger.get(&m.record(1)).unwrap();
    assert_eq!(record_account.data.len(), CustodyRecord::LEN);
    assert_eq!(record_account.lamports, RECORD_RENT);
    assert!(record_account.is_owned_by(&m.engine.config().program_id));

    assert_eq!(
        m.ledger.lamports(&m.maker.address()),
        WALLET_LAMPORTS - RECORD_RENT - TOKEN_ACCOUNT_RENT
    );
    assert_eq!(m.ledger.total_lamports(), total_before);
    m.assert_supply_conserved();
}

#[test]
fn take_swaps_assets_and_closes_accounts() {
    let mut m = Market::new();
    m.make(1, OFFERED, REQUESTED).unwrap();
    let total_before = m.ledger.total_lamports();
    let (record, vault) = (m.record(1), m.vault(1));
    let taker_x = m.ata(&m.taker.address(), &m.mint_x);
    let maker_y = m.ata(&m.maker.address(), &m.mint_y);

    let receipt = m.take(1).unwrap();
    assert_eq!(receipt.receipt_type, ReceiptType::Taken);
    assert_eq!(receipt.taker, Some(m.taker.address()));
    assert_eq!(receipt.offered_amount, OFFERED);
    assert!(receipt.verify_hash());

    assert_eq!(m.balance(&taker_x), OFFERED);
    assert_eq!(m.balance(&maker_y), REQUESTED);
    assert_eq!(m.balance(&m.taker_y), TAKER_Y - REQUESTED);
    assert_eq!(m.balance(&m.maker_x), MAKER_X - OFFERED);

    assert!(!m.ledger.contains(&record));
    assert!(!m.ledger.contains(&vault));
    assert_eq!(
        m.engine.fetch_record(&m.ledger, &record).unwrap_err(),
        EscrowError::RecordNotFound(record)
    );

    // Maker recovers both rents; taker paid for its two new accounts.
    assert_eq!(m.ledger.lamports(&m.maker.address()), WALLET_LAMPORTS);
    assert_eq!(
        m.ledger.lamports(&m.taker.address()),
        WALLET_LAMPORTS - 2 * TOKEN_ACCOUNT_RENT
    );
    assert_eq!(m.ledger.total_lamports(), total_before);
    m.assert_supply_conserved();
}

#[test]
fn take_reuses_existing_destinations() {
    let mut m = Market::new();
    let taker_x = m
        .ledger
        .create_associated_token_account(m.taker.address(), m.mint_x)
        .unwrap();
    let maker_y = m
        .ledger
        .create_associated_token_account(m.maker.address(), m.mint_y)
        .unwrap();
    m.make(1, OFFERED, REQUESTED).unwrap();

    m.take(1).unwrap();
    assert_eq!(m.ledger.lamports(&m.taker.address()), WALLET_LAMPORTS);
    assert_eq!(m.balance(&taker_x), OFFERED);
    assert_eq!(m.balance(&maker_y), REQUESTED);
}

#[test]
fn refund_returns_vault_to_maker() {
    let mut m = Market::new();
    m.make(1, OFFERED, REQUESTED).unwrap();
    let record = m.record(1);

    let receipt = m.refund(1).unwrap();
    assert_eq!(receipt.receipt_type, ReceiptType::Refunded);
    assert_eq!(receipt.offered_amount, OFFERED);
    assert_eq!(receipt.taker, None);

    assert_eq!(m.balance(&m.maker_x), MAKER_X);
    assert_eq!(m.ledger.lamports(&m.maker.address()), WALLET_LAMPORTS);
    assert!(!m.ledger.contains(&record));
    assert!(!m.ledger.contains(&m.vault(1)));
    m.assert_supply_conserved();
}

#[test]
fn take_after_refund_fails_with_record_not_found() {
    let mut m = Market::new();
    m.make(1, OFFERED, REQUESTED).unwrap();
    m.refund(1).unwrap();

    let before = m.ledger.clone();
    let err = m.take(1).unwrap_err();
    assert_eq!(err, EscrowError::RecordNotFound(m.record(1)));
    assert_eq!(m.ledger, before);
}

#[test]
fn second_take_fails_with_record_not_found() {
    let mut m = Market::new();
    m.make(1, OFFERED, REQUESTED).unwrap();
    m.take(1).unwrap();
    assert_eq!(m.take(1).unwrap_err(), EscrowError::RecordNotFound(m.record(1)));
    assert_eq!(m.refund(1).unwrap_err(), EscrowError::RecordNotFound(m.record(1)));
}

#[test]
fn nonce_is_single_use_while_open() {
    let mut m = Market::new();
    m.make(1, OFFERED, REQUESTED).unwrap();
    let before = m.ledger.clone();
    assert_eq!(
        m.make(1, OFFERED, REQUESTED).unwrap_err(),
        EscrowError::RecordAlreadyExists(m.record(1))
    );
    assert_eq!(m.ledger, before);

    m.make(2, OFFERED, REQUESTED).unwrap();
    assert_eq!(m.balance(&m.maker_x), MAKER_X - 2 * OFFERED);
}

#[test]
fn nonce_is_reusable_after_close() {
    let mut m = Market::new();
    m.make(7, OFFERED, REQUESTED).unwrap();
    m.refund(7).unwrap();
    m.make(7, OFFERED / 2, REQUESTED * 2).unwrap();

    let terms = m.engine.fetch_record(&m.ledger, &m.record(7)).unwrap();
    assert_eq!(terms.requested_amount, REQUESTED * 2);
    assert_eq!(m.balance(&m.vault(7)), OFFERED / 2);
}

#[test]
fn independent_trades_settle_independently() {
    let mut m = Market::new();
    m.make(1, 1_000, 10).unwrap();
    m.make(2, 2_000, 20).unwrap();
    m.make(3, 3_000, 30).unwrap();

    m.take(2).unwrap();
    m.refund(1).unwrap();

    assert_eq!(m.balance(&m.vault(3)), 3_000);
    assert_eq!(m.balance(&m.ata(&m.taker.address(), &m.mint_x)), 2_000);
    assert_eq!(m.balance(&m.maker_x), MAKER_X - 3_000 - 2_000);
    assert!(m.engine.fetch_record(&m.ledger, &m.record(3)).is_ok());
    m.assert_supply_conserved();
}

#[test]
fn existing_empty_vault_is_adopted() {
    let mut m = Market::new();
    let record = m.record(1);
    let vault = m
        .ledger
        .create_associated_token_account(record, m.mint_x)
        .unwrap();
    assert_eq!(vault, m.vault(1));

    m.make(1, OFFERED, REQUESTED).unwrap();
    assert_eq!(m.balance(&vault), OFFERED);
    assert_eq!(
        m.ledger.lamports(&m.maker.address()),
        WALLET_LAMPORTS - RECORD_RENT
    );
}

#[test]
fn existing_funded_vault_is_rejected() {
    let mut m = Market::new();
    let vault = m
        .ledger
        .create_associated_token_account(m.record(1), m.mint_x)
        .unwrap();
    m.ledger.mint_to(&vault, 1).unwrap();
    let before = m.ledger.clone();

    let err = m.make(1, OFFERED, REQUESTED).unwrap_err();
    assert_eq!(err, EscrowError::VaultNotEmpty { vault, amount: 1 });
    assert_eq!(m.ledger, before);
}

#[test]
fn signed_instructions_run_through_process() {
    let mut m = Market::new();
    let make = Instruction::Make {
        accounts: m.make_accounts(1),
        args: MakeArgs {
            nonce: 1,
            requested_amount: REQUESTED,
            offered_amount: OFFERED,
        },
    };
    let sig = m.maker.sign(&make.signing_payload());
    m.engine.process(&mut m.ledger, &make, &[sig]).unwrap();

    let take = Instruction::Take(m.take_accounts(1));
    let sig = m.taker.sign(&take.signing_payload());
    let receipt = m.engine.process(&mut m.ledger, &take, &[sig]).unwrap();
    assert_eq!(receipt.receipt_type, ReceiptType::Taken);

    // A signature over one instruction does not authorize another.
    let refund = Instruction::Refund(m.refund_accounts(1));
    let err = m.engine.process(&mut m.ledger, &refund, &[sig]).unwrap_err();
    assert_eq!(err, EscrowError::InvalidSignature(m.taker.address()));
}
