//! Builders for raw Hashstack event payloads.
#![allow(dead_code)]

use loan_replay::{
    Decimal, HashstackProtocol, RawEvent, ReplayEngine, Token, TokenRegistry,
};

pub const TOKEN_A: &str = "0xa";
pub const TOKEN_B: &str = "0xb";
pub const ALICE: &str = "0x1111";
pub const BOB: &str = "0x2222";

pub fn registry() -> TokenRegistry {
    TokenRegistry::from_entries([(TOKEN_A, "A"), (TOKEN_B, "B")]).unwrap()
}

pub fn engine() -> ReplayEngine<HashstackProtocol> {
    ReplayEngine::new(HashstackProtocol::new(), registry())
}

pub fn hex(value: u128) -> String {
    format!("0x{:x}", value)
}

pub fn tok(symbol: &str) -> Token {
    Token::from(symbol)
}

pub fn d(value: u64) -> Decimal {
    Decimal::from(value)
}

/// Loan state carried by a 14-field `loan_record`.
#[derive(Debug, Clone)]
pub struct Loan {
    pub id: u64,
    pub owner: &'static str,
    pub debt_market: &'static str,
    pub debt: u128,
    pub current_market: &'static str,
    pub current_amount: u128,
    pub category: u32,
}

impl Loan {
    pub fn new(id: u64, owner: &'static str) -> Self {
        Self {
            id,
            owner,
            debt_market: TOKEN_A,
            debt: 0,
            current_market: TOKEN_B,
            current_amount: 0,
            category: 1,
        }
    }

    pub fn debt(mut self, market: &'static str, amount: u128) -> Self {
        self.debt_market = market;
        self.debt = amount;
        self
    }

    pub fn current(mut self, market: &'static str, amount: u128) -> Self {
        self.current_market = market;
        self.current_amount = amount;
        self
    }

    pub fn category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    pub fn fields(&self) -> Vec<String> {
        vec![
            hex(self.id as u128),
            self.owner.to_string(),
            self.debt_market.to_string(),
            hex(1), // commitment
            hex(self.debt),
            hex(0),
            self.current_market.to_string(),
            hex(self.current_amount),
            hex(0),
            hex(0), // is_loan_withdrawn
            hex(self.category as u128),
            hex(1), // state
            hex(0), // l3_integration
            hex(1_700_000_000), // created_at
        ]
    }
}

/// 9-field `collateral_record`.
pub fn collateral_record(market: &str, amount: u128) -> Vec<String> {
    vec![
        market.to_string(),
        hex(amount),
        hex(0),
        hex(amount),
        hex(0),
        hex(1),
        hex(0),
        hex(0),
        hex(0),
    ]
}

pub fn new_loan(
    block: u64,
    tx: &str,
    loan: &Loan,
    collateral_market: &str,
    collateral: u128,
) -> RawEvent {
    let mut data = loan.fields();
    data.extend(collateral_record(collateral_market, collateral));
    data.push(hex(1_700_000_000)); // timestamp
    RawEvent::new(block, tx, "new_loan", data)
}

/// `new_loan` emitted with a loan record one field shorter.
pub fn new_loan_short(
    block: u64,
    tx: &str,
    loan: &Loan,
    collateral_market: &str,
    collateral: u128,
) -> RawEvent {
    let mut data = loan.fields();
    data.pop();
    data.extend(collateral_record(collateral_market, collateral));
    RawEvent::new(block, tx, "new_loan", data)
}

fn collateral_event(
    name: &str,
    block: u64,
    tx: &str,
    loan_id: u64,
    market: &str,
    amount: u128,
) -> RawEvent {
    let mut data = collateral_record(market, amount);
    data.push(hex(loan_id as u128));
    data.push(hex(amount)); // amount_added / amount_withdrawn
    data.push(hex(1_700_000_000));
    RawEvent::new(block, tx, name, data)
}

pub fn collateral_added(block: u64, tx: &str, loan_id: u64, market: &str, amount: u128) -> RawEvent {
    collateral_event("collateral_added", block, tx, loan_id, market, amount)
}

pub fn collateral_withdrawal(
    block: u64,
    tx: &str,
    loan_id: u64,
    market: &str,
    amount: u128,
) -> RawEvent {
    collateral_event("collateral_withdrawal", block, tx, loan_id, market, amount)
}

pub fn interest_deducted(
    block: u64,
    tx: &str,
    loan_id: u64,
    market: &str,
    amount: u128,
) -> RawEvent {
    let mut data = collateral_record(market, amount);
    data.push(TOKEN_A.to_string()); // accrued_interest market
    data.push(hex(5)); // accrued_interest
    data.push(hex(loan_id as u128));
    data.push(hex(5)); // amount_withdrawn
    RawEvent::new(block, tx, "loan_interest_deducted", data)
}

fn loan_event(name: &str, block: u64, tx: &str, loan: &Loan) -> RawEvent {
    let mut data = loan.fields();
    data.push(hex(1_700_000_000));
    RawEvent::new(block, tx, name, data)
}

pub fn loan_withdrawal(block: u64, tx: &str, loan: &Loan) -> RawEvent {
    loan_event("loan_withdrawal", block, tx, loan)
}

pub fn loan_repaid(block: u64, tx: &str, loan: &Loan) -> RawEvent {
    loan_event("loan_repaid", block, tx, loan)
}

pub fn liquidated(block: u64, tx: &str, loan: &Loan) -> RawEvent {
    loan_event("liquidated", block, tx, loan)
}

pub fn loan_swap(block: u64, tx: &str, old: &Loan, new: &Loan) -> RawEvent {
    let mut data = old.fields();
    data.extend(new.fields());
    data.push(hex(1_700_000_000));
    RawEvent::new(block, tx, "loan_swap", data)
}
