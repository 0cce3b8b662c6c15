//! Action-line parser.
//!
//! Turns one line of the action file into a [`Command`]. Tokens are
//! separated by single spaces; empty tokens are kept, so doubled spaces
//! change the argument count the same way a strict splitter would.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::command::{
    CancelOrder, Command, NewOrder, OrderId, Price, Qty, Side, Symbol, PRICE_MULTIPLIER,
};
use crate::error::ParseError;

/// Parse a full action line.
///
/// A blank line splits into a single empty token, which is an unknown
/// action like any other.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let tokens: Vec<&str> = line.split(' ').collect();
    parse_tokens(&tokens)
}

/// Parse an already split action line.
pub fn parse_tokens(tokens: &[&str]) -> Result<Command, ParseError> {
    let action = tokens.first().copied().unwrap_or_default();
    let id_token = tokens.get(1).copied().unwrap_or_default();

    match action {
        "O" => {
            if tokens.len() != 6 {
                return Err(ParseError::ArgumentCount { id: id_token.into() });
            }
            let order_id = parse_order_id(id_token)?;
            let symbol = Symbol::new(tokens[2]).ok_or_else(|| ParseError::Symbol {
                id: id_token.into(),
                token: tokens[2].into(),
            })?;
            let side = parse_side(tokens[3]).ok_or_else(|| ParseError::Side {
                id: id_token.into(),
                token: tokens[3].into(),
            })?;
            let qty = parse_qty(tokens[4]).ok_or_else(|| ParseError::Quantity {
                id: id_token.into(),
                token: tokens[4].into(),
            })?;
            let price = parse_price(tokens[5]).ok_or_else(|| ParseError::Price {
                id: id_token.into(),
                token: tokens[5].into(),
            })?;

            Ok(Command::New(NewOrder {
                order_id,
                symbol,
                side,
                qty,
                price,
            }))
        }
        "X" => {
            if tokens.len() != 2 {
                return Err(ParseError::ArgumentCount { id: id_token.into() });
            }
            let order_id = parse_order_id(id_token)?;
            Ok(Command::Cancel(CancelOrder { order_id }))
        }
        "P" => Ok(Command::Snapshot),
        other => Err(ParseError::Action {
            action: other.into(),
        }),
    }
}

fn parse_order_id(token: &str) -> Result<OrderId, ParseError> {
    token
        .parse::<OrderId>()
        .map_err(|_| ParseError::OrderId { id: token.into() })
}

fn parse_side(token: &str) -> Option<Side> {
    match token {
        "B" => Some(Side::Buy),
        "S" => Some(Side::Sell),
        _ => None,
    }
}

/// Strictly positive integer that fits in [`Qty`].
fn parse_qty(token: &str) -> Option<Qty> {
    token.parse::<Qty>().ok().filter(|&q| q > 0)
}

/// Exact decimal to fixed-point conversion.
///
/// Plain (`12.5`) and exponent (`1.25e1`) notation are both accepted.
/// Digits beyond the fifth fractional place are truncated. Zero,
/// negative, or overflowing prices are rejected.
pub fn parse_price(token: &str) -> Option<Price> {
    let value = token
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(token))
        .ok()?;
    if value.is_sign_negative() || value.is_zero() {
        return None;
    }
    let scaled = value.checked_mul(Decimal::from(PRICE_MULTIPLIER))?.trunc();
    scaled.to_u64().filter(|&p| p > 0)
}
