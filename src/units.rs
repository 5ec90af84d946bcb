//! Token amounts and display formatting.
//!
//! Amounts are carried as raw integer base units ([`TokenAmount`]) from the
//! moment they are parsed or read from the API until they are rendered.
//! Only the `format*` functions in this module produce human-readable values.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Result, TrailfundError};

/// Digits with at most one decimal point (may be empty on either side).
static AMOUNT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d*\.?\d*$").expect("AMOUNT_REGEX must compile"));

/// A token amount in raw base units (e.g. 1 USDC = 1_000_000).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Wrap a raw base-unit value.
    pub fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Raw base-unit value.
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a raw base-unit string as returned by the trail API or an RPC node.
    ///
    /// Accepts decimal digits or a `0x`-prefixed hex quantity. An empty
    /// string is zero.
    pub fn from_raw_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::ZERO);
        }

        let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
            Some("") => Ok(0),
            Some(hex) => u128::from_str_radix(hex, 16),
            None => raw.parse::<u128>(),
        };

        parsed.map(Self).map_err(|e| TrailfundError::MalformedPayload {
            message: format!("'{}' is not a base-unit amount: {}", raw, e),
        })
    }

    /// Parse a human-entered amount like `"12.5"` into base units.
    ///
    /// Fractional digits beyond `decimals` are truncated.
    pub fn parse(input: &str, decimals: u32) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid_amount(input, "amount is empty"));
        }
        if !AMOUNT_REGEX.is_match(trimmed) {
            return Err(invalid_amount(
                input,
                "only digits and a single decimal point are allowed",
            ));
        }

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let fraction: String = fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(decimals as usize)
            .collect();

        let whole_units = parse_digits(whole, input)?;
        let fraction_units = parse_digits(&fraction, input)?;
        let scale = 10u128
            .checked_pow(decimals)
            .ok_or_else(|| invalid_amount(input, "too many decimals"))?;

        whole_units
            .checked_mul(scale)
            .and_then(|v| v.checked_add(fraction_units))
            .map(Self)
            .ok_or_else(|| invalid_amount(input, "amount is too large"))
    }

    /// Render as `whole.fraction`, showing `display_decimals` fractional digits.
    ///
    /// Digits past `display_decimals` are cut, never rounded.
    pub fn format(&self, decimals: u32, display_decimals: usize) -> String {
        let divisor = 10u128.checked_pow(decimals).unwrap_or(u128::MAX);
        let whole = self.0 / divisor;
        let fraction = self.0 % divisor;

        if display_decimals == 0 {
            return whole.to_string();
        }

        if fraction == 0 {
            return format!("{}.{}", whole, "0".repeat(display_decimals));
        }

        let padded = format!("{:0width$}", fraction, width = decimals as usize);
        let shown: String = padded.chars().take(display_decimals).collect();
        format!("{}.{}", whole, shown)
    }

    /// Integer part only.
    pub fn format_whole(&self, decimals: u32) -> String {
        self.format(decimals, 0)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

fn parse_digits(digits: &str, input: &str) -> Result<u128> {
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<u128>()
        .map_err(|_| invalid_amount(input, "amount is too large"))
}

fn invalid_amount(input: &str, reason: &str) -> TrailfundError {
    TrailfundError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Upper bound an entered amount is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountLimit {
    /// The wallet's token balance.
    Balance(TokenAmount),
    /// An allowance the user already approved.
    Approved(TokenAmount),
}

impl AmountLimit {
    fn amount(&self) -> TokenAmount {
        match self {
            Self::Balance(a) | Self::Approved(a) => *a,
        }
    }
}

/// Parse an entered amount and check it is positive and within `limit`.
pub fn validate_amount(input: &str, decimals: u32, limit: AmountLimit) -> Result<TokenAmount> {
    let amount = TokenAmount::parse(input, decimals)?;

    if amount.is_zero() {
        return Err(invalid_amount(input, "Amount must be greater than 0"));
    }

    if amount > limit.amount() {
        let reason = match limit {
            AmountLimit::Balance(_) => "Amount exceeds your available balance",
            AmountLimit::Approved(_) => "Amount exceeds your approved balance",
        };
        return Err(invalid_amount(input, reason));
    }

    Ok(amount)
}

/// Format a unix timestamp (seconds) like `Jan 5, 2025, 03:04 PM` (UTC).
pub fn format_date(unix_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(unix_seconds, 0) {
        Some(dt) => dt.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "Invalid date".to_string(),
    }
}

/// What an explorer link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerKind {
    Tx,
    Contract,
    Wallet,
}

impl ExplorerKind {
    fn path_segment(&self) -> &'static str {
        match self {
            Self::Tx => "tx",
            Self::Contract => "contract",
            Self::Wallet => "wallet",
        }
    }
}

/// Build a block explorer URL.
pub fn explorer_link(explorer_url: &str, kind: ExplorerKind, id: &str) -> String {
    format!(
        "{}/{}/{}",
        explorer_url.trim_end_matches('/'),
        kind.path_segment(),
        id
    )
}

/// Shorten an address or hash to `0x1234...abcd`.
pub fn shorten_address(value: &str) -> String {
    if value.len() <= 10 || !value.is_ascii() {
        return value.to_string();
    }
    format!("{}...{}", &value[..6], &value[value.len() - 4..])
}
