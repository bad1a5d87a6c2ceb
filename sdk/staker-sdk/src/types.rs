use crate::error::{Result, StakerSdkError};
use std::fmt;
use std::str::FromStr;

const NAME_CHARSET: &[u8] = b".12345abcdefghijklmnopqrstuvwxyz";

/// On-chain account identifier (base32 `name`, packs to a u64)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountName(String);

impl AccountName {
    /// Validate and wrap an account name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Packed 64-bit representation used on the wire
    pub fn value(&self) -> u64 {
        name_to_u64(&self.0)
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountName {
    type Err = StakerSdkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

fn char_to_symbol(c: u8) -> u64 {
    match c {
        b'a'..=b'z' => (c - b'a') as u64 + 6,
        b'1'..=b'5' => (c - b'1') as u64 + 1,
        _ => 0,
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| StakerSdkError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(invalid("empty"));
    }
    if bytes.len() > 13 {
        return Err(invalid("longer than 13 characters"));
    }
    if let Some(c) = bytes.iter().find(|c| !NAME_CHARSET.contains(c)) {
        return Err(invalid(&format!("character '{}' not allowed", *c as char)));
    }
    if bytes.len() == 13 && char_to_symbol(bytes[12]) > 0x0f {
        return Err(invalid("13th character must be one of .12345abcdefghij"));
    }
    if bytes.ends_with(b".") {
        return Err(invalid("trailing '.'"));
    }
    Ok(())
}

/// Encode a name; callers must validate first
pub(crate) fn name_to_u64(name: &str) -> u64 {
    let bytes = name.as_bytes();
    let mut value = 0u64;
    for i in 0..=12 {
        let mut c = bytes.get(i).map(|c| char_to_symbol(*c)).unwrap_or(0);
        if i < 12 {
            c &= 0x1f;
            c <<= 64 - 5 * (i + 1);
        } else {
            c &= 0x0f;
        }
        value |= c;
    }
    value
}

/// Token symbol: precision plus up to seven uppercase letters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    precision: u8,
    code: [u8; 7],
    len: usize,
}

impl Symbol {
    pub fn new(code: &str, precision: u8) -> Result<Self> {
        let bytes = code.as_bytes();
        if bytes.is_empty() || bytes.len() > 7 {
            return Err(StakerSdkError::InvalidAsset(format!(
                "symbol code '{}' must be 1-7 characters",
                code
            )));
        }
        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(StakerSdkError::InvalidAsset(format!(
                "symbol code '{}' must be uppercase A-Z",
                code
            )));
        }
        if precision > 18 {
            return Err(StakerSdkError::InvalidAsset(format!(
                "precision {} out of range",
                precision
            )));
        }
        let mut buf = [0u8; 7];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            precision,
            code: buf,
            len: bytes.len(),
        })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn code(&self) -> &str {
        // constructor only admits ASCII
        std::str::from_utf8(&self.code[..self.len]).unwrap_or_default()
    }

    /// Units per whole token (10^precision)
    pub fn unit(&self) -> i64 {
        10i64.pow(self.precision as u32)
    }

    /// Packed 64-bit representation: byte 0 precision, bytes 1..=7 code
    pub fn value(&self) -> u64 {
        let mut value = self.precision as u64;
        for (i, c) in self.code[..self.len].iter().enumerate() {
            value |= (*c as u64) << (8 * (i + 1));
        }
        value
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code())
    }
}

/// Fixed-point token quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl Asset {
    pub fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    pub fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    /// Convert a decimal quantity to integer units, rounding to the symbol precision
    pub fn from_decimal(quantity: f64, symbol: Symbol) -> Result<Self> {
        let scaled = (quantity * symbol.unit() as f64).round();
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
            return Err(StakerSdkError::InvalidAsset(format!(
                "{} cannot be represented at precision {}",
                quantity,
                symbol.precision()
            )));
        }
        Ok(Self::new(scaled as i64, symbol))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.symbol.unit().unsigned_abs();
        let abs = self.amount.unsigned_abs();
        let sign = if self.amount < 0 { "-" } else { "" };
        if self.symbol.precision() == 0 {
            write!(f, "{}{} {}", sign, abs, self.symbol.code())
        } else {
            write!(
                f,
                "{}{}.{:0width$} {}",
                sign,
                abs / unit,
                abs % unit,
                self.symbol.code(),
                width = self.symbol.precision() as usize
            )
        }
    }
}

impl FromStr for Asset {
    type Err = StakerSdkError;

    /// Parse `"123.45678900 WAX"`; the precision is the number of fraction digits
    fn from_str(s: &str) -> Result<Self> {
        let bad = || StakerSdkError::InvalidAsset(s.to_string());

        let mut parts = s.split_whitespace();
        let quantity = parts.next().ok_or_else(bad)?;
        let code = parts.next().ok_or_else(bad)?;
        if parts.next().is_some() {
            return Err(bad());
        }

        let (negative, digits) = match quantity.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, quantity),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }

        let symbol = Symbol::new(code, fraction.len() as u8)?;
        let whole: i64 = whole.parse().map_err(|_| bad())?;
        let fraction: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| bad())?
        };
        let amount = whole
            .checked_mul(symbol.unit())
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(bad)?;

        Ok(Self::new(if negative { -amount } else { amount }, symbol))
    }
}

/// Staked resource weights an account currently receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceWeights {
    pub cpu: i64,
    pub net: i64,
}

/// Chain reference data needed to build a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: [u8; 32],
    pub head_block_id: [u8; 32],
    pub head_block_num: u32,
}

impl ChainInfo {
    /// Low 16 bits of the block number embedded in the block id
    pub fn ref_block_num(&self) -> u16 {
        let num = u32::from_be_bytes([
            self.head_block_id[0],
            self.head_block_id[1],
            self.head_block_id[2],
            self.head_block_id[3],
        ]);
        (num & 0xffff) as u16
    }

    pub fn ref_block_prefix(&self) -> u32 {
        u32::from_le_bytes([
            self.head_block_id[8],
            self.head_block_id[9],
            self.head_block_id[10],
            self.head_block_id[11],
        ])
    }
}
