//! Text rendering of bit-field values.

use alloy_primitives::{hex, Address, U256};

use crate::error::DecodeFault;
use crate::model::{As, AttributeType, BitField, Origin, Syntax};
use crate::util::time::{format_unix_seconds, GeneralizedTime};

/// Renders a value extracted from a token id as display text.
pub fn render(attribute: &AttributeType, field: &BitField, value: U256) -> Result<String, DecodeFault> {
    if let Origin::Mapping { members, .. } = &attribute.origin {
        return members.get(&value).cloned().ok_or(DecodeFault::UnknownMappingKey);
    }

    match (attribute.syntax, attribute.value_as) {
        (Syntax::GeneralizedTime, As::Utf8) => {
            let text = utf8(value)?;
            GeneralizedTime::parse(&text)
                .map(|time| time.to_rfc3339())
                .map_err(|_| DecodeFault::InvalidTime { text })
        }
        (Syntax::GeneralizedTime, _) => unix_seconds(value),
        (Syntax::Boolean, _) => Ok(boolean(value)),
        (Syntax::Integer | Syntax::NumericString, As::Utf8) => Ok(value.to_string()),
        (_, value_as) => render_as(value_as, field, value),
    }
}

fn render_as(value_as: As, field: &BitField, value: U256) -> Result<String, DecodeFault> {
    match value_as {
        As::Unsigned => Ok(value.to_string()),
        As::Signed => Ok(signed(value, field.width())),
        As::Utf8 => utf8(value),
        As::Bytes => Ok(format!("0x{}", hex::encode(minimal_bytes(&value)))),
        As::E2 | As::E4 | As::E6 | As::E8 | As::E18 => {
            Ok(scaled(value, value_as.decimals().unwrap_or_default()))
        }
        As::Boolean => Ok(boolean(value)),
        As::Mapping => Err(DecodeFault::UnknownMappingKey),
        As::Address => address(value),
    }
}

fn boolean(value: U256) -> String {
    let text = if value.is_zero() { "FALSE" } else { "TRUE" };
    text.to_string()
}

/// Big-endian bytes without leading zeros.
fn minimal_bytes(value: &U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn utf8(value: U256) -> Result<String, DecodeFault> {
    String::from_utf8(minimal_bytes(&value)).map_err(|_| DecodeFault::InvalidUtf8)
}

/// Two's complement interpretation over `width` bits.
fn signed(value: U256, width: usize) -> String {
    if width == 0 || !value.bit(width - 1) {
        return value.to_string();
    }
    let ones = if width >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << width) - U256::from(1u8)
    };
    let magnitude = (!value).wrapping_add(U256::from(1u8)) & ones;
    format!("-{}", magnitude)
}

/// Decimal with `decimals` fractional digits, trailing zeros trimmed.
fn scaled(value: U256, decimals: usize) -> String {
    let digits = value.to_string();
    let digits = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int, frac) = digits.split_at(digits.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{}.{}", int, frac)
    }
}

fn address(value: U256) -> Result<String, DecodeFault> {
    if value.bit_len() > 160 {
        return Err(DecodeFault::Overflow { context: "address" });
    }
    let bytes = value.to_be_bytes::<32>();
    Ok(Address::from_slice(&bytes[12..]).to_checksum(None))
}

fn unix_seconds(value: U256) -> Result<String, DecodeFault> {
    if value.bit_len() > 63 {
        return Err(DecodeFault::Overflow { context: "timestamp" });
    }
    format_unix_seconds(value.as_limbs()[0] as i64).ok_or(DecodeFault::Overflow { context: "timestamp" })
}
