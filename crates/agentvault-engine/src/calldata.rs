//! Instruction payload validation
//!
//! The engine forwards opaque payloads to venues, validating only what
//! it can. Every payload must carry a 4-byte selector and stay within a
//! sane length bound. For the one entry-point format the engine knows
//! (`swapExactInput`), the declared input asset, output asset, and input
//! amount are decoded and must match the authorized action exactly -
//! otherwise a payload could swap different assets or amounts than what
//! the signature covered.
//!
//! Payloads for unrecognized selectors are forwarded after the length
//! checks only. This is a deliberate residual trust boundary: the
//! whitelist decides which (venue, selector) pairs an owner accepts
//! deep-validation gaps for.

use agentvault_types::{Address, Amount, Result, Selector, VaultError};
use agentvault_crypto::keccak256;
use std::sync::OnceLock;

/// Minimum payload length: the selector itself
pub const MIN_PAYLOAD_LEN: usize = 4;

/// Maximum payload length; blocks gas-exhaustion-sized payloads
pub const MAX_PAYLOAD_LEN: usize = 8192;

/// ABI word size
const WORD: usize = 32;

/// Entry-point signature of the known exact-input swap format
const EXACT_INPUT_SIGNATURE: &str = "swapExactInput(address,address,uint256,uint256,address)";

/// Selector of the known exact-input swap entry point
pub fn exact_input_selector() -> Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    *SELECTOR.get_or_init(|| {
        let hash = keccak256(EXACT_INPUT_SIGNATURE.as_bytes());
        Selector::new([hash[0], hash[1], hash[2], hash[3]])
    })
}

/// Extract the selector from a payload head
pub fn selector_of(payload: &[u8]) -> Result<Selector> {
    Selector::from_payload(payload).ok_or_else(|| VaultError::InvalidSwapCalldata {
        message: format!("payload too short: {} bytes", payload.len()),
    })
}

/// Validate a payload against the action it claims to execute
pub fn validate(
    payload: &[u8],
    input_asset: &Address,
    output_asset: &Address,
    input_amount: Amount,
) -> Result<()> {
    if payload.len() < MIN_PAYLOAD_LEN || payload.len() > MAX_PAYLOAD_LEN {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!("payload length {} out of bounds", payload.len()),
        });
    }

    let selector = selector_of(payload)?;
    if selector != exact_input_selector() {
        // Unrecognized format: forwarded with selector-level checks only.
        return Ok(());
    }

    let declared_input = decode_address(payload, 0)?;
    let declared_output = decode_address(payload, 1)?;
    let declared_amount = decode_amount(payload, 2)?;

    if &declared_input != input_asset {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!(
                "declared input asset {} does not match authorized {}",
                declared_input, input_asset
            ),
        });
    }
    if &declared_output != output_asset {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!(
                "declared output asset {} does not match authorized {}",
                declared_output, output_asset
            ),
        });
    }
    if declared_amount != input_amount {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!(
                "declared input amount {} does not match authorized {}",
                declared_amount, input_amount
            ),
        });
    }
    Ok(())
}

/// Encode an exact-input swap payload (caller and test helper)
pub fn encode_exact_input(
    input_asset: &Address,
    output_asset: &Address,
    input_amount: Amount,
    min_output: Amount,
    recipient: &Address,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + 5 * WORD);
    out.extend_from_slice(exact_input_selector().as_bytes());
    out.extend_from_slice(&address_word(input_asset));
    out.extend_from_slice(&address_word(output_asset));
    out.extend_from_slice(&amount_word(input_amount));
    out.extend_from_slice(&amount_word(min_output));
    out.extend_from_slice(&address_word(recipient));
    out
}

fn word_at(payload: &[u8], index: usize) -> Result<&[u8]> {
    let start = MIN_PAYLOAD_LEN + index * WORD;
    payload
        .get(start..start + WORD)
        .ok_or_else(|| VaultError::InvalidSwapCalldata {
            message: format!("payload truncated at word {}", index),
        })
}

fn decode_address(payload: &[u8], index: usize) -> Result<Address> {
    let word = word_at(payload, index)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!("word {} is not a valid address", index),
        });
    }
    // Length is exact after the slice above.
    Ok(Address::from_slice(&word[12..]).unwrap_or(Address::ZERO))
}

fn decode_amount(payload: &[u8], index: usize) -> Result<Amount> {
    let word = word_at(payload, index)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Err(VaultError::InvalidSwapCalldata {
            message: format!("word {} exceeds the representable amount range", index),
        });
    }
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&word[16..]);
    Ok(Amount::new(u128::from_be_bytes(raw)))
}

fn address_word(addr: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(addr.as_bytes());
    word
}

fn amount_word(amount: Amount) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&amount.value().to_be_bytes());
    word
}
