//! Derived addresses.
//!
//! A record's address is a pure function of fixed seed material, the
//! owning wallet and/or event id, and the program id, so a client can find
//! a record without any lookup table:
//!
//! | Record  | Seeds                                   |
//! |---------|-----------------------------------------|
//! | profile | `"player"`, owner                       |
//! | bet     | `"bet"`, owner, event id (u64 LE)       |
//! | event   | `"event"`, event id (u64 LE)            |

use crate::types::Address;
use sha2::{Digest, Sha256};

pub const PLAYER_SEED: &[u8] = b"player";
pub const BET_SEED: &[u8] = b"bet";
pub const EVENT_SEED: &[u8] = b"event";

const DERIVATION_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Hash `seeds`, then the program id, then a fixed marker.
pub fn derive(seeds: &[&[u8]], program_id: &Address) -> Address {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(DERIVATION_MARKER);
    Address::new(hasher.finalize().into())
}

pub fn profile_address(program_id: &Address, owner: &Address) -> Address {
    derive(&[PLAYER_SEED, owner.as_bytes()], program_id)
}

pub fn bet_address(program_id: &Address, owner: &Address, event_id: u64) -> Address {
    derive(
        &[BET_SEED, owner.as_bytes(), &event_id.to_le_bytes()],
        program_id,
    )
}

pub fn event_address(program_id: &Address, event_id: u64) -> Address {
    derive(&[EVENT_SEED, &event_id.to_le_bytes()], program_id)
}
