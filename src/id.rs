//! Identifier helpers (C7): RFC 9562 version-4 UUID generation/formatting
//! for the source CID, and RFC 9542 local-MAC formatting.
//!
//! Grounded on `examples/original_source/src/IDTools.h`
//! (`generateCID`/`verifyCID`/`CIDtoString`/`generateMAC`/`MACtoString`),
//! reworked per §9 "static per-module buffers → owned instances": every
//! function here returns a value instead of writing into a shared static
//! buffer.

use rand::RngCore;

/// Fills 16 random octets and patches in the version/variant nibbles for
/// a version-4 (random) UUID: `b[6] = 0x40 | (b[6] & 0x0F)`,
/// `b[8] = 0x80 | (b[8] & 0x3F)`.
pub fn generate_uuid_v4<R: RngCore + ?Sized>(rng: &mut R) -> [u8; 16] {
    let mut b = [0u8; 16];
    rng.fill_bytes(&mut b);
    b[6] = 0x40 | (b[6] & 0x0F);
    b[8] = 0x80 | (b[8] & 0x3F);
    b
}

/// Returns the UUID version nibble (`u[6] >> 4`) when it lies in `[1, 7]`
/// and the variant bits (`u[8] >> 6`) equal `0b10`; otherwise `0`.
pub fn verify_uuid(u: &[u8; 16]) -> u8 {
    let version = u[6] >> 4;
    if (1..=7).contains(&version) && (u[8] >> 6) == 0b10 {
        version
    } else {
        0
    }
}

/// Formats a UUID as `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, upper-case
/// hex, 36 characters.
pub fn format_uuid(u: &[u8; 16]) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
        u[0], u[1], u[2], u[3],
        u[4], u[5],
        u[6], u[7],
        u[8], u[9],
        u[10], u[11], u[12], u[13], u[14], u[15],
    )
}

/// Fills 6 random octets and clears/sets the locally-administered unicast
/// bits: `b[0] &= !0x01` (unicast), `b[0] |= 0x02` (locally administered),
/// `b[0] &= !0x0C` (administratively assigned).
pub fn generate_local_mac<R: RngCore + ?Sized>(rng: &mut R) -> [u8; 6] {
    let mut b = [0u8; 6];
    rng.fill_bytes(&mut b);
    b[0] &= !0x01;
    b[0] |= 0x02;
    b[0] &= !0x0C;
    b
}

/// Formats a MAC as `XX:XX:XX:XX:XX:XX`, upper-case hex.
pub fn format_mac(m: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        m[0], m[1], m[2], m[3], m[4], m[5]
    )
}
