//! Packet validator (C3): pure, stateless, allocation-free layer-by-layer
//! validation of an incoming datagram.
//!
//! Grounded on `Receiver::parse` in `examples/original_source/src/sACN.cpp`
//! (the ordered sequence of layer checks) and on the layered parse in
//! `examples/kaelenfae-LXMonitor/src-tauri/src/network/sacn.rs`
//! (`parse_sacn_packet` / `parse_data_packet`), generalized here into a
//! reusable `Accept`/`Reject` outcome instead of an `Option<SacnPacket>`.

use super::layout::*;

/// Why a packet was rejected. Never allocates; carries only the data
/// needed to log or test the specific check that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Datagram shorter than `SACN_PACKET_MIN` or longer than `SACN_PACKET_MAX`.
    Length,
    /// Root layer preamble, postamble or ACN identifier mismatch.
    RootHeader,
    /// A reconstructed `flags+length` field did not match the datagram length.
    FlagsAndLength,
    /// Root layer vector was not `VECTOR_ROOT_E131_DATA`.
    RootVector,
    /// Framing layer vector was not `VECTOR_E131_DATA_PACKET`.
    FramingVector,
    /// Priority field exceeded `PRIORITY_MAX`.
    Priority,
    /// An options bit other than stream-terminated (bit 6) was set.
    Options,
    /// Universe did not match the receiver's configured universe.
    Universe,
    /// DMP vector/address-type/first-address/increment mismatch.
    DmpHeader,
    /// `property_value_count` did not equal `len - 125`, or was zero.
    PropertyValueCount,
    /// Start code was not NULL (0x00) and the receiver policy rejects others.
    StartCode,
}

/// Outcome of validating one datagram against a configured universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Accepted: carries the parsed fields the tracker needs next.
    Accept(AcceptedPacket),
    /// Rejected with a reason, for logging/testing.
    Reject(RejectReason),
}

/// Fields extracted from an accepted packet, handed to the source tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedPacket {
    pub priority: u8,
    pub sequence: u8,
    pub stream_terminated: bool,
    pub start_code: u8,
    /// Offset of `DMX_VALUES_ADDR` within the datagram; slots run
    /// `[dmx_values_addr, len)`.
    pub dmx_values_addr: usize,
    pub len: usize,
}

/// Receiver-side policy for non-NULL start codes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartCodePolicy {
    /// Reject any start code other than `0x00` (§4.3 rule 11 default).
    NullOnly,
    /// Accept `0x00` and `0xDD`, discarding all else; the caller is
    /// expected to route 0xDD packets to separate per-slot-priority
    /// handling rather than DMX level tracking.
    NullAndPriority,
}

/// Validates `packet` against `universe`, per §4.3 of the base spec.
///
/// Pure: no state, no allocation, no I/O. Checks run in the order the
/// original C++ `Receiver::parse` runs them, so that the first failing
/// check determines the reject reason.
pub fn validate(packet: &[u8], universe: u16, policy: StartCodePolicy) -> Validation {
    use RejectReason::*;

    let len = packet.len();
    if len < SACN_PACKET_MIN || len > SACN_PACKET_MAX {
        return Validation::Reject(Length);
    }

    if u16::from_be_bytes([packet[PREAMBLE_ADDR], packet[PREAMBLE_ADDR + 1]]) != PREAMBLE
        || u16::from_be_bytes([packet[POSTAMBLE_ADDR], packet[POSTAMBLE_ADDR + 1]]) != POSTAMBLE
        || packet[ACN_IDENTIFIER_ADDR..ACN_IDENTIFIER_ADDR + 12] != ACN_IDENTIFIER
    {
        return Validation::Reject(RootHeader);
    }

    let root_len = reconstruct_length(
        packet[ROOT_FLAGS_AND_LENGTH_ADDR],
        packet[ROOT_FLAGS_AND_LENGTH_ADDR + 1],
        ROOT_FLAGS_AND_LENGTH_ADDR,
    );
    if root_len != len {
        return Validation::Reject(FlagsAndLength);
    }

    let root_vector = u32::from_be_bytes([
        packet[VECTOR_ROOT_E131_DATA_ADDR],
        packet[VECTOR_ROOT_E131_DATA_ADDR + 1],
        packet[VECTOR_ROOT_E131_DATA_ADDR + 2],
        packet[VECTOR_ROOT_E131_DATA_ADDR + 3],
    ]);
    if root_vector != VECTOR_ROOT_E131_DATA {
        return Validation::Reject(RootVector);
    }

    let framing_len = reconstruct_length(
        packet[FRAMING_FLAGS_AND_LENGTH_ADDR],
        packet[FRAMING_FLAGS_AND_LENGTH_ADDR + 1],
        FRAMING_FLAGS_AND_LENGTH_ADDR,
    );
    if framing_len != len {
        return Validation::Reject(FlagsAndLength);
    }

    let framing_vector = u32::from_be_bytes([
        packet[VECTOR_E131_DATA_PACKET_ADDR],
        packet[VECTOR_E131_DATA_PACKET_ADDR + 1],
        packet[VECTOR_E131_DATA_PACKET_ADDR + 2],
        packet[VECTOR_E131_DATA_PACKET_ADDR + 3],
    ]);
    if framing_vector != VECTOR_E131_DATA_PACKET {
        return Validation::Reject(FramingVector);
    }

    let priority = packet[PRIORITY_ADDR];
    if priority > PRIORITY_MAX {
        return Validation::Reject(Priority);
    }

    let options = packet[OPTIONS_ADDR];
    if options & !OPTION_STREAM_TERMINATED != 0 {
        return Validation::Reject(Options);
    }
    let stream_terminated = options & OPTION_STREAM_TERMINATED != 0;

    let packet_universe =
        u16::from_be_bytes([packet[UNIVERSE_ADDR], packet[UNIVERSE_ADDR + 1]]);
    if packet_universe != universe {
        return Validation::Reject(Universe);
    }

    let dmp_len = reconstruct_length(
        packet[DMP_FLAGS_AND_LENGTH_ADDR],
        packet[DMP_FLAGS_AND_LENGTH_ADDR + 1],
        DMP_FLAGS_AND_LENGTH_ADDR,
    );
    if dmp_len != len {
        return Validation::Reject(FlagsAndLength);
    }

    if packet[VECTOR_DMP_SET_PROPERTY_ADDR] != VECTOR_DMP_SET_PROPERTY
        || packet[DMP_ADDRESS_AND_DATA_ADDR] != DMP_ADDRESS_AND_DATA
        || u16::from_be_bytes([
            packet[FIRST_PROPERTY_ADDRESS_ADDR],
            packet[FIRST_PROPERTY_ADDRESS_ADDR + 1],
        ]) != FIRST_PROPERTY_ADDRESS
        || u16::from_be_bytes([packet[ADDRESS_INC_ADDR], packet[ADDRESS_INC_ADDR + 1]])
            != ADDRESS_INC
    {
        return Validation::Reject(DmpHeader);
    }

    let property_value_count = u16::from_be_bytes([
        packet[PROPERTY_VALUE_COUNT_ADDR],
        packet[PROPERTY_VALUE_COUNT_ADDR + 1],
    ]) as usize;
    if property_value_count == 0 || property_value_count != len - STARTCODE_ADDR {
        return Validation::Reject(PropertyValueCount);
    }

    let start_code = packet[STARTCODE_ADDR];
    let start_code_ok = match policy {
        StartCodePolicy::NullOnly => start_code == STARTCODE_DMX,
        StartCodePolicy::NullAndPriority => {
            start_code == STARTCODE_DMX || start_code == STARTCODE_PRIORITY
        }
    };
    if !start_code_ok {
        return Validation::Reject(StartCode);
    }

    Validation::Accept(AcceptedPacket {
        priority,
        sequence: packet[SEQ_NUM_ADDR],
        stream_terminated,
        start_code,
        dmx_values_addr: DMX_VALUES_ADDR,
        len,
    })
}
