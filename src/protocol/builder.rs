//! Packet builder (C2): assembles a zero-initialised E1.31 template and
//! patches it in place as the host mutates CID, name, universe, priority,
//! sequence and slot data.
//!
//! Grounded on `Source::initPacket` / `Source::CID` / `Source::dmx` /
//! `Source::send` in `examples/original_source/src/sACN.cpp`, with the
//! explicit byte-by-byte field layout cross-checked against
//! `build_sacn_packet` in
//! `examples/MrLongNight-MapFlow/crates/mapmap-control/src/dmx/sacn.rs`.

use super::layout::*;

/// A fixed 638-octet E1.31 data packet buffer (126-byte header + 512 slots),
/// built once and then patched in place for each transmission.
///
/// The `flags+length` fields are always computed for the maximum slot
/// count (512), so the buffer never changes size: unused trailing slots are
/// simply sent as zero, matching the original Arduino library's
/// fixed-size `SACN_BUFFER_MAX` packet.
#[derive(Clone)]
pub struct PacketTemplate {
    buf: [u8; SACN_PACKET_MAX],
}

impl PacketTemplate {
    /// Builds a conformant template for `(cid, name, universe, priority,
    /// start_code)` with `sequence = 0`, `options = 0` and a zeroed slot
    /// array.
    pub fn build(cid: [u8; 16], name: &[u8], universe: u16, priority: u8, start_code: u8) -> Self {
        let mut buf = [0u8; SACN_PACKET_MAX];
        let total_len = SACN_PACKET_MAX;

        // Root layer.
        buf[PREAMBLE_ADDR..PREAMBLE_ADDR + 2].copy_from_slice(&PREAMBLE.to_be_bytes());
        buf[POSTAMBLE_ADDR..POSTAMBLE_ADDR + 2].copy_from_slice(&POSTAMBLE.to_be_bytes());
        buf[ACN_IDENTIFIER_ADDR..ACN_IDENTIFIER_ADDR + 12].copy_from_slice(&ACN_IDENTIFIER);
        let root_len = flags_and_length(total_len, ROOT_FLAGS_AND_LENGTH_ADDR);
        buf[ROOT_FLAGS_AND_LENGTH_ADDR..ROOT_FLAGS_AND_LENGTH_ADDR + 2]
            .copy_from_slice(&root_len.to_be_bytes());
        buf[VECTOR_ROOT_E131_DATA_ADDR..VECTOR_ROOT_E131_DATA_ADDR + 4]
            .copy_from_slice(&VECTOR_ROOT_E131_DATA.to_be_bytes());
        buf[CID_ADDR..CID_ADDR + CID_SIZE].copy_from_slice(&cid);

        // Framing layer.
        let framing_len = flags_and_length(total_len, FRAMING_FLAGS_AND_LENGTH_ADDR);
        buf[FRAMING_FLAGS_AND_LENGTH_ADDR..FRAMING_FLAGS_AND_LENGTH_ADDR + 2]
            .copy_from_slice(&framing_len.to_be_bytes());
        buf[VECTOR_E131_DATA_PACKET_ADDR..VECTOR_E131_DATA_PACKET_ADDR + 4]
            .copy_from_slice(&VECTOR_E131_DATA_PACKET.to_be_bytes());
        let name_len = name.len().min(SOURCE_NAME_SIZE - 1);
        buf[SOURCE_NAME_ADDR..SOURCE_NAME_ADDR + name_len].copy_from_slice(&name[..name_len]);
        buf[PRIORITY_ADDR] = priority.min(PRIORITY_MAX);
        buf[SYNC_ADDRESS_ADDR..SYNC_ADDRESS_ADDR + 2].copy_from_slice(&0u16.to_be_bytes());
        buf[SEQ_NUM_ADDR] = 0;
        buf[OPTIONS_ADDR] = 0;
        buf[UNIVERSE_ADDR..UNIVERSE_ADDR + 2].copy_from_slice(&universe.to_be_bytes());

        // DMP layer.
        let dmp_len = flags_and_length(total_len, DMP_FLAGS_AND_LENGTH_ADDR);
        buf[DMP_FLAGS_AND_LENGTH_ADDR..DMP_FLAGS_AND_LENGTH_ADDR + 2]
            .copy_from_slice(&dmp_len.to_be_bytes());
        buf[VECTOR_DMP_SET_PROPERTY_ADDR] = VECTOR_DMP_SET_PROPERTY;
        buf[DMP_ADDRESS_AND_DATA_ADDR] = DMP_ADDRESS_AND_DATA;
        buf[FIRST_PROPERTY_ADDRESS_ADDR..FIRST_PROPERTY_ADDRESS_ADDR + 2]
            .copy_from_slice(&FIRST_PROPERTY_ADDRESS.to_be_bytes());
        buf[ADDRESS_INC_ADDR..ADDRESS_INC_ADDR + 2].copy_from_slice(&ADDRESS_INC.to_be_bytes());
        let property_value_count = 1 + DMX_SLOTS_MAX as u16;
        buf[PROPERTY_VALUE_COUNT_ADDR..PROPERTY_VALUE_COUNT_ADDR + 2]
            .copy_from_slice(&property_value_count.to_be_bytes());
        buf[STARTCODE_ADDR] = start_code;

        Self { buf }
    }

    /// A template with the DD (per-slot priority) start code, pre-filled
    /// with `priority` in all 512 slots (`Source::sacnPacketDD` init in the
    /// original).
    pub fn build_priority(cid: [u8; 16], name: &[u8], universe: u16, priority: u8) -> Self {
        let mut t = Self::build(cid, name, universe, priority, STARTCODE_PRIORITY);
        t.buf[DMX_VALUES_ADDR..DMX_VALUES_ADDR + DMX_SLOTS_MAX].fill(priority.min(PRIORITY_MAX));
        t
    }

    /// Raw wire bytes, always `SACN_PACKET_MAX` (638) long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Patches the CID in place (idempotent byte copy).
    pub fn set_cid(&mut self, cid: [u8; 16]) {
        self.buf[CID_ADDR..CID_ADDR + CID_SIZE].copy_from_slice(&cid);
    }

    /// Patches the source name in place, null-padding/truncating to 64 bytes.
    pub fn set_name(&mut self, name: &[u8]) {
        let field = &mut self.buf[SOURCE_NAME_ADDR..SOURCE_NAME_ADDR + SOURCE_NAME_SIZE];
        field.fill(0);
        let len = name.len().min(SOURCE_NAME_SIZE - 1);
        field[..len].copy_from_slice(&name[..len]);
    }

    /// Writes one slot, `i in [1, 512]`. Out-of-range indices are a
    /// silent no-op, matching `Source::dmx(slot, data)` in the original.
    pub fn set_slot(&mut self, i: u16, v: u8) {
        if i >= 1 && i as usize <= DMX_SLOTS_MAX {
            self.buf[DMX_VALUES_ADDR + (i as usize - 1)] = v;
        }
    }

    /// Bulk slot copy (`Source::dmx(buf[512])`).
    pub fn set_all_slots(&mut self, slots: &[u8; DMX_SLOTS_MAX]) {
        self.buf[DMX_VALUES_ADDR..DMX_VALUES_ADDR + DMX_SLOTS_MAX].copy_from_slice(slots);
    }

    /// Current sequence number (framing layer offset 111).
    pub fn sequence(&self) -> u8 {
        self.buf[SEQ_NUM_ADDR]
    }

    /// Overwrites the sequence number directly (used by the DD stream,
    /// which shares the NULL stream's counter — §9 open question 3).
    pub fn set_sequence(&mut self, seq: u8) {
        self.buf[SEQ_NUM_ADDR] = seq;
    }

    /// Adds 1 modulo 256 to the sequence number.
    pub fn increment_sequence(&mut self) {
        self.buf[SEQ_NUM_ADDR] = self.buf[SEQ_NUM_ADDR].wrapping_add(1);
    }

    /// Sets the framing-options stream-terminated bit (bit 6).
    pub fn mark_terminated(&mut self) {
        self.buf[OPTIONS_ADDR] |= OPTION_STREAM_TERMINATED;
    }

    /// Clears the stream-terminated bit, restoring normal data-carrying mode.
    pub fn clear_terminated(&mut self) {
        self.buf[OPTIONS_ADDR] &= !OPTION_STREAM_TERMINATED;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cid() -> [u8; 16] {
        let mut cid = [0u8; 16];
        for (i, b) in cid.iter_mut().enumerate() {
            *b = i as u8;
        }
        cid
    }

    #[test]
    fn build_produces_fixed_638_byte_packet() {
        let t = PacketTemplate::build(sample_cid(), b"console", 1, 100, STARTCODE_DMX);
        assert_eq!(t.as_bytes().len(), SACN_PACKET_MAX);
        assert_eq!(t.as_bytes().len(), 638);
    }

    #[test]
    fn build_writes_expected_fixed_fields() {
        let t = PacketTemplate::build(sample_cid(), b"console", 7, 150, STARTCODE_DMX);
        let b = t.as_bytes();
        assert_eq!(&b[ACN_IDENTIFIER_ADDR..ACN_IDENTIFIER_ADDR + 12], &ACN_IDENTIFIER);
        assert_eq!(b[PRIORITY_ADDR], 150);
        assert_eq!(u16::from_be_bytes([b[UNIVERSE_ADDR], b[UNIVERSE_ADDR + 1]]), 7);
        assert_eq!(b[STARTCODE_ADDR], STARTCODE_DMX);
        assert_eq!(b[SEQ_NUM_ADDR], 0);
        assert_eq!(b[OPTIONS_ADDR], 0);
    }

    #[test]
    fn priority_template_fills_all_slots() {
        let t = PacketTemplate::build_priority(sample_cid(), b"console", 1, 77);
        let b = t.as_bytes();
        assert_eq!(b[STARTCODE_ADDR], STARTCODE_PRIORITY);
        assert!(b[DMX_VALUES_ADDR..].iter().all(|&v| v == 77));
    }

    #[test]
    fn set_slot_is_noop_out_of_range() {
        let mut t = PacketTemplate::build(sample_cid(), b"x", 1, 100, STARTCODE_DMX);
        t.set_slot(0, 0xFF);
        t.set_slot(513, 0xFF);
        assert!(t.as_bytes()[DMX_VALUES_ADDR..].iter().all(|&v| v == 0));
        t.set_slot(1, 0xAA);
        t.set_slot(512, 0xBB);
        assert_eq!(t.as_bytes()[DMX_VALUES_ADDR], 0xAA);
        assert_eq!(t.as_bytes()[DMX_VALUES_ADDR + 511], 0xBB);
    }

    #[test]
    fn increment_sequence_wraps_modulo_256() {
        let mut t = PacketTemplate::build(sample_cid(), b"x", 1, 100, STARTCODE_DMX);
        t.set_sequence(255);
        t.increment_sequence();
        assert_eq!(t.sequence(), 0);
    }

    #[test]
    fn mark_terminated_sets_only_bit_six() {
        let mut t = PacketTemplate::build(sample_cid(), b"x", 1, 100, STARTCODE_DMX);
        t.mark_terminated();
        assert_eq!(t.as_bytes()[OPTIONS_ADDR], OPTION_STREAM_TERMINATED);
    }
}
