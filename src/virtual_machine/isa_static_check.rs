//! Pins the LS-8 instruction table. Every entry contributes its opcode, its
//! width and its `B`/`C` layout flags, then its mnemonic and operand list.
//! Changing any of them breaks programs already written for the machine, so
//! the change must be deliberate: update `EXPECTED_TABLE_FINGERPRINT` with the
//! value printed by `cargo test print_table_fingerprint -- --ignored --nocapture`.

#[cfg(test)]
mod tests {
    use crate::virtual_machine::isa::Instruction;

    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    const EXPECTED_TABLE_FINGERPRINT: u64 = 11256108655080327370;

    fn fnv1a64(mut h: u64, bytes: &[u8]) -> u64 {
        for b in bytes {
            h ^= *b as u64;
            h = h.wrapping_mul(FNV_PRIME);
        }
        h
    }

    /// Layout header of one entry: opcode, width, then `B | C << 1`.
    fn layout(instr: Instruction) -> [u8; 3] {
        let flags = instr.uses_alu() as u8 | (instr.sets_pc() as u8) << 1;
        [instr.opcode(), instr.width() as u8, flags]
    }

    macro_rules! fingerprint_table {
        (
            $( $(#[$doc:meta])* $name:ident = $opcode:expr, $mnemonic:literal => [ $( $field:ident : $kind:ident ),* $(,)? ] ),* $(,)?
        ) => {{
            let mut h = FNV_OFFSET;
            $(
                h = fnv1a64(h, &layout(Instruction::$name));
                h = fnv1a64(h, $mnemonic.as_bytes());
                $(
                    h = fnv1a64(h, stringify!($field).as_bytes());
                    h = fnv1a64(h, stringify!($kind).as_bytes());
                )*
            )*
            h
        }};
    }

    fn table_fingerprint() -> u64 {
        crate::for_each_instruction!(fingerprint_table)
    }

    #[test]
    #[ignore]
    fn print_table_fingerprint() {
        println!("TABLE_FINGERPRINT={}", table_fingerprint());
    }

    #[test]
    fn table_fingerprint_unchanged() {
        assert_eq!(table_fingerprint(), EXPECTED_TABLE_FINGERPRINT);
    }
}
