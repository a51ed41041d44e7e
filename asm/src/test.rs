use crate::*;

#[test]
fn assembles_loadi_then_halt() {
    let (words, _) = assemble("LOADI R1, 0x2A\nHALT\n").unwrap();
    assert_eq!(words, vec![0xC12A, 0xFFFF]);
}

#[test]
fn labels_are_case_sensitive_and_resolve_forward() {
    let source = "\
    LOADI R1, 0
    BEQ R1, skip
    LOADI R2, 1
skip:
    HALT
";
    let (words, labels) = assemble(source).unwrap();
    // BEQ's offset field must equal 1: it skips exactly one instruction.
    assert_eq!(words[1] & 0x00FF, 0x01);
    assert_eq!(labels.get("skip"), Some(&6));
}

#[test]
fn unknown_label_is_an_error_and_emits_no_code() {
    let err = assemble("JMP nowhere\nHALT\n").unwrap_err();
    assert!(matches!(err, AssembleError::UnknownLabel { label, .. } if label == "nowhere"));
}

#[test]
fn duplicate_label_is_an_error() {
    let source = "start:\n  NOP\nstart:\n  HALT\n";
    let err = assemble(source).unwrap_err();
    assert!(matches!(err, AssembleError::DuplicateLabel { label, .. } if label == "start"));
}

#[test]
fn unknown_mnemonic_is_an_error() {
    let err = assemble("FROB R1, R2, R3\n").unwrap_err();
    assert!(matches!(err, AssembleError::UnknownMnemonic { mnemonic, .. } if mnemonic == "FROB"));
}

#[test]
fn wrong_operand_arity_is_an_error() {
    let err = assemble("ADD R1, R2\n").unwrap_err();
    assert!(matches!(
        err,
        AssembleError::OperandArity {
            expected: 3,
            found: 2,
            ..
        }
    ));
}

#[test]
fn immediate_out_of_range_is_an_error() {
    let err = assemble("LOADI R1, 300\n").unwrap_err();
    assert!(matches!(err, AssembleError::ImmediateOutOfRange { .. }));
}

#[test]
fn branch_offset_out_of_range_is_an_error() {
    let mut source = String::from("BEQ R1, far\n");
    for _ in 0..200 {
        source.push_str("NOP\n");
    }
    source.push_str("far:\nHALT\n");
    let err = assemble(&source).unwrap_err();
    assert!(matches!(err, AssembleError::BranchOutOfRange { .. }));
}

#[test]
fn load_store_use_offset_register_syntax() {
    let (words, _) = assemble("LOAD R1, 4(R2)\nSTORE R1, 4(R2)\n").unwrap();
    assert_eq!(words[0], 0xA124);
    assert_eq!(words[1], 0xB124);
}

#[test]
fn mnemonics_and_registers_are_case_insensitive() {
    let (words, _) = assemble("loadi r1, 0x2a\nhalt\n").unwrap();
    assert_eq!(words, vec![0xC12A, 0xFFFF]);
}

#[test]
fn comment_only_and_blank_lines_are_skipped() {
    let source = "; a full comment line\n\nNOP ; trailing comment\n\nHALT\n";
    let (words, _) = assemble(source).unwrap();
    assert_eq!(words, vec![0x0000, 0xFFFF]);
}

#[test]
fn jmp_accepts_a_label_or_a_bare_address() {
    let (words, labels) = assemble("start:\nJMP start\nJMP 0x123\nHALT\n").unwrap();
    assert_eq!(*labels.get("start").unwrap(), 0);
    assert_eq!(words[0], 0xD000);
    assert_eq!(words[1], 0xD123);
}

#[test]
fn round_trips_through_the_disassembler() {
    let source = "\
loop:
    LOADI R1, 5
    ADDI R1, 0x01
    BNE R1, loop
    HALT
";
    let (words, _) = assemble(source).unwrap();
    let records = vm16::disassemble(&words);

    assert_eq!(records[0].mnemonic, "LOADI");
    assert_eq!(records[1].mnemonic, "ADDI");
    assert_eq!(records[2].mnemonic, "BNE");
    // the branch offset must point back at `loop`'s address, 0x0000.
    assert_eq!(records[2].comment, "-> 0x0000");
    assert_eq!(records[3].mnemonic, "HALT");
}
