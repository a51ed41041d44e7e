use super::*;

#[test]
fn assembles_to_machine_code_and_labels() {
    let response = assemble_source("start:\nLOADI R1, 0x2A\nHALT\n").unwrap();
    assert_eq!(response.machine_code, vec![0xC12A, 0xFFFF]);
    assert_eq!(response.labels.get("start"), Some(&0));
}

#[test]
fn executes_to_halt() {
    let request = ExecutionRequest {
        machine_code: vec![0xC12A, 0xFFFF],
        max_cycles: 1000,
        start: 0,
        allow_out_of_range_memory: false,
    };
    let response = execute(&request).unwrap();
    assert!(response.halted);
    assert_eq!(response.final_cycle_count, 2);
    assert_eq!(response.final_snapshot.registers[1], 0x002A);
    // The halting step itself is not appended to the history.
    assert_eq!(response.history.len(), 1);
}

#[test]
fn out_of_range_memory_surfaces_as_a_fault_string_by_default() {
    let request = ExecutionRequest {
        machine_code: vec![0xC1FF, 0xA110, 0xFFFF],
        max_cycles: 1000,
        start: 0,
        allow_out_of_range_memory: false,
    };
    let response = execute(&request).unwrap();
    assert!(!response.halted);
    assert!(response.fault.is_some());
}

#[test]
fn allow_out_of_range_memory_opts_out_of_the_fault() {
    let request = ExecutionRequest {
        machine_code: vec![0xC1FF, 0xA110, 0xFFFF],
        max_cycles: 1000,
        start: 0,
        allow_out_of_range_memory: true,
    };
    let response = execute(&request).unwrap();
    assert!(response.halted);
    assert!(response.fault.is_none());
}

#[test]
fn disassembles_a_known_word() {
    let records = disassemble_words(&[0xC12A]);
    assert_eq!(records[0].mnemonic, "LOADI");
    assert_eq!(records[0].operands, "R1, 0x2A");
}

#[test]
fn assembly_error_surfaces_through_cli_error() {
    let err = assemble_source("JMP nowhere\n").unwrap_err();
    assert!(matches!(err, CliError::Assemble(_)));
    assert!(err.to_string().contains("nowhere"));
}
