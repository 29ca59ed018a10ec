#![no_main]

use std::io::Cursor;

use gb_core::instructions::nop;
use gb_core::{CoreConfig, Cpu, MemoryBus, OpcodeTable, SystemBus, REGISTER_SNAPSHOT_BYTES};
use libfuzzer_sys::fuzz_target;

const PROGRAM: u16 = 0xC000;

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let (header, rest) = data.split_at(3);
    let [flag, enable, steps] = [header[0], header[1], header[2]];

    let mut table = OpcodeTable::control();
    table.fill_unassigned(nop);
    let mut cpu = Cpu::with_instructions(table, CoreConfig::default());
    cpu.registers_mut().set_pc(PROGRAM);

    let mut bus = SystemBus::new().with_timer();
    bus.interrupts_mut().set_flag(flag);
    bus.interrupts_mut().set_enable(enable);

    if rest.len() >= REGISTER_SNAPSHOT_BYTES {
        let _ = cpu.deserialize(&mut Cursor::new(&rest[..REGISTER_SNAPSHOT_BYTES]));
    }
    bus.load(PROGRAM, rest);

    let mut total = 0_u64;
    for _ in 0..steps {
        let ticks = cpu.step(&mut bus);
        assert!(ticks > 0 && ticks % 4 == 0);
        total += u64::from(ticks);
    }
    assert_eq!(cpu.ticks(), total);
    assert_eq!(bus.interrupts().pending() & !0x1F, 0);
});
