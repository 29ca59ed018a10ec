//! Deterministic tick fingerprint used for cross-host comparison.
//!
//! Runs a scripted cartridge that halts, is woken by timer and joypad
//! interrupts, and hashes the tick counter, register snapshot and `IF`.

use gb_core::instructions::{OP_EI, OP_HALT, OP_JP_A16, OP_RETI};
use gb_core::memory::TAC_ADDR;
use gb_core::{Button, GameBoy, Interrupt, MemoryBus, RunBoundary, TAC_ENABLE};
use log as _;
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn cartridge() -> Vec<u8> {
    let mut rom = vec![0; 0x8000];
    rom[0x0100..0x0106].copy_from_slice(&[OP_EI, OP_HALT, OP_JP_A16, 0x00, 0x01, 0x00]);
    rom[usize::from(Interrupt::Timer.vector())] = OP_RETI;
    rom[usize::from(Interrupt::Joypad.vector())] = OP_RETI;
    rom
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let mut machine = GameBoy::from_rom(&cartridge(), false).expect("cartridge should map");
    let enable = Interrupt::Timer.mask() | Interrupt::Joypad.mask();
    machine.bus_mut().interrupts_mut().set_enable(enable);
    machine.bus_mut().write_byte(TAC_ADDR, TAC_ENABLE | 0x02);

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for frame in 0..4_u32 {
        if frame == 2 {
            machine.key_down(Button::Start);
        }
        let outcome = machine.run(RunBoundary::Frame);
        hash_bytes(&mut hash, &outcome.steps.to_le_bytes());
        hash_bytes(&mut hash, &outcome.ticks.to_le_bytes());
    }

    let mut snapshot = Vec::new();
    machine
        .cpu()
        .serialize(&mut snapshot)
        .expect("snapshot should encode");
    hash_bytes(&mut hash, &snapshot);
    hash_bytes(&mut hash, &machine.cpu().ticks().to_le_bytes());
    hash_bytes(&mut hash, &[machine.bus().interrupts().flag()]);

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
