//! Step contract suite: cost accounting, halt idling, interrupt gating and
//! delivery priority.

#![allow(clippy::pedantic, clippy::nursery)]

use gb_core::instructions::{OP_HALT, OP_JP_A16, OP_NOP};
use gb_core::memory::TAC_ADDR;
use gb_core::{
    CoreConfig, Cpu, Interrupt, MemoryBus, OpcodeTable, Registers, SystemBus, TAC_ENABLE,
};
use log as _;
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const PROGRAM: u16 = 0xC000;

fn core_with(program: &[u8]) -> (Cpu, SystemBus) {
    let mut cpu = Cpu::default();
    cpu.registers_mut().set_pc(PROGRAM);
    let mut bus = SystemBus::new();
    bus.load(PROGRAM, program);
    (cpu, bus)
}

fn arm(cpu: &mut Cpu, bus: &mut SystemBus, ime: bool, flag: u8, enable: u8) {
    cpu.registers_mut().set_ime(ime);
    bus.interrupts_mut().set_flag(flag);
    bus.interrupts_mut().set_enable(enable);
}

#[test]
fn nop_with_nothing_pending_returns_four() {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, true, 0x00, 0x1F);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.registers().pc(), PROGRAM + 1);
    assert!(cpu.registers().ime());
}

#[test]
fn overlap_in_unused_high_bits_is_not_pending() {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, true, 0xE0, 0xFF);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.registers().pc(), PROGRAM + 1);
    assert_eq!(cpu.registers().sp(), 0xFFFE);
    assert!(cpu.registers().ime());
    assert_eq!(bus.interrupts().flag(), 0xE0);
    assert_eq!(bus.interrupts().enable(), 0xFF);
}

#[test]
fn nop_then_vblank_delivery_returns_the_sum_of_both_costs() {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, true, 0x01, 0x1F);

    assert_eq!(cpu.step(&mut bus), 4 + 16);
    assert_eq!(bus.interrupts().flag(), 0x00);
    assert!(!cpu.registers().ime());
    assert_eq!(cpu.registers().pc(), 0x0040);
    assert_eq!(cpu.registers().sp(), 0xFFFC);
    assert_eq!(bus.read_byte(0xFFFD), 0xC0);
    assert_eq!(bus.read_byte(0xFFFC), 0x01);
}

#[test]
fn halted_core_with_nothing_enabled_idles_forever() {
    let (mut cpu, mut bus) = core_with(&[]);
    cpu.registers_mut().set_halt(true);
    arm(&mut cpu, &mut bus, true, 0x01, 0x00);

    for _ in 0..1_000 {
        assert_eq!(cpu.step(&mut bus), 4);
    }
    assert!(cpu.registers().halt());
    assert_eq!(cpu.registers().pc(), PROGRAM);
    assert_eq!(bus.interrupts().flag(), 0x01);
    assert_eq!(cpu.ticks(), 4_000);
}

/// A halted core with `ime` clear never leaves halt through the step, even
/// with an enabled request pending. Hardware would resume without servicing
/// the request; this core keeps idling until `ime` is set.
#[test]
fn halted_core_with_ime_clear_never_wakes_even_when_pending() {
    let (mut cpu, mut bus) = core_with(&[]);
    cpu.registers_mut().set_halt(true);
    arm(&mut cpu, &mut bus, false, 0x1F, 0x1F);

    for _ in 0..1_000 {
        assert_eq!(cpu.step(&mut bus), 4);
    }
    assert!(cpu.registers().halt());
    assert_eq!(bus.interrupts().flag(), 0x1F);
    assert!(!cpu.registers().ime());
}

#[test]
fn halted_core_with_ime_set_wakes_into_the_vector() {
    let (mut cpu, mut bus) = core_with(&[OP_HALT]);
    arm(&mut cpu, &mut bus, true, 0x00, Interrupt::Timer.mask());

    assert_eq!(cpu.step(&mut bus), 4);
    assert!(cpu.registers().halt());
    assert_eq!(cpu.step(&mut bus), 4);

    bus.interrupts_mut().request(Interrupt::Timer);
    assert_eq!(cpu.step(&mut bus), 4 + 16);

    assert!(!cpu.registers().halt());
    assert!(!cpu.registers().ime());
    assert_eq!(bus.interrupts().flag(), 0x00);
    assert_eq!(cpu.registers().pc(), Interrupt::Timer.vector());
    assert_eq!(bus.read_byte(0xFFFC), 0x01);
}

#[test]
fn pending_interrupts_are_ignored_while_ime_is_clear() {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, false, 0x1F, 0x1F);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(bus.interrupts().flag(), 0x1F);
    assert_eq!(bus.interrupts().enable(), 0x1F);
    assert_eq!(cpu.registers().pc(), PROGRAM + 1);
}

#[rstest]
#[case::vblank_alone(0x01, Interrupt::VBlank)]
#[case::lcd_stat_alone(0x02, Interrupt::LcdStat)]
#[case::timer_alone(0x04, Interrupt::Timer)]
#[case::serial_alone(0x08, Interrupt::Serial)]
#[case::joypad_alone(0x10, Interrupt::Joypad)]
#[case::vblank_beats_timer(0x05, Interrupt::VBlank)]
#[case::lcd_stat_beats_timer(0x06, Interrupt::LcdStat)]
#[case::timer_beats_serial(0x0C, Interrupt::Timer)]
#[case::serial_beats_joypad(0x18, Interrupt::Serial)]
#[case::everything(0x1F, Interrupt::VBlank)]
fn highest_priority_source_is_delivered(#[case] pending: u8, #[case] expected: Interrupt) {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, true, pending, 0x1F);

    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(cpu.registers().pc(), expected.vector());
    assert_eq!(bus.interrupts().flag(), pending & !expected.mask());
}

#[test]
fn disabled_sources_do_not_compete_for_priority() {
    let (mut cpu, mut bus) = core_with(&[OP_NOP]);
    arm(&mut cpu, &mut bus, true, 0x05, Interrupt::Timer.mask());

    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(cpu.registers().pc(), Interrupt::Timer.vector());
    assert_eq!(bus.interrupts().flag(), 0x01);
}

#[test]
fn attached_timer_is_notified_in_machine_cycles() {
    let (mut cpu, bus) = core_with(&[OP_JP_A16, 0x00, 0xC0]);
    let mut bus = bus.with_timer();
    bus.write_byte(TAC_ADDR, TAC_ENABLE | 0x01);

    for _ in 0..16 {
        assert_eq!(cpu.step(&mut bus), 16);
    }

    let timer = bus.timer().expect("timer attached");
    assert_eq!(timer.div(), 1);
    assert_eq!(timer.tima(), 16);
    assert_eq!(cpu.ticks(), 256);
}

fn three_cycle_op(regs: &mut Registers, _bus: &mut dyn MemoryBus) {
    regs.set_m(3);
}

#[test]
fn handler_reported_cost_drives_the_step_cost() {
    let mut table = OpcodeTable::empty();
    table.install(0x00, three_cycle_op);
    let mut cpu = Cpu::with_instructions(table, CoreConfig::default());
    cpu.registers_mut().set_pc(PROGRAM);
    let mut bus = SystemBus::new();

    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.step(&mut bus), 12);
    assert_eq!(cpu.ticks(), 24);
}

proptest! {
    #[test]
    fn delivered_source_is_the_lowest_set_bit(pending in 1_u8..32) {
        let (mut cpu, mut bus) = core_with(&[OP_NOP]);
        arm(&mut cpu, &mut bus, true, pending, 0x1F);

        cpu.step(&mut bus);

        let expected = Interrupt::ALL[pending.trailing_zeros() as usize];
        prop_assert_eq!(cpu.registers().pc(), expected.vector());
        prop_assert_eq!(bus.interrupts().flag(), pending & !expected.mask());
        prop_assert!(!cpu.registers().ime());
    }

    #[test]
    fn nothing_pending_leaves_interrupt_state_alone(
        raw_flag in any::<u8>(),
        enable in any::<u8>(),
        ime in any::<bool>(),
    ) {
        let flag = raw_flag & !(enable & 0x1F);
        let (mut cpu, mut bus) = core_with(&[OP_NOP]);
        arm(&mut cpu, &mut bus, ime, flag, enable);

        prop_assert_eq!(cpu.step(&mut bus), 4);
        prop_assert_eq!(bus.interrupts().flag(), flag);
        prop_assert_eq!(bus.interrupts().enable(), enable);
        prop_assert_eq!(cpu.registers().ime(), ime);
    }

    #[test]
    fn ticks_are_the_exact_sum_of_step_costs(
        script in prop::collection::vec((any::<bool>(), 0_u8..32, 0_u8..32), 1..64),
    ) {
        let mut cpu = Cpu::default();
        let mut bus = SystemBus::new();
        let mut total = 0_u64;

        for (ime, flag, enable) in script {
            arm(&mut cpu, &mut bus, ime, flag, enable);
            let delivers = ime && flag & enable != 0;

            let cost = cpu.step(&mut bus);

            prop_assert_eq!(cost, if delivers { 20 } else { 4 });
            total += u64::from(cost);
            prop_assert_eq!(cpu.ticks(), total);
        }
    }
}
