//! Recording register bus and delay for driving the INA219 driver without hardware.

#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use ina219::{Register, RegisterBus};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusError;

#[derive(Default)]
struct BusState {
    writes: Vec<(u8, [u8; 2])>,
    registers: [u16; 6],
    queued: [VecDeque<u16>; 6],
    fail_writes: bool,
    fail_next_write_to: Option<Register>,
}

/// Register file backed bus. Writes land in the register file and are logged; reads pop a
/// queued value if one was set up, otherwise return the register file contents.
///
/// Clones share state, so a test can keep a handle after giving one to the driver.
#[derive(Clone, Default)]
pub struct MockBus {
    state: Rc<RefCell<BusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, register: Register, value: u16) {
        self.state.borrow_mut().registers[register as usize] = value;
    }

    /// Values returned by the next reads of `register`, in order.
    pub fn queue(&self, register: Register, values: &[u16]) {
        self.state.borrow_mut().queued[register as usize].extend(values);
    }

    pub fn fail_writes(&self) {
        self.state.borrow_mut().fail_writes = true;
    }

    /// Fails the next write to `register` only. The register keeps its old value.
    pub fn fail_next_write_to(&self, register: Register) {
        self.state.borrow_mut().fail_next_write_to = Some(register);
    }

    /// Every write, as (register address, bytes on the wire).
    pub fn writes(&self) -> Vec<(u8, [u8; 2])> {
        self.state.borrow().writes.clone()
    }

    /// Words written to one register, in order.
    pub fn written(&self, register: Register) -> Vec<u16> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|(address, _)| *address == register as u8)
            .map(|(_, data)| u16::from_be_bytes(*data))
            .collect()
    }

    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }
}

impl RegisterBus for MockBus {
    type Error = BusError;

    fn write(&mut self, register: Register, data: [u8; 2]) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(BusError);
        }
        if state.fail_next_write_to == Some(register) {
            state.fail_next_write_to = None;
            return Err(BusError);
        }
        state.writes.push((register as u8, data));
        state.registers[register as usize] = u16::from_be_bytes(data);
        Ok(())
    }

    fn read_word(&mut self, register: Register) -> Result<u16, Self::Error> {
        let mut state = self.state.borrow_mut();
        let index = register as usize;
        let queued = state.queued[index].pop_front();
        Ok(queued.unwrap_or(state.registers[index]))
    }
}

/// Records every requested delay in nanoseconds.
#[derive(Clone, Default)]
pub struct MockDelay {
    delays: Rc<RefCell<Vec<u64>>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays_ns(&self) -> Vec<u64> {
        self.delays.borrow().clone()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays.borrow_mut().push(ns as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.delays.borrow_mut().push(us as u64 * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.borrow_mut().push(ms as u64 * 1_000_000);
    }
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{actual} is not within {tolerance} of {expected}"
    );
}
