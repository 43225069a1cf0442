use std::{cell::RefCell, collections::BTreeMap, rc::Rc, vec::Vec};

use crate::{Scheduler, boot::Boot, chip::Bus, chip::Layout, reset::SystemReset};

/// Everything observable that happened on the board, in order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Access {
    Read(u32),
    Write(u32, u32),
    Sleep(u32),
    SchedulerDisabled,
    ResetRequested,
    Barrier,
    StackPointer(u32),
    Jump(u32),
}

/// Bits cleared as a side effect of writing a trigger bit, like `RCC_CSR.RMVF`.
struct ClearRule {
    addr: u32,
    trigger: u32,
    clears: u32,
}

#[derive(Default)]
struct BoardState {
    memory: BTreeMap<u32, u32>,
    log: Vec<Access>,
    rules: Vec<ClearRule>,
}

/// Fake chip: a sparse memory map with an access log shared by all fakes.
#[derive(Clone)]
pub struct Board(Rc<RefCell<BoardState>>);

impl Board {
    pub fn new(layout: &Layout) -> Self {
        let board = Board(Rc::new(RefCell::new(BoardState::default())));
        board.0.borrow_mut().rules.push(ClearRule {
            addr: layout.reset_status,
            trigger: layout.reset_remove_flags,
            clears: layout.reset_remove_flags
                | layout.reset_watchdog_flag
                | layout.reset_software_flag,
        });
        board
    }

    pub fn bus(&self) -> FakeBus {
        FakeBus(self.clone())
    }

    pub fn scheduler(&self) -> FakeScheduler {
        FakeScheduler(self.clone())
    }

    pub fn system_reset(&self) -> FakeReset {
        FakeReset(self.clone())
    }

    pub fn core(&self) -> FakeCore {
        FakeCore(self.clone())
    }

    /// Set memory without logging, as the hardware would.
    pub fn poke(&self, addr: u32, value: u32) {
        self.0.borrow_mut().memory.insert(addr, value);
    }

    pub fn peek(&self, addr: u32) -> u32 {
        self.0.borrow().memory.get(&addr).copied().unwrap_or(0)
    }

    pub fn log(&self) -> Vec<Access> {
        self.0.borrow().log.clone()
    }

    pub fn writes(&self) -> Vec<(u32, u32)> {
        self.0
            .borrow()
            .log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(addr, value) => Some((addr, value)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.0.borrow_mut().log.clear();
    }

    /// Position of the first logged access matching `f`.
    pub fn position(&self, f: impl Fn(&Access) -> bool) -> Option<usize> {
        self.0.borrow().log.iter().position(f)
    }

    /// Position of the last logged access matching `f`.
    pub fn rposition(&self, f: impl Fn(&Access) -> bool) -> Option<usize> {
        self.0.borrow().log.iter().rposition(f)
    }

    fn record(&self, access: Access) {
        self.0.borrow_mut().log.push(access);
    }
}

#[derive(Clone)]
pub struct FakeBus(Board);

impl Bus for FakeBus {
    fn read(&self, addr: u32) -> u32 {
        self.0.record(Access::Read(addr));
        self.0.peek(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.0.record(Access::Write(addr, value));

        let mut state = self.0.0.borrow_mut();
        let mut stored = value;
        for rule in state.rules.iter().filter(|rule| rule.addr == addr) {
            if value & rule.trigger != 0 {
                stored &= !rule.clears;
            }
        }
        state.memory.insert(addr, stored);
    }
}

pub struct FakeScheduler(Board);

impl Scheduler for FakeScheduler {
    fn sleep_ms(&mut self, ms: u32) {
        self.0.record(Access::Sleep(ms));
    }

    fn disable(&mut self) {
        self.0.record(Access::SchedulerDisabled);
    }
}

pub struct FakeReset(Board);

impl SystemReset for FakeReset {
    fn request(&mut self) {
        self.0.record(Access::ResetRequested);
        panic!("system reset");
    }
}

pub struct FakeCore(Board);

impl Boot for FakeCore {
    fn barrier(&mut self) {
        self.0.record(Access::Barrier);
    }

    unsafe fn handoff(&mut self, stack_pointer: u32, entry: u32) -> ! {
        self.0.record(Access::StackPointer(stack_pointer));
        self.0.record(Access::Jump(entry));
        panic!("jumped to {entry:#010x}");
    }
}
