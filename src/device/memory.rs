use byteorder::{ByteOrder, NativeEndian};
use memmap::MmapMut;
use std::cell::RefCell;
use std::mem::size_of;
use std::ptr;
use std::rc::Rc;

use super::registers::BLOCK_SIZE;

const WORD: usize = size_of::<u32>();

/// Word-addressed view of the GPIO register window.
///
/// Offsets are in 32-bit words from the start of the window. All bit-level register work in this crate
/// is expressed through these two primitives.
pub trait RegisterBlock {
    fn read_word(&self, offset: usize) -> u32;
    fn write_word(&mut self, offset: usize, value: u32);

    /// Gives the register window back. Taking `self` makes a second release impossible.
    fn release(self)
    where
        Self: Sized,
    {
    }
}

/// Registers backed by a shared mapping of physical device memory.
///
/// Accesses are volatile, so every read and write reaches the hardware in program order.
/// Dropping the value unmaps the window.
#[derive(Debug)]
pub struct MappedRegisters {
    map: MmapMut,
}

impl MappedRegisters {
    pub fn new(map: MmapMut) -> Self {
        Self { map }
    }

    fn word_ptr(&self, offset: usize) -> *const u32 {
        self.map[offset * WORD..(offset + 1) * WORD].as_ptr() as *const u32
    }
}

impl RegisterBlock for MappedRegisters {
    fn read_word(&self, offset: usize) -> u32 {
        // SAFETY: the slice index above bounds-checks the word and mmap returns page-aligned memory.
        unsafe { ptr::read_volatile(self.word_ptr(offset)) }
    }

    fn write_word(&mut self, offset: usize, value: u32) {
        let word = self.map[offset * WORD..(offset + 1) * WORD].as_mut_ptr() as *mut u32;
        // SAFETY: see `read_word`.
        unsafe { ptr::write_volatile(word, value) }
    }

    fn release(self) {
        log::debug!("unmapping GPIO register window");
        drop(self.map);
    }
}

/// Registers backed by an ordinary in-memory buffer the size of the GPIO window.
///
/// Clones share the same storage, so a copy kept aside observes every write made through the session
/// that owns the other one. Each write is also appended to a log, which allows checking the order of
/// strobe sequences. Useful for tests and dry runs on machines without the hardware.
#[derive(Clone, Debug)]
pub struct BufferRegisters {
    memory: Rc<RefCell<Vec<u8>>>,
    writes: Rc<RefCell<Vec<(usize, u32)>>>,
}

impl Default for BufferRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferRegisters {
    pub fn new() -> Self {
        Self {
            memory: Rc::new(RefCell::new(vec![0; BLOCK_SIZE])),
            writes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Writes performed so far, as `(word offset, value)` pairs.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    /// Stores a word without logging it, e.g. to simulate an input level.
    pub fn poke(&self, offset: usize, value: u32) {
        NativeEndian::write_u32(&mut self.memory.borrow_mut()[offset * WORD..], value);
    }
}

impl RegisterBlock for BufferRegisters {
    fn read_word(&self, offset: usize) -> u32 {
        NativeEndian::read_u32(&self.memory.borrow()[offset * WORD..])
    }

    fn write_word(&mut self, offset: usize, value: u32) {
        self.poke(offset, value);
        self.writes.borrow_mut().push((offset, value));
    }
}
