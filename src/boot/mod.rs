//! Handing the core over to another image.
//!
//! The image is expected in the standard Cortex-M layout: word 0 holds the initial
//! stack pointer, word 1 the reset handler, followed by the rest of the vector table.
//! Nothing is validated here; making sure a real image lives at the address is up to the caller.

#[cfg(feature = "cortex_m")]
pub mod cortex_m;

use crate::{Scheduler, log};

/// Flash base address of an image to boot.
pub type BootTarget = u32;

/// The two words of a vector table the core needs to start an image.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VectorTable {
    pub stack_pointer: u32,
    pub entry: u32,
}

/// Memory holding the images, and whatever the chip needs to redirect exceptions to them.
pub trait BootMemory {
    fn read_word(&self, addr: u32) -> u32;

    /// Put the vector table of `image` where the core can be pointed at it, if it cannot use it in place.
    fn stage_vectors(&mut self, image: BootTarget);

    /// Make exceptions dispatch through the vector table of `image`.
    fn activate_vectors(&mut self, image: BootTarget);
}

/// Bootload mechanism: set the main stack pointer and branch.
pub trait Boot {
    /// Complete all outstanding memory accesses and flush the pipeline,
    /// so the relocated vector table is in effect before the image runs.
    fn barrier(&mut self);

    /// Both have to happen in one go: nothing may run on the old stack after it has been replaced.
    ///
    /// # Safety
    /// `entry` must be the reset handler of a valid image and `stack_pointer` its initial stack.
    unsafe fn handoff(&mut self, stack_pointer: u32, entry: u32) -> !;
}

/// Read the start words of an image.
pub fn read_vectors(memory: &impl BootMemory, image: BootTarget) -> VectorTable {
    let entry = memory.read_word(image.wrapping_add(4));
    let stack_pointer = memory.read_word(image);

    VectorTable {
        stack_pointer,
        entry,
    }
}

/// Jump to the image at `image`. Never returns.
///
/// In order: relocate the vector table, read the start words,
/// stop the scheduler, fence, load the stack pointer and branch to the reset handler.
///
/// The scheduler is stopped before the stack pointer is loaded, not after:
/// loading it and branching is a single [`Boot::handoff`], as no code may run
/// on the replaced stack. The stack pointer is still set before the branch,
/// and dispatch is still off before either.
///
/// # Safety
/// `image` must point at a valid image for this chip. There is no way back:
/// a bad image leaves the core executing garbage.
pub unsafe fn jump_to_app(
    image: BootTarget,
    memory: &mut impl BootMemory,
    scheduler: &mut impl Scheduler,
    core: &mut impl Boot,
) -> ! {
    memory.stage_vectors(image);
    memory.activate_vectors(image);

    // Vectors are only read once the remap is in place.
    let vectors = read_vectors(memory, image);
    log::info!(
        "Booting image at {:#x}: sp {:#x}, entry {:#x}",
        image,
        vectors.stack_pointer,
        vectors.entry
    );

    scheduler.disable();
    core.barrier();

    unsafe { core.handoff(vectors.stack_pointer, vectors.entry) }
}
