//! Component C (context-wide) and component D: the `Context` that owns
//! a set of named buffers plus the global symbol table, and the
//! symbolic linker that patches them.

use core::fmt;

use cranelift_entity::{EntityRef, PrimaryMap};
use log::{debug, warn};

use crate::buffer::CodeBuffer;
use crate::result::{CodegenError, CodegenResult};
use crate::settings::Flags;
use crate::symbol::{RelocationScope, SymbolTable};

/// A dense index identifying one buffer registered in a `Context`.
/// Relocations reference other buffers through this index, never
/// through a back-pointer, since a buffer's relocations outlive any
/// particular borrow of the buffer they target.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BufferIndex(u32);

impl EntityRef for BufferIndex {
    fn new(index: usize) -> Self {
        BufferIndex(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BufferIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "buffer{}", self.0)
    }
}

/// A sequence of named code buffers plus a global symbol table. Owns
/// every buffer registered in it; dropping the context drops them all.
pub struct Context {
    buffers: PrimaryMap<BufferIndex, CodeBuffer>,
    global: SymbolTable,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self {
            buffers: PrimaryMap::new(),
            global: SymbolTable::new(),
        }
    }

    /// Register `buffer` under `name`, which becomes a global symbol
    /// resolving to the buffer's index. Returns that index.
    pub fn add_buffer(&mut self, name: impl Into<String>, buffer: CodeBuffer) -> BufferIndex {
        let index = self.buffers.push(buffer);
        self.global.declare(name, index.index() as u64);
        index
    }

    /// Declare a global symbol resolving to an arbitrary caller-chosen
    /// address (not necessarily a buffer index).
    pub fn declare_global(&mut self, name: impl Into<String>, address: u64) {
        self.global.declare(name, address);
    }

    /// Borrow a registered buffer.
    pub fn buffer(&self, index: BufferIndex) -> &CodeBuffer {
        &self.buffers[index]
    }

    /// Mutably borrow a registered buffer.
    pub fn buffer_mut(&mut self, index: BufferIndex) -> &mut CodeBuffer {
        &mut self.buffers[index]
    }

    /// Iterate over every registered buffer and its index, in
    /// registration order.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferIndex, &CodeBuffer)> {
        self.buffers.iter()
    }

    /// Walk every buffer's pending relocation list, resolving each one
    /// against its declared scope and patching the buffer's bytes in
    /// place. Relocations are drained as they're processed, so
    /// re-running `link` on an already-linked context is a no-op.
    pub fn link(&mut self, flags: &Flags) -> CodegenResult<()> {
        let indices: Vec<BufferIndex> = self.buffers.keys().collect();
        for index in indices {
            let relocations = self.buffers[index].take_relocations();
            for relocation in relocations {
                let resolved = match relocation.scope {
                    RelocationScope::Local => self.buffers[index].local_table().resolve(&relocation.name),
                    RelocationScope::Global => self.global.resolve(&relocation.name),
                };
                match resolved {
                    Some(address) => {
                        debug!(
                            "link: {} offset {} <- {:#x} (symbol {})",
                            index, relocation.offset, address, relocation.name
                        );
                        self.buffers[index].patch(relocation.offset, relocation.mask, address);
                    }
                    None if flags.strict_symbols() => {
                        return Err(CodegenError::UnresolvedSymbol {
                            name: relocation.name,
                        });
                    }
                    None => {
                        warn!(
                            "link: unresolved symbol {} in {} left untouched",
                            relocation.name, index
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CodeBuffer;

    #[test]
    fn add_buffer_registers_a_global_symbol_for_its_index() {
        let mut ctx = Context::new();
        let a = ctx.add_buffer("a", CodeBuffer::new(0));
        let b = ctx.add_buffer("b", CodeBuffer::new(0));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(ctx.global.resolve("a"), Some(0));
        assert_eq!(ctx.global.resolve("b"), Some(1));
    }

    #[test]
    fn link_with_no_relocations_is_a_no_op() {
        let mut ctx = Context::new();
        ctx.add_buffer("a", CodeBuffer::new(0));
        assert!(ctx.link(&Flags::new()).is_ok());
    }
}
