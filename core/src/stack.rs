use crate::Chip8Error;

/// Canonical CHIP-8 call depth.
pub const DEFAULT_STACK_SIZE: usize = 16;

/// Bounded stack of subroutine return addresses.
#[derive(Clone, Debug)]
pub struct CallStack {
    entries: Vec<u16>,
    capacity: usize,
}

impl CallStack {
    pub fn new(capacity: usize) -> CallStack {
        CallStack {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), Chip8Error> {
        if self.entries.len() >= self.capacity {
            return Err(Chip8Error::StackOverflow {
                depth: self.entries.len(),
            });
        }
        self.entries.push(addr);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Chip8Error> {
        self.entries.pop().ok_or(Chip8Error::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return addresses, oldest first.
    pub fn as_slice(&self) -> &[u16] {
        &self.entries
    }
}

impl Default for CallStack {
    fn default() -> Self {
        CallStack::new(DEFAULT_STACK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = CallStack::default();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        assert_eq!(stack.as_slice(), &[0x202, 0x304]);
        assert_eq!(stack.pop(), Ok(0x304));
        assert_eq!(stack.pop(), Ok(0x202));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty() {
        let mut stack = CallStack::default();
        assert_eq!(stack.pop(), Err(Chip8Error::StackUnderflow));
    }

    #[test]
    fn test_push_full() {
        let mut stack = CallStack::new(2);
        stack.push(0x200).unwrap();
        stack.push(0x200).unwrap();
        assert_eq!(
            stack.push(0x200),
            Err(Chip8Error::StackOverflow { depth: 2 })
        );
        assert_eq!(stack.len(), 2);
    }
}
