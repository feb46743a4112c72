//! Command queue
//!
//! An ordered sequence of blocks representing one full command or one full
//! response. The producer only appends, the consumer only pops from the
//! front; a queue is built once and drained once by a single thread.

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use super::{encode_user_id, Block, Opcode, MAX_ITEM_SIZE};

/// FIFO of blocks mirroring one protocol message
#[derive(Debug, Default, PartialEq)]
pub struct CommandQueue {
    blocks: VecDeque<Block>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> CommandQueue {
        CommandQueue {
            blocks: VecDeque::new(),
        }
    }

    /// Append a block to the back of the queue
    pub fn push(&mut self, block: Block) {
        self.blocks.push_back(block);
    }

    /// Pop the front block, transferring ownership of its payload
    pub fn pop(&mut self) -> Option<Block> {
        self.blocks.pop_front()
    }

    /// Opcode of the front block, if any
    pub fn front_opcode(&self) -> Option<Opcode> {
        self.blocks.front().map(|block| block.opcode)
    }

    /// Number of blocks currently queued
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no blocks are queued
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over the queued blocks front to back without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Append an empty marker block (used for operation opcodes)
    pub fn push_marker(&mut self, opcode: Opcode) {
        self.push(Block::marker(opcode));
    }

    /// Append a USER marker carrying the 4-byte user id
    pub fn push_user(&mut self, user: u32) {
        self.push(Block {
            opcode: Opcode::User,
            payload: encode_user_id(user),
        });
    }

    /// Append `data` as one or more same-opcode blocks
    ///
    /// Payloads longer than [`MAX_ITEM_SIZE`] are split into consecutive
    /// blocks in order, with no separator between them. Empty data appends
    /// nothing at all, not even an empty block, so chunking and
    /// reassembly are exact inverses for every input length.
    pub fn push_chunked(&mut self, opcode: Opcode, data: impl Into<Bytes>) {
        let mut rest = data.into();
        while !rest.is_empty() {
            let take = rest.len().min(MAX_ITEM_SIZE);
            let payload = rest.split_to(take);
            self.push(Block { opcode, payload });
        }
    }

    /// Pop all consecutive front blocks tagged `opcode` and concatenate
    /// their payloads in queue order
    ///
    /// Returns an empty buffer when the front block has a different tag or
    /// the queue is empty. This is the reassembly step matching
    /// [`push_chunked`](Self::push_chunked): the result is exact-length,
    /// with no implicit termination byte.
    pub fn gather(&mut self, opcode: Opcode) -> Bytes {
        // single-block case needs no copy
        if self.front_opcode() == Some(opcode)
            && self.blocks.get(1).map(|b| b.opcode) != Some(opcode)
        {
            return match self.pop() {
                Some(block) => block.payload,
                None => Bytes::new(),
            };
        }

        let mut data = BytesMut::new();
        while self.front_opcode() == Some(opcode) {
            if let Some(block) = self.pop() {
                data.extend_from_slice(&block.payload);
            }
        }
        data.freeze()
    }
}
