//! Protocol Tests
//!
//! Tests for block chunking, queue reassembly, and the frame codec.

use std::io::Cursor;

use bytes::Bytes;
use framekv::error::FramekvError;
use framekv::protocol::{
    decode_user_id, encode_message, encode_user_id, read_message, write_message, Block,
    CommandQueue, Opcode, EOT, MAX_ITEM_SIZE, SOT,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn request_queue(user: u32, key: &[u8], value: Option<&[u8]>) -> CommandQueue {
    let mut queue = CommandQueue::new();
    queue.push_marker(if value.is_some() { Opcode::Set } else { Opcode::Get });
    queue.push_user(user);
    queue.push_chunked(Opcode::Key, Bytes::copy_from_slice(key));
    if let Some(value) = value {
        queue.push_chunked(Opcode::Value, Bytes::copy_from_slice(value));
    }
    queue
}

// =============================================================================
// Chunking / Reassembly Tests
// =============================================================================

#[test]
fn test_chunk_roundtrip_small() {
    let mut queue = CommandQueue::new();
    queue.push_chunked(Opcode::Value, Bytes::from_static(b"hello"));

    assert_eq!(queue.len(), 1);
    assert_eq!(queue.gather(Opcode::Value), b"hello"[..]);
    assert!(queue.is_empty());
}

#[test]
fn test_chunk_empty_produces_zero_blocks() {
    let mut queue = CommandQueue::new();
    queue.push_chunked(Opcode::Value, Bytes::new());

    assert!(queue.is_empty());
    assert_eq!(queue.gather(Opcode::Value), b""[..]);
}

#[test]
fn test_chunk_exact_multiple_has_no_trailing_empty_block() {
    let data = patterned(MAX_ITEM_SIZE * 2);
    let mut queue = CommandQueue::new();
    queue.push_chunked(Opcode::Value, Bytes::from(data.clone()));

    assert_eq!(queue.len(), 2);
    for block in queue.iter() {
        assert_eq!(block.len(), MAX_ITEM_SIZE);
    }
    assert_eq!(queue.gather(Opcode::Value), data);
}

#[test]
fn test_chunk_roundtrip_arbitrary_sizes() {
    for len in [1, MAX_ITEM_SIZE - 1, MAX_ITEM_SIZE, MAX_ITEM_SIZE + 1, MAX_ITEM_SIZE * 3 + 17] {
        let data = patterned(len);
        let mut queue = CommandQueue::new();
        queue.push_chunked(Opcode::Value, Bytes::from(data.clone()));

        let expected_blocks = len.div_ceil(MAX_ITEM_SIZE);
        assert_eq!(queue.len(), expected_blocks, "len {len}");
        assert_eq!(queue.gather(Opcode::Value), data, "len {len}");
        assert!(queue.is_empty());
    }
}

#[test]
fn test_gather_stops_at_other_opcode() {
    let mut queue = CommandQueue::new();
    queue.push_chunked(Opcode::Key, Bytes::from_static(b"abc"));
    queue.push_chunked(Opcode::Key, Bytes::from_static(b"def"));
    queue.push_chunked(Opcode::Value, Bytes::from_static(b"xyz"));

    assert_eq!(queue.gather(Opcode::Key), b"abcdef"[..]);
    assert_eq!(queue.front_opcode(), Some(Opcode::Value));
    assert_eq!(queue.gather(Opcode::Value), b"xyz"[..]);
}

#[test]
fn test_gather_on_mismatched_front_returns_empty() {
    let mut queue = CommandQueue::new();
    queue.push_chunked(Opcode::Value, Bytes::from_static(b"xyz"));

    assert_eq!(queue.gather(Opcode::Key), b""[..]);
    assert_eq!(queue.len(), 1);
}

// =============================================================================
// User Id Codec Tests
// =============================================================================

#[test]
fn test_user_id_roundtrip() {
    let payload = encode_user_id(1000);
    assert_eq!(payload.len(), 4);
    assert_eq!(decode_user_id(&payload).unwrap(), 1000);
}

#[test]
fn test_user_id_rejects_wrong_length() {
    assert!(matches!(
        decode_user_id(b"abc"),
        Err(FramekvError::Protocol(_))
    ));
    assert!(matches!(
        decode_user_id(b"abcde"),
        Err(FramekvError::Protocol(_))
    ));
    assert!(matches!(decode_user_id(b""), Err(FramekvError::Protocol(_))));
}

// =============================================================================
// Message Codec Tests
// =============================================================================

#[test]
fn test_message_roundtrip() {
    let queue = request_queue(1000, b"foo", Some(b"bar"));
    let encoded = encode_message(&queue);

    let decoded = read_message(&mut Cursor::new(encoded)).unwrap();
    assert_eq!(decoded, queue);
}

#[test]
fn test_message_roundtrip_empty() {
    let queue = CommandQueue::new();
    let encoded = encode_message(&queue);
    assert_eq!(encoded, vec![SOT, EOT]);

    let decoded = read_message(&mut Cursor::new(encoded)).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn test_write_message_matches_encode_message() {
    let queue = request_queue(42, b"some-key", Some(&patterned(MAX_ITEM_SIZE + 5)));

    let mut written = Vec::new();
    write_message(&mut written, &queue).unwrap();
    assert_eq!(written, encode_message(&queue));
}

#[test]
fn test_exact_wire_layout() {
    let queue = request_queue(1000, b"foo", Some(b"bar"));
    let encoded = encode_message(&queue);

    #[rustfmt::skip]
    let expected = vec![
        SOT,
        Opcode::Set.as_byte(), 0x00, 0x00,
        Opcode::User.as_byte(), 0x04, 0x00, 0xE8, 0x03, 0x00, 0x00,
        Opcode::Key.as_byte(), 0x03, 0x00, b'f', b'o', b'o',
        Opcode::Value.as_byte(), 0x03, 0x00, b'b', b'a', b'r',
        EOT,
    ];
    assert_eq!(encoded, expected);
}

#[test]
fn test_missing_sot_is_protocol_error() {
    let queue = request_queue(1, b"k", None);
    let mut encoded = encode_message(&queue);
    encoded[0] = 0x00;

    let err = read_message(&mut Cursor::new(encoded)).unwrap_err();
    assert!(matches!(err, FramekvError::Protocol(_)));
}

#[test]
fn test_unknown_opcode_is_protocol_error() {
    let encoded = vec![SOT, 0x7F, 0x00, 0x00, EOT];
    let err = read_message(&mut Cursor::new(encoded)).unwrap_err();
    assert!(matches!(err, FramekvError::Protocol(_)));
}

#[test]
fn test_truncated_payload_is_protocol_error() {
    // KEY frame claims 10 bytes but the stream ends after 3
    let mut encoded = vec![SOT, Opcode::Key.as_byte(), 0x0A, 0x00];
    encoded.extend_from_slice(b"abc");

    let err = read_message(&mut Cursor::new(encoded)).unwrap_err();
    assert!(matches!(err, FramekvError::Protocol(_)));
}

#[test]
fn test_stream_closed_before_eot_is_protocol_error() {
    let queue = request_queue(1, b"k", None);
    let mut encoded = encode_message(&queue);
    encoded.pop();

    let err = read_message(&mut Cursor::new(encoded)).unwrap_err();
    assert!(matches!(err, FramekvError::Protocol(_)));
}

#[test]
fn test_reserved_opcode_decodes() {
    let mut queue = CommandQueue::new();
    queue.push_marker(Opcode::List);
    queue.push_user(7);

    let decoded = read_message(&mut Cursor::new(encode_message(&queue))).unwrap();
    assert_eq!(decoded.front_opcode(), Some(Opcode::List));
}

#[test]
fn test_sentinels_disjoint_from_opcodes() {
    assert!(Opcode::from_byte(SOT).is_none());
    assert!(Opcode::from_byte(EOT).is_none());
}

#[test]
fn test_block_rejects_oversized_payload() {
    let err = Block::new(Opcode::Value, patterned(u16::MAX as usize + 1)).unwrap_err();
    assert!(matches!(err, FramekvError::Protocol(_)));
}
