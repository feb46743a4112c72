//! Integration tests for framekv
//!
//! Full client/server round trips over real TCP sockets.

use std::io::{Read, Write};
use std::net::TcpStream;

use framekv::config::ClientConfig;
use framekv::store::MemoryBackend;
use framekv::{ClientCommand, Config, FramekvError, KvClient, KvServer};

// =============================================================================
// Helper Functions
// =============================================================================

/// Start a server on an ephemeral port, returning it and a client config
/// pointing at it
fn start_server() -> (KvServer, ClientConfig) {
    let config = Config::builder()
        .bind_address("127.0.0.1")
        .bind_port(0)
        .build();

    let server = KvServer::start(&config, MemoryBackend::new()).unwrap();
    let client = ClientConfig {
        address: "127.0.0.1".to_string(),
        port: server.local_addr().port(),
    };
    (server, client)
}

fn run(client: &KvClient, command: ClientCommand) -> Result<Vec<u8>, FramekvError> {
    let mut out = Vec::new();
    client.execute(command, &mut out)?;
    Ok(out)
}

fn set(key: &str, value: &str) -> ClientCommand {
    ClientCommand::Set {
        key: key.to_string(),
        value: Some(value.to_string()),
    }
}

fn get(key: &str) -> ClientCommand {
    ClientCommand::Get { key: key.to_string() }
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_set_get_exists_delete_roundtrip() {
    let (mut server, target) = start_server();
    let client = KvClient::new(&target, 1000);

    assert_eq!(run(&client, set("foo", "bar")).unwrap(), b"OK\n");
    assert_eq!(run(&client, get("foo")).unwrap(), b"bar\n");

    let exists = ClientCommand::Exists { key: "foo".to_string() };
    assert_eq!(run(&client, exists.clone()).unwrap(), b"True\n");

    let deleted = ClientCommand::Delete { key: "foo".to_string() };
    assert_eq!(run(&client, deleted).unwrap(), b"OK\n");

    assert_eq!(run(&client, exists).unwrap(), b"False\n");

    server.stop();
}

#[test]
fn test_get_missing_key_reports_remote_error() {
    let (mut server, target) = start_server();
    let client = KvClient::new(&target, 1000);

    let err = run(&client, get("absent")).unwrap_err();
    match err {
        FramekvError::Remote(message) => assert!(message.contains("not found")),
        other => panic!("expected a remote error, got {other}"),
    }

    server.stop();
}

#[test]
fn test_user_scoping_over_the_wire() {
    let (mut server, target) = start_server();
    let alice = KvClient::new(&target, 1000);
    let bob = KvClient::new(&target, 2000);

    run(&alice, set("shared-name", "alice-data")).unwrap();
    assert_eq!(run(&alice, get("shared-name")).unwrap(), b"alice-data\n");

    let err = run(&bob, get("shared-name")).unwrap_err();
    assert!(matches!(err, FramekvError::Remote(_)));

    server.stop();
}

#[test]
fn test_sequential_connections() {
    let (mut server, target) = start_server();
    let client = KvClient::new(&target, 1);

    // one connection per round trip, served strictly in order
    for i in 0..5 {
        let key = format!("key-{i}");
        run(&client, set(&key, &format!("value-{i}"))).unwrap();
        assert_eq!(
            run(&client, get(&key)).unwrap(),
            format!("value-{i}\n").into_bytes()
        );
    }

    server.stop();
}

#[test]
fn test_large_value_chunks_over_the_wire() {
    let (mut server, target) = start_server();
    let client = KvClient::new(&target, 42);

    let value: String = "abcdefgh".repeat(10_000);
    run(&client, set("big", &value)).unwrap();

    let got = run(&client, get("big")).unwrap();
    assert_eq!(got.len(), value.len() + 1);
    assert_eq!(&got[..value.len()], value.as_bytes());

    server.stop();
}

// =============================================================================
// Failure Handling Tests
// =============================================================================

#[test]
fn test_malformed_sot_aborts_connection_only() {
    let (mut server, target) = start_server();

    // a raw peer that never sends a valid SOT gets its connection closed
    {
        let mut stream = TcpStream::connect(("127.0.0.1", target.port)).unwrap();
        stream.write_all(&[0x00, 0x01, 0x02]).unwrap();

        let mut buf = Vec::new();
        let n = stream.read_to_end(&mut buf).unwrap();
        assert_eq!(n, 0, "server must close without responding");
    }

    // the server keeps serving afterwards
    let client = KvClient::new(&target, 1);
    run(&client, set("still", "alive")).unwrap();

    server.stop();
}

#[test]
fn test_connect_after_stop_fails() {
    let (mut server, target) = start_server();
    server.stop();

    let client = KvClient::new(&target, 1);
    let err = run(&client, get("foo")).unwrap_err();
    assert!(matches!(err, FramekvError::Connection(_)));
}

#[test]
fn test_stop_is_idempotent() {
    let (mut server, _target) = start_server();
    server.stop();
    server.stop();
}
