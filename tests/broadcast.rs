use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use todo_hub::models::{Response, TodoStatus, TodoView};
use todo_hub::{server, AppState, Config};

struct Client {
    lines: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn send(&mut self, frame: &str) {
        self.writer.write_all(frame.as_bytes()).await.unwrap();
    }

    async fn recv(&mut self) -> String {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(2), self.lines.read_line(&mut line))
            .await
            .expect("timed out waiting for a line")
            .unwrap();
        assert!(n > 0, "connection closed");
        line
    }

    async fn expect_silence(&mut self) {
        let mut line = String::new();
        let read = timeout(Duration::from_millis(150), self.lines.read_line(&mut line)).await;
        assert!(read.is_err(), "unexpected line {:?}", line);
    }
}

async fn start() -> (SocketAddr, Arc<AppState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (state, _accept_loop) = server::spawn(listener, Config::default());
    (addr, state)
}

async fn wait_for_sessions(state: &AppState, expected: usize) {
    timeout(Duration::from_secs(2), async {
        while state.sessions.len().await != expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {} live sessions", expected));
}

/// Connect and wait until the server has registered the new session.
async fn connect(addr: SocketAddr, state: &AppState) -> Client {
    let before = state.sessions.len().await;
    let stream = TcpStream::connect(addr).await.unwrap();
    wait_for_sessions(state, before + 1).await;
    let (reader, writer) = stream.into_split();
    Client {
        lines: BufReader::new(reader),
        writer,
    }
}

fn parse_item(line: &str) -> TodoView {
    match serde_json::from_str::<Response>(line).unwrap() {
        Response::Item(view) => view,
        other => panic!("expected an item, got {:?}", other),
    }
}

#[tokio::test]
async fn add_update_get_walkthrough() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;

    a.send("{\"action\":\"add\",\"description\":\"buy milk\"}\n").await;
    let added = "{\"id\":1,\"description\":\"buy milk\",\"status\":\"Pending\"}\n";
    assert_eq!(a.recv().await, added);
    assert_eq!(b.recv().await, added);

    a.send("{\"action\":\"update\",\"id\":1}\n").await;
    let toggled = "{\"id\":1,\"description\":\"buy milk\",\"status\":\"Completed\"}\n";
    assert_eq!(a.recv().await, toggled);
    assert_eq!(b.recv().await, toggled);

    a.send("{\"action\":\"get\"}\n").await;
    assert_eq!(
        a.recv().await,
        "[{\"id\":1,\"description\":\"buy milk\",\"status\":\"Completed\"}]\n"
    );
    b.expect_silence().await;
    a.expect_silence().await;
}

#[tokio::test]
async fn originator_never_hears_its_own_broadcast() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;
    let mut c = connect(addr, &state).await;

    b.send("{\"action\":\"add\",\"description\":\"from b\"}\n").await;
    let response = b.recv().await;
    assert_eq!(a.recv().await, response);
    assert_eq!(c.recv().await, response);
    b.expect_silence().await;
    a.expect_silence().await;
    c.expect_silence().await;
}

#[tokio::test]
async fn errors_and_reads_stay_with_the_originator() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;
    let mut b = connect(addr, &state).await;

    a.send("{\"action\":\"update\",\"id\":9999}\n").await;
    assert_eq!(a.recv().await, "{\"error\":\"item not found\"}\n");
    a.send("{\"action\":\"update\",\"id\":18446744073709551615}\n").await;
    assert_eq!(a.recv().await, "{\"error\":\"item not found\"}\n");
    a.send("{\"action\":\"rename\"}\n").await;
    assert_eq!(a.recv().await, "{\"error\":\"unknown action\"}\n");
    a.send("{\"action\":\"get\"}\n").await;
    assert_eq!(a.recv().await, "[]\n");
    a.send("this is not json\n").await;

    b.expect_silence().await;
    a.expect_silence().await;
    assert!(state.store.is_empty().await);

    // The counter did not advance on any of the above.
    b.send("{\"action\":\"add\",\"description\":\"first\"}\n").await;
    assert_eq!(parse_item(&b.recv().await).id, 1);
    assert_eq!(parse_item(&a.recv().await).id, 1);
}

#[tokio::test]
async fn double_toggle_restores_status() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;

    a.send("{\"action\":\"add\",\"description\":\"\"}\n").await;
    let created = parse_item(&a.recv().await);
    assert_eq!(created.description, "");

    let update = format!("{{\"action\":\"update\",\"id\":{}}}\n", created.id);
    a.send(&update).await;
    assert_eq!(parse_item(&a.recv().await).status, TodoStatus::Completed);
    a.send(&update).await;
    let back = parse_item(&a.recv().await);
    assert_eq!(back, created);
}

#[tokio::test]
async fn dropped_client_does_not_disturb_the_others() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;
    let b = connect(addr, &state).await;
    let mut c = connect(addr, &state).await;

    drop(b);
    wait_for_sessions(&state, 2).await;

    a.send("{\"action\":\"add\",\"description\":\"after b left\"}\n").await;
    let response = a.recv().await;
    assert_eq!(c.recv().await, response);

    // The acceptor is still serving.
    let mut d = connect(addr, &state).await;
    c.send("{\"action\":\"update\",\"id\":1}\n").await;
    let toggled = c.recv().await;
    assert_eq!(a.recv().await, toggled);
    assert_eq!(d.recv().await, toggled);
}

#[tokio::test]
async fn disconnect_mid_broadcast_is_contained() {
    let (addr, state) = start().await;
    let mut a = connect(addr, &state).await;
    let mut c = connect(addr, &state).await;
    let b = connect(addr, &state).await;

    // Close B without waiting for the server to notice.
    drop(b);
    for i in 0..5 {
        a.send(&format!("{{\"action\":\"add\",\"description\":\"item {}\"}}\n", i)).await;
        let response = a.recv().await;
        assert_eq!(c.recv().await, response);
    }
    wait_for_sessions(&state, 2).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_get_unique_increasing_ids() {
    const CLIENTS: usize = 4;
    const ADDS: usize = 25;

    let (addr, state) = start().await;
    let mut clients = Vec::new();
    for _ in 0..CLIENTS {
        clients.push(connect(addr, &state).await);
    }

    let mut tasks = Vec::new();
    for (n, mut client) in clients.into_iter().enumerate() {
        tasks.push(tokio::spawn(async move {
            for k in 0..ADDS {
                client
                    .send(&format!("{{\"action\":\"add\",\"description\":\"c{}-{}\"}}\n", n, k))
                    .await;
            }
            // Own replies plus everyone else's broadcasts.
            let mut seen = Vec::new();
            for _ in 0..CLIENTS * ADDS {
                seen.push(parse_item(&client.recv().await));
            }
            (n, seen)
        }));
    }

    for task in tasks {
        let (n, seen) = task.await.unwrap();
        let ids: BTreeSet<u64> = seen.iter().map(|v| v.id).collect();
        assert_eq!(ids, (1..=(CLIENTS * ADDS) as u64).collect());

        let prefix = format!("c{}-", n);
        let own: Vec<u64> = seen
            .iter()
            .filter(|v| v.description.starts_with(&prefix))
            .map(|v| v.id)
            .collect();
        assert_eq!(own.len(), ADDS);
        assert!(own.windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(state.store.len().await, CLIENTS * ADDS);
}
