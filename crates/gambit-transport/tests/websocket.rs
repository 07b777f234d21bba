//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a tokio-tungstenite client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use gambit_transport::{
        Connection, Handshake, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on port 0 and returns the transport with its real address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    /// Accepts the next socket and finishes its upgrade.
    async fn accept_ws(transport: &mut WebSocketTransport) -> WebSocketConnection {
        let handshake = transport.accept().await.expect("should accept");
        handshake.complete().await.expect("upgrade should succeed")
    }

    async fn connect_client(addr: &str) -> ClientWs {
        let url = format!("ws://{addr}");
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends JSON, client sees a text frame ---
        server_conn
            .send(br#"{"event":"both-joined"}"#)
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "UTF-8 payloads go out as text frames");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"event":"both-joined"}"#);

        // --- Client sends, server receives ---
        client_ws
            .send(Message::Text(r#"{"event":"join-room","data":"R1"}"#.to_string().into()))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, br#"{"event":"join-room","data":"R1"}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending() {
        // A handler parks in recv() waiting for its player while the
        // opponent's move is broadcast to it. The send must not wait for
        // the pending recv.
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_ws(&mut transport).await });
        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        let reader = Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(
            Duration::from_secs(2),
            server_conn.send(b"opponent-move"),
        )
        .await
        .expect("send should not block on recv")
        .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"opponent-move");

        client_ws.send(Message::Close(None)).await.unwrap();
        let result = pending.await.unwrap().expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move { accept_ws(&mut transport).await });

        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_connection_ids_are_unique() {
        let (mut transport, addr) = bind_any().await;

        let server_handle = tokio::spawn(async move {
            let a = accept_ws(&mut transport).await;
            let b = accept_ws(&mut transport).await;
            (a, b)
        });

        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server_handle.await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_accept_returns_before_peer_speaks() {
        let (mut transport, addr) = bind_any().await;

        // A raw TCP peer that never sends an upgrade request.
        let _silent = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let stalled = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept should not wait for the handshake")
            .expect("should accept");

        let upgrade =
            tokio::time::timeout(Duration::from_millis(100), stalled.complete()).await;
        assert!(upgrade.is_err(), "a silent peer never completes its upgrade");

        // The listener is still free for the next peer.
        let server_handle = tokio::spawn(async move { accept_ws(&mut transport).await });
        let _client = connect_client(&addr).await;
        let conn = tokio::time::timeout(Duration::from_secs(2), server_handle)
            .await
            .expect("second peer should be accepted")
            .unwrap();
        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_garbage_upgrade_request_fails_handshake() {
        use tokio::io::AsyncWriteExt;

        let (mut transport, addr) = bind_any().await;
        let mut raw = tokio::net::TcpStream::connect(&addr).await.unwrap();
        raw.write_all(b"not an http request\r\n\r\n").await.unwrap();

        let handshake = transport.accept().await.expect("should accept");
        let err = handshake.complete().await.err().expect("upgrade should fail");
        assert!(matches!(err, TransportError::HandshakeFailed(_)));
    }
}
