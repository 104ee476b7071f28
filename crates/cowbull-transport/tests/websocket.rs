//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real WebSocket listener on an OS-assigned port
//! and talk to it both with a raw `tokio-tungstenite` client and with
//! [`ClientConnection`].

#[cfg(feature = "websocket")]
mod websocket {
    use cowbull_transport::{
        ClientConnection, Connection, Transport, WebSocketTransport,
    };
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    /// Binds a transport on a random port and returns it with its address.
    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("should have addr").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive_text() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");
        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().as_u64() > 0);

        // --- Server sends, client receives ---
        server_conn
            .send(r#"{"name":"players","data":"[]"}"#)
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(
            msg.into_text().unwrap().as_str(),
            r#"{"name":"players","data":"[]"}"#
        );

        // --- Client sends, server receives ---
        client_ws
            .send(Message::Text(r#"{"name":"connect","data":""}"#.to_string().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, r#"{"name":"connect","data":""}"#);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_recv_skips_non_utf8_binary_frame() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        let server_conn = server_handle.await.unwrap();

        client_ws
            .send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
            .await
            .unwrap();
        client_ws
            .send(Message::Binary(b"after".to_vec().into()))
            .await
            .unwrap();

        let received = server_conn.recv().await.expect("recv should not error");
        assert_eq!(received.as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn test_client_connection_talks_to_transport() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let client = ClientConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("should connect");
        let server_conn = server_handle.await.unwrap();
        assert_ne!(client.id(), server_conn.id());

        client.send("hello").await.unwrap();
        assert_eq!(server_conn.recv().await.unwrap().as_deref(), Some("hello"));

        server_conn.send("world").await.unwrap();
        assert_eq!(client.recv().await.unwrap().as_deref(), Some("world"));
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending_does_not_block() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let client = std::sync::Arc::new(
            ClientConnection::connect(&format!("ws://{addr}")).await.unwrap(),
        );
        let server_conn = server_handle.await.unwrap();

        // Park a reader on the client, then send from the same client.
        let reader = std::sync::Arc::clone(&client);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::task::yield_now().await;

        tokio::time::timeout(
            std::time::Duration::from_secs(2),
            client.send("ping"),
        )
        .await
        .expect("send must not wait for the reader")
        .unwrap();
        assert_eq!(server_conn.recv().await.unwrap().as_deref(), Some("ping"));

        server_conn.send("pong").await.unwrap();
        let got = pending.await.unwrap().unwrap();
        assert_eq!(got.as_deref(), Some("pong"));
    }
}
