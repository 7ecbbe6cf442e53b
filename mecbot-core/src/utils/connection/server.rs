//! Dashboard Bridge Server
//!
//! This module exposes the key-value table store over the network using the
//! `picoserve` framework. Dashboard clients connect over WebSocket and send
//! [`TableCommand`] JSON messages to put or get entries, which is how
//! `wheelSpeed` gets tuned live while the robot runs.

extern crate alloc;

use alloc::string::String;

use embassy_net::Stack;
use embassy_time::Duration;
use picoserve::{
    response::{
        ws::{Message, ReadMessageError, SocketRx, SocketTx, WebSocketCallback, WebSocketUpgrade},
        StatusCode,
    },
    Router,
};

use crate::utils::tables::{NetworkTable, TableCommand};

/// Landing page served at `/`.
const INDEX: &str = "<!DOCTYPE html>\
<html><head><title>mecbot dashboard bridge</title></head>\
<body><h1>mecbot dashboard bridge</h1>\
<p>Connect a WebSocket to <code>/ws</code> and send table commands, e.g.\
<code>{\"tc\":\"put\",\"t\":\"SmartDashboard\",\"k\":\"wheelSpeed\",\"v\":0.5}</code>\
or <code>{\"tc\":\"get\",\"t\":\"SmartDashboard\",\"k\":\"gameData\"}</code>.</p>\
</body></html>";

pub struct WebSocket;

impl WebSocket {
    /// Apply one parsed command against the table store, returning the reply
    /// payload to send back.
    fn handle(command: TableCommand) -> String {
        match command {
            TableCommand::Put { t, k, v } => {
                tracing::debug!(table = %t, key = %k, "table put");
                NetworkTable::named(&t).put(&k, v);
                String::from("ok")
            }
            TableCommand::Get { t, k } => {
                let value = NetworkTable::named(&t).get(&k);
                serde_json::to_string(&value).unwrap_or_else(|_| String::from("null"))
            }
        }
    }
}

/// Handles incoming WebSocket connections.
impl WebSocketCallback for WebSocket {
    async fn run<Reader, Writer>(
        self,
        mut rx: SocketRx<Reader>,
        mut tx: SocketTx<Writer>,
    ) -> Result<(), Writer::Error>
    where
        Reader: picoserve::io::embedded_io_async::Read,
        Writer: picoserve::io::embedded_io_async::Write<Error = Reader::Error>,
    {
        let mut buffer = [0; 1024];

        tx.send_text("Connected").await?;

        let close_reason = loop {
            match rx.next_message(&mut buffer).await {
                Ok(Message::Pong(_)) => continue,
                Ok(Message::Ping(data)) => tx.send_pong(data).await?,
                Ok(Message::Close(reason)) => {
                    tracing::info!(?reason, "websocket closed");
                    break None;
                }
                Ok(Message::Text(data)) => match serde_json::from_str::<TableCommand>(data) {
                    Ok(command) => {
                        let reply = Self::handle(command);
                        tx.send_text(&reply).await?;
                    }
                    Err(error) => {
                        tracing::error!(?error, "error deserializing TableCommand");
                        tx.send_text("invalid command format").await?
                    }
                },
                Ok(Message::Binary(data)) => match serde_json::from_slice::<TableCommand>(data) {
                    Ok(command) => {
                        let reply = Self::handle(command);
                        tx.send_binary(reply.as_bytes()).await?;
                    }
                    Err(error) => {
                        tracing::error!(?error, "error deserializing incoming message");
                        tx.send_binary(b"invalid command format").await?
                    }
                },
                Err(error) => {
                    tracing::error!(?error, "websocket error");
                    let code = match error {
                        ReadMessageError::TextIsNotUtf8 => 1007,
                        ReadMessageError::ReservedOpcode(_) => 1003,
                        ReadMessageError::ReadFrameError(_)
                        | ReadMessageError::UnexpectedMessageStart
                        | ReadMessageError::MessageStartsWithContinuation => 1002,
                        ReadMessageError::Io(err) => return Err(err),
                    };
                    break Some((code, "Websocket Error"));
                }
            };
        };

        tx.close(close_reason).await
    }
}

/// Creates the bridge server and serves it forever.
pub async fn run(
    id: usize,
    port: u16,
    stack: Stack<'static>,
    config: Option<&'static picoserve::Config<Duration>>,
) -> ! {
    let default_config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        persistent_start_read_request: None,
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(5)),
    });

    let config = config.unwrap_or(&default_config);

    let router = Router::new()
        // Landing page at "/"
        .route(
            "/",
            picoserve::routing::get(|| async {
                picoserve::response::Response::new(StatusCode::OK, INDEX)
                    .with_headers([("Content-Type", "text/html; charset=utf-8")])
            }),
        )
        // Table commands over WebSocket on "/ws"
        .route(
            "/ws",
            picoserve::routing::get(|upgrade: WebSocketUpgrade| async move {
                tracing::info!("new dashboard client");
                upgrade.on_upgrade(WebSocket).with_protocol("tables")
            }),
        );

    // Print out the IP and port before starting the server.
    if let Some(ip_cfg) = stack.config_v4() {
        tracing::info!("Starting server at {}:{}", ip_cfg.address, port);
    } else {
        tracing::warn!("Starting bridge server on port {port}, but no IPv4 address is assigned yet!");
    }

    let (mut rx_buffer, mut tx_buffer, mut http_buffer) = ([0; 1024], [0; 1024], [0; 4096]);

    picoserve::listen_and_serve_with_state(
        id,
        &router,
        config,
        stack,
        port,
        &mut rx_buffer,
        &mut tx_buffer,
        &mut http_buffer,
        &(),
    )
    .await
}
