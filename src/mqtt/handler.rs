use std::time::Duration;

use chrono::Local;
use rumqttc::{
    AsyncClient, ConnAck, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::MqttConfig;
use super::link::{LinkEvent, LinkRequest};
use crate::protocol::encode::{encode, Command};
use crate::topics::{full_topic, subscribe_filters, topic_base};

const EVENT_LOOP_CAPACITY: usize = 100;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
enum ConnectError {
    #[error("broker rejected connection: {0:?}")]
    BrokerRejected(ConnectReturnCode),
    #[error(transparent)]
    Network(#[from] rumqttc::ConnectionError),
}

/// Owns the broker connection lifecycle for the dashboard.
///
/// One instance runs for the whole process. It idles until the UI asks
/// for a connection, runs that session's event loop until disconnect,
/// then idles again. Connect failures are terminal for the attempt and
/// surfaced as [`LinkEvent::Error`]; the operator reconnects manually.
pub struct MqttHandle {
    config: MqttConfig,
}

impl MqttHandle {
    pub fn new(config: MqttConfig) -> Self {
        MqttHandle { config }
    }

    pub async fn run(
        self,
        mut requests: mpsc::Receiver<LinkRequest>,
        events: mpsc::Sender<LinkEvent>,
    ) {
        while let Some(request) = requests.recv().await {
            match request {
                LinkRequest::Connect { username } => {
                    info!(username, "opening broker session");
                    self.run_session(&username, &mut requests, &events).await;
                    if events.send(LinkEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
                other => debug!(request = ?other, "ignored while disconnected"),
            }
        }
    }

    async fn run_session(
        &self,
        username: &str,
        requests: &mut mpsc::Receiver<LinkRequest>,
        events: &mpsc::Sender<LinkEvent>,
    ) {
        let base = topic_base(&self.config.org, username);
        let client_id = format!(
            "dashboard_{}_{}",
            username,
            Local::now().timestamp_millis()
        );

        let mut options = MqttOptions::new(client_id, self.config.host.clone(), self.config.port);
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs));
        options.set_clean_session(true);
        if !self.config.user.is_empty() {
            options.set_credentials(self.config.user.clone(), self.config.password.clone());
        }

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_LOOP_CAPACITY);

        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        match tokio::time::timeout(timeout, establish(&mut event_loop)).await {
            Ok(Ok(())) => debug!(base, "broker session established"),
            Ok(Err(e)) => {
                error!(error = %e, "connection failed");
                let _ = events.send(LinkEvent::Error(e.to_string())).await;
                return;
            }
            Err(_) => {
                error!("connection attempt timed out");
                let _ = events
                    .send(LinkEvent::Error(format!(
                        "connection to {}:{} timed out",
                        self.config.host, self.config.port
                    )))
                    .await;
                return;
            }
        }

        if let Err(e) = subscribe_all(&client, &base).await {
            error!(error = %e, "subscribe failed");
            let _ = events.send(LinkEvent::Error(e.to_string())).await;
            return;
        }
        if events.send(LinkEvent::Connected).await.is_err() {
            return;
        }

        // Ask the device to republish its info set so the fresh session
        // fills up without waiting for the next natural update.
        publish_command(&client, &base, &Command::RequestInfo).await;

        loop {
            tokio::select! {
                polled = event_loop.poll() => match polled {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                        debug!(topic = %publish.topic, "inbound publish");
                        let message = LinkEvent::Message {
                            topic: publish.topic,
                            payload,
                        };
                        if events.send(message).await.is_err() {
                            return;
                        }
                    }
                    Ok(Event::Incoming(Packet::ConnAck(ConnAck { code, .. })))
                        if code == ConnectReturnCode::Success =>
                    {
                        // Transport came back after a drop. Clean session
                        // means the broker forgot our filters.
                        info!("broker reconnected, resubscribing");
                        if let Err(e) = subscribe_all(&client, &base).await {
                            warn!(error = %e, "resubscribe failed");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "transport error, retrying");
                        let _ = events.send(LinkEvent::Error(e.to_string())).await;
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                },
                request = requests.recv() => match request {
                    Some(LinkRequest::Publish(command)) => {
                        publish_command(&client, &base, &command).await;
                    }
                    Some(LinkRequest::Disconnect) | None => {
                        info!("closing broker session");
                        let _ = client.disconnect().await;
                        return;
                    }
                    Some(LinkRequest::Connect { .. }) => {
                        debug!("already connected, ignoring connect request");
                    }
                },
            }
        }
    }
}

/// Polls until the broker acknowledges the connection.
async fn establish(event_loop: &mut EventLoop) -> Result<(), ConnectError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ConnAck { code, .. }))) => {
                if code == ConnectReturnCode::Success {
                    return Ok(());
                }
                return Err(ConnectError::BrokerRejected(code));
            }
            Ok(notification) => {
                debug!(notification = ?notification, "pre-connack notification");
            }
            Err(e) => return Err(ConnectError::Network(e)),
        }
    }
}

async fn subscribe_all(client: &AsyncClient, base: &str) -> Result<(), rumqttc::ClientError> {
    for filter in subscribe_filters(base) {
        debug!(filter, "subscribing");
        client.subscribe(filter, QoS::AtMostOnce).await?;
    }
    Ok(())
}

/// Encodes and publishes one command. Fire-and-forget: failures are
/// logged, the core never retries.
async fn publish_command(client: &AsyncClient, base: &str, command: &Command) {
    match encode(command) {
        Ok(message) => {
            let topic = full_topic(base, message.suffix);
            debug!(topic, payload = %message.payload, retained = message.retained, "publishing");
            if let Err(e) = client
                .publish(topic.clone(), QoS::AtMostOnce, message.retained, message.payload)
                .await
            {
                warn!(topic, error = %e, "publish failed");
            }
        }
        Err(e) => warn!(error = %e, "command rejected before publish"),
    }
}
