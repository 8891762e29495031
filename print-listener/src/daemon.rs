//! Broker connection and message loop
//!
//! One `rumqttc` event loop drives everything: connection, subscription and
//! print messages, which are handled inline in arrival order. The lifecycle
//! state machine tracks where the connection stands; the broker client
//! itself reconnects on the next poll after a failure.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use rumqttc::{
    AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeReasonCode,
    TlsConfiguration, Transport,
};
use ticket_printer::Printer;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ListenerError;
use crate::handler::PrintHandler;
use crate::lifecycle::{ConnectionState, Lifecycle, LifecycleEvent};

const REQUEST_CHANNEL_CAPACITY: usize = 10;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// AWS IoT accepts MQTT on 443 only with this ALPN protocol
const AWS_IOT_ALPN: &[u8] = b"x-amzn-mqtt-ca";

fn tls_error(path: &Path, reason: impl Into<String>) -> ListenerError {
    ListenerError::Tls {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ListenerError> {
    std::fs::read(path).map_err(|e| tls_error(path, e.to_string()))
}

fn check_certificates(path: &Path, pem: &[u8]) -> Result<(), ListenerError> {
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| tls_error(path, e.to_string()))?;
    if certs.is_empty() {
        return Err(tls_error(path, "no certificate found"));
    }
    Ok(())
}

fn check_private_key(path: &Path, pem: &[u8]) -> Result<(), ListenerError> {
    match rustls_pemfile::private_key(&mut &pem[..]) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(tls_error(path, "no private key found")),
        Err(e) => Err(tls_error(path, e.to_string())),
    }
}

/// Load and validate the root CA, client certificate and client key
pub fn tls_configuration(config: &Config) -> Result<TlsConfiguration, ListenerError> {
    let ca = read_pem(&config.root_ca_path)?;
    check_certificates(&config.root_ca_path, &ca)?;

    let cert = read_pem(&config.cert_path)?;
    check_certificates(&config.cert_path, &cert)?;

    let key = read_pem(&config.key_path)?;
    check_private_key(&config.key_path, &key)?;

    let alpn = (config.mqtt_port == 443).then(|| vec![AWS_IOT_ALPN.to_vec()]);

    Ok(TlsConfiguration::Simple {
        ca,
        alpn,
        client_auth: Some((cert, key)),
    })
}

pub fn mqtt_options(config: &Config, tls: TlsConfiguration) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.mqtt_endpoint, config.mqtt_port);
    options.set_keep_alive(config.keep_alive);
    options.set_clean_session(true);
    options.set_transport(Transport::Tls(tls));
    options
}

/// Run until `shutdown` resolves or a fatal connection error occurs
pub async fn run<P: Printer>(
    config: &Config,
    handler: &PrintHandler<P>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ListenerError> {
    let options = mqtt_options(config, tls_configuration(config)?);
    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

    let mut lifecycle = Lifecycle::new();
    lifecycle.apply(LifecycleEvent::Start)?;
    info!(
        endpoint = %config.mqtt_endpoint,
        port = config.mqtt_port,
        client_id = %config.client_id,
        "Connecting to broker"
    );

    message_loop(config, handler, &client, &mut eventloop, &mut lifecycle, shutdown).await?;
    disconnect(&client, &mut eventloop, &mut lifecycle).await
}

async fn message_loop<P: Printer>(
    config: &Config,
    handler: &PrintHandler<P>,
    client: &AsyncClient,
    eventloop: &mut EventLoop,
    lifecycle: &mut Lifecycle,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ListenerError> {
    let timeout_secs = config.connect_timeout.as_secs();
    // Only the first connection and each subscription are bounded
    let mut deadline = Some(Instant::now() + config.connect_timeout);
    tokio::pin!(shutdown);

    loop {
        let pending = deadline;
        tokio::select! {
            () = &mut shutdown => return Ok(()),

            () = sleep_until(pending.unwrap_or_else(Instant::now)), if pending.is_some() => {
                return Err(match lifecycle.state() {
                    ConnectionState::Subscribing => ListenerError::SubscribeTimeout(timeout_secs),
                    _ => ListenerError::ConnectTimeout(timeout_secs),
                });
            }

            polled = eventloop.poll() => match polled {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    lifecycle.apply(LifecycleEvent::ConnectionSuccess)?;
                    info!(session_present = ack.session_present, "Connected to broker");

                    lifecycle.apply(LifecycleEvent::SubscribeRequested)?;
                    client.subscribe(&config.topic, QoS::AtLeastOnce).await?;
                    deadline = Some(Instant::now() + config.connect_timeout);
                }
                Ok(Event::Incoming(Packet::SubAck(ack))) => {
                    if ack
                        .return_codes
                        .iter()
                        .any(|code| matches!(code, SubscribeReasonCode::Failure))
                    {
                        return Err(ListenerError::SubscriptionRejected(config.topic.clone()));
                    }
                    lifecycle.apply(LifecycleEvent::SubscribeAcknowledged)?;
                    deadline = None;
                    info!(topic = %config.topic, "Subscribed, waiting for print jobs");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let outcome = handler.handle_message(&publish.topic, &publish.payload).await;
                    debug!(?outcome, "Print message handled");
                }
                Ok(_) => {}
                Err(e) => {
                    lifecycle.apply(LifecycleEvent::ConnectionFailure)?;
                    warn!(error = %e, "Broker connection failed, retrying");
                    if reconnect_backoff(RECONNECT_DELAY, shutdown.as_mut()).await {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Wait out the reconnect delay; true when shutdown arrived first
async fn reconnect_backoff<F: Future<Output = ()>>(
    delay: Duration,
    shutdown: Pin<&mut F>,
) -> bool {
    tokio::select! {
        () = shutdown => true,
        () = sleep(delay) => false,
    }
}

async fn disconnect(
    client: &AsyncClient,
    eventloop: &mut EventLoop,
    lifecycle: &mut Lifecycle,
) -> Result<(), ListenerError> {
    lifecycle.apply(LifecycleEvent::StopRequested)?;

    match client.disconnect().await {
        Ok(()) => {
            let confirmed = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
                loop {
                    match eventloop.poll().await {
                        Ok(Event::Outgoing(Outgoing::Disconnect)) => return true,
                        Ok(_) => {}
                        Err(_) => return false,
                    }
                }
            })
            .await;

            match confirmed {
                Ok(true) => info!("Disconnected from broker"),
                Ok(false) => warn!("Connection closed before the disconnect was sent"),
                Err(_) => warn!("Timed out waiting for disconnect"),
            }
        }
        Err(e) => warn!(error = %e, "Failed to request disconnect"),
    }

    lifecycle.apply(LifecycleEvent::Stopped)?;
    Ok(())
}
