//! MQTT transport adapter.
//!
//! Implements [`PubSubPort`] with the blocking `rumqttc` client.  The
//! network loop runs on its own thread, reconnects on error until
//! [`MqttConnector::disconnect`] is called, and hands inbound publishes
//! to the registered listener's `on_incoming_message`.
//!
//! ```text
//!   publish()/subscribe() ──▶ Client ──try_*──▶ request queue
//!                                                  │
//!   mqtt-loop thread: Connection::iter() ◀─────────┘
//!        └─ Incoming::Publish ──▶ listener.on_incoming_message(resource, payload)
//! ```
//!
//! All client calls use the non-blocking `try_*` variants: a full request
//! queue is reported as `false`, never waited on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;
use rumqttc::{Client, Connection, Event, Incoming, MqttOptions, QoS};

use crate::app::ports::{DataMessageListener, PubSubPort, ResourceName};
use crate::config::DeviceConfig;
use crate::error::{Error, Result};

/// Capacity of the client's request queue.
const REQUEST_QUEUE: usize = 16;
/// Pause between reconnect attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Map a raw QoS level, coercing anything outside 0..=2 to `default`.
pub fn qos_from(level: i32, default: u8) -> QoS {
    let level = if (0..=2).contains(&level) {
        level
    } else {
        debug!("qos {} out of range, using {}", level, default);
        i32::from(default)
    };
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

/// Settings the connector needs, lifted out of [`DeviceConfig`].
#[derive(Debug, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub keep_alive: Duration,
    pub client_id: String,
    pub topic_prefix: String,
    pub default_qos: u8,
}

impl MqttSettings {
    pub fn from_config(cfg: &DeviceConfig) -> Self {
        Self {
            host: cfg.mqtt.host.clone(),
            port: cfg.mqtt.port,
            // rumqttc rejects keep-alives under five seconds.
            keep_alive: Duration::from_secs(cfg.mqtt.keep_alive_secs.max(5)),
            client_id: cfg.client_id().to_owned(),
            topic_prefix: cfg.mqtt.topic_prefix.clone(),
            default_qos: cfg.mqtt.qos(),
        }
    }
}

type ListenerSlot = Arc<Mutex<Option<Weak<dyn DataMessageListener>>>>;

struct Session {
    client: Client,
    shutdown: Arc<AtomicBool>,
    _loop: JoinHandle<()>,
}

pub struct MqttConnector {
    settings: MqttSettings,
    listener: ListenerSlot,
    session: Mutex<Option<Session>>,
}

impl MqttConnector {
    pub fn new(settings: MqttSettings) -> Self {
        Self {
            settings,
            listener: Arc::new(Mutex::new(None)),
            session: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &MqttSettings {
        &self.settings
    }

    /// Inbound messages go here.  Held weakly.
    pub fn set_data_message_listener(&self, listener: Weak<dyn DataMessageListener>) {
        *self.listener.lock() = Some(listener);
    }

    pub fn is_connected(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn topic(&self, resource: ResourceName) -> String {
        resource.topic(&self.settings.topic_prefix)
    }

    fn qos(&self, level: i32) -> QoS {
        qos_from(level, self.settings.default_qos)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Create the client and start the network loop.
    /// Returns `Ok(false)` if a session is already open.
    pub fn connect(&self) -> Result<bool> {
        let mut slot = self.session.lock();
        if slot.is_some() {
            warn!("mqtt: already connected");
            return Ok(false);
        }

        let s = &self.settings;
        let mut opts = MqttOptions::new(s.client_id.as_str(), s.host.as_str(), s.port);
        opts.set_keep_alive(s.keep_alive);
        opts.set_clean_session(true);
        let (client, connection) = Client::new(opts, REQUEST_QUEUE);

        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = spawn_loop(
            connection,
            Arc::clone(&shutdown),
            Arc::clone(&self.listener),
            s.topic_prefix.clone(),
        )?;

        info!("mqtt: connecting to {}:{} as {}", s.host, s.port, s.client_id);
        *slot = Some(Session {
            client,
            shutdown,
            _loop: handle,
        });
        Ok(true)
    }

    /// Ask the broker to close the session.  Returns `false` if not
    /// connected.
    ///
    /// The network loop exits on its own once the connection closes; it is
    /// not joined because a dead broker would block the caller.
    pub fn disconnect(&self) -> bool {
        let Some(mut session) = self.session.lock().take() else {
            warn!("mqtt: already disconnected");
            return false;
        };
        session.shutdown.store(true, Ordering::SeqCst);
        if let Err(e) = session.client.try_disconnect() {
            debug!("mqtt: disconnect request not queued: {}", e);
        }
        info!("mqtt: disconnected");
        true
    }
}

impl Drop for MqttConnector {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.get_mut().take() {
            session.shutdown.store(true, Ordering::SeqCst);
            let _ = session.client.try_disconnect();
        }
    }
}

fn spawn_loop(
    mut connection: Connection,
    shutdown: Arc<AtomicBool>,
    listener: ListenerSlot,
    prefix: String,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("mqtt-loop".into())
        .spawn(move || {
            for notification in connection.iter() {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                match notification {
                    Ok(Event::Incoming(Incoming::ConnAck(_))) => info!("mqtt: connected"),
                    Ok(Event::Incoming(Incoming::Publish(p))) => {
                        route_inbound(&listener, &prefix, &p.topic, &p.payload);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("mqtt: connection error: {}", e);
                        thread::sleep(RECONNECT_DELAY);
                    }
                }
            }
            debug!("mqtt: network loop exited");
        })
        .map_err(|e| Error::Transport(format!("cannot spawn mqtt loop: {e}")))
}

fn route_inbound(listener: &ListenerSlot, prefix: &str, topic: &str, payload: &[u8]) {
    let Some(resource) = ResourceName::from_topic(prefix, topic) else {
        debug!("mqtt: ignoring message on {}", topic);
        return;
    };
    let Some(l) = listener.lock().as_ref().and_then(Weak::upgrade) else {
        debug!("mqtt: no listener for {}", topic);
        return;
    };
    if !l.on_incoming_message(resource, payload) {
        warn!("mqtt: listener rejected message on {}", topic);
    }
}

// ───────────────────────────────────────────────────────────────
// PubSubPort
// ───────────────────────────────────────────────────────────────

impl PubSubPort for MqttConnector {
    fn publish(&self, resource: ResourceName, payload: &str, qos: i32) -> bool {
        if payload.is_empty() {
            warn!("mqtt: refusing empty payload for {}", resource);
            return false;
        }
        let topic = self.topic(resource);
        let qos = self.qos(qos);
        let mut guard = self.session.lock();
        let Some(session) = guard.as_mut() else {
            warn!("mqtt: not connected, dropping publish to {}", topic);
            return false;
        };
        match session.client.try_publish(topic.as_str(), qos, false, payload.as_bytes().to_vec()) {
            Ok(()) => {
                debug!("mqtt: published to {}", topic);
                true
            }
            Err(e) => {
                warn!("mqtt: publish to {} failed: {}", topic, e);
                false
            }
        }
    }

    fn subscribe(&self, resource: ResourceName, qos: i32) -> bool {
        let topic = self.topic(resource);
        let qos = self.qos(qos);
        let mut guard = self.session.lock();
        let Some(session) = guard.as_mut() else {
            warn!("mqtt: not connected, cannot subscribe to {}", topic);
            return false;
        };
        match session.client.try_subscribe(topic.as_str(), qos) {
            Ok(()) => {
                info!("mqtt: subscribed to {}", topic);
                true
            }
            Err(e) => {
                warn!("mqtt: subscribe to {} failed: {}", topic, e);
                false
            }
        }
    }

    fn unsubscribe(&self, resource: ResourceName) -> bool {
        let topic = self.topic(resource);
        let mut guard = self.session.lock();
        let Some(session) = guard.as_mut() else {
            warn!("mqtt: not connected, cannot unsubscribe from {}", topic);
            return false;
        };
        match session.client.try_unsubscribe(topic.as_str()) {
            Ok(()) => {
                info!("mqtt: unsubscribed from {}", topic);
                true
            }
            Err(e) => {
                warn!("mqtt: unsubscribe from {} failed: {}", topic, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_QOS;
    use crate::data::{ActuatorRecord, PerformanceRecord, SensorRecord};

    fn connector() -> MqttConnector {
        MqttConnector::new(MqttSettings::from_config(&DeviceConfig::default()))
    }

    #[test]
    fn qos_outside_range_uses_default() {
        assert_eq!(qos_from(0, 1), QoS::AtMostOnce);
        assert_eq!(qos_from(1, 0), QoS::AtLeastOnce);
        assert_eq!(qos_from(2, 0), QoS::ExactlyOnce);
        assert_eq!(qos_from(3, 0), QoS::AtMostOnce);
        assert_eq!(qos_from(-1, 2), QoS::ExactlyOnce);
    }

    #[test]
    fn settings_follow_config() {
        let mut cfg = DeviceConfig::default();
        cfg.mqtt.keep_alive_secs = 1;
        cfg.mqtt.default_qos = 9;
        let s = MqttSettings::from_config(&cfg);
        assert_eq!(s.keep_alive, Duration::from_secs(5));
        assert_eq!(s.default_qos, DEFAULT_QOS);
        assert_eq!(s.client_id, "constraineddevice001");
    }

    #[test]
    fn calls_without_session_report_false() {
        let c = connector();
        assert!(!c.is_connected());
        assert!(!c.publish(ResourceName::SensorMsg, "{}", 1));
        assert!(!c.publish(ResourceName::SensorMsg, "", 1));
        assert!(!c.subscribe(ResourceName::ActuatorCmd, 7));
        assert!(!c.unsubscribe(ResourceName::ActuatorCmd));
        assert!(!c.disconnect());
    }

    #[test]
    fn topics_use_prefix() {
        let c = connector();
        assert_eq!(c.topic(ResourceName::ActuatorCmd), "PIOT/ConstrainedDevice/ActuatorCmd");
    }

    struct Inbox {
        got: Mutex<Vec<(ResourceName, Vec<u8>)>>,
    }

    impl DataMessageListener for Inbox {
        fn on_sensor_event(&self, _: Option<SensorRecord>) -> bool {
            false
        }
        fn on_performance_event(&self, _: Option<PerformanceRecord>) -> bool {
            false
        }
        fn on_actuator_response(&self, _: Option<ActuatorRecord>) -> bool {
            false
        }
        fn on_actuator_command_request(&self, _: Option<ActuatorRecord>) -> Option<ActuatorRecord> {
            None
        }
        fn on_incoming_message(&self, resource: ResourceName, payload: &[u8]) -> bool {
            self.got.lock().push((resource, payload.to_vec()));
            true
        }
    }

    #[test]
    fn inbound_routing_matches_prefix() {
        let inbox = Arc::new(Inbox { got: Mutex::new(Vec::new()) });
        let as_dyn: Arc<dyn DataMessageListener> = inbox.clone();
        let slot: ListenerSlot = Arc::new(Mutex::new(Some(Arc::downgrade(&as_dyn))));
        route_inbound(&slot, "PIOT/ConstrainedDevice", "PIOT/ConstrainedDevice/ActuatorCmd", b"{}");
        route_inbound(&slot, "PIOT/ConstrainedDevice", "elsewhere/ActuatorCmd", b"{}");
        {
            let got = inbox.got.lock();
            assert_eq!(got.len(), 1);
            assert_eq!(got[0], (ResourceName::ActuatorCmd, b"{}".to_vec()));
        }

        drop(as_dyn);
        drop(inbox);
        // Listener gone: routing is a quiet no-op.
        route_inbound(&slot, "PIOT/ConstrainedDevice", "PIOT/ConstrainedDevice/ActuatorCmd", b"{}");
    }
}
