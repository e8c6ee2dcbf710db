//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter    | Implements          | Connects to               |
//! |------------|---------------------|---------------------------|
//! | `bus`      | DataMessageListener | any PubSubPort (JSON)     |
//! | `log_sink` | DataMessageListener | `log` facade              |
//! | `mqtt`     | PubSubPort          | MQTT broker via rumqttc   |

pub mod bus;
pub mod log_sink;
pub mod mqtt;
