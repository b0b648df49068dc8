//! Cross-crate flows: event bus → fan-out → WebSocket clients.

#[cfg(test)]
mod harness;
#[cfg(test)]
mod http;
#[cfg(test)]
mod protocol;
#[cfg(test)]
mod subscriptions;
