use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use upbwire_frame::Message;

use crate::command::command_name;
use crate::error::{MessageError, Result};

/// Error type handlers return to abort dispatch.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

type HandlerFn = dyn Fn(&Message) -> std::result::Result<(), HandlerError> + Send + Sync;

/// Shared handle to a message callback.
///
/// Clones of one handle count as the same handler for registration purposes.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Message) -> std::result::Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }

    fn is_same(&self, other: &Handler) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn call(&self, message: &Message) -> std::result::Result<(), HandlerError> {
        (self.0)(message)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Transmit bookkeeping extracted while dispatching a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transmission {
    pub network_id: u8,
    pub src_id: u8,
    /// Declared transmit count (1-4), i.e. the wire field plus one.
    pub tx_count: u8,
}

/// Decodes UPB frames and fans them out to handlers keyed by command code.
///
/// Registration takes `&mut self` and dispatch `&self`; callers sharing a
/// decoder across threads wrap it in their own lock.
#[derive(Debug, Default)]
pub struct MessageDecoder {
    handlers: HashMap<u8, Vec<Handler>>,
}

impl MessageDecoder {
    /// Create a decoder with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a command code.
    ///
    /// Returns false if this handler is already registered for the code.
    pub fn add_handler(&mut self, command: impl Into<u8>, handler: Handler) -> bool {
        let handlers = self.handlers.entry(command.into()).or_default();
        if handlers.iter().any(|existing| existing.is_same(&handler)) {
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Number of handlers registered for a command code.
    pub fn handler_count(&self, command: impl Into<u8>) -> usize {
        self.handlers
            .get(&command.into())
            .map_or(0, |handlers| handlers.len())
    }

    /// Decode a frame whose checksum has already been stripped.
    pub fn decode(&self, raw: &[u8]) -> Result<Message> {
        Ok(upbwire_frame::decode(raw)?)
    }

    /// Invoke every handler registered for the message's command, in
    /// registration order.
    ///
    /// The first failing handler stops dispatch and its error is returned.
    pub fn dispatch(&self, message: &Message) -> Result<Transmission> {
        match self.handlers.get(&message.msg_id) {
            Some(handlers) => {
                trace!(
                    command = command_name(message.msg_id),
                    handlers = handlers.len(),
                    "dispatching upb message"
                );
                for handler in handlers {
                    handler.call(message).map_err(|source| MessageError::Handler {
                        command: message.msg_id,
                        source,
                    })?;
                }
            }
            None => {
                debug!(
                    msg_id = message.msg_id,
                    command = command_name(message.msg_id),
                    "no handlers registered"
                );
            }
        }

        Ok(Transmission {
            network_id: message.network_id,
            src_id: message.src_id,
            tx_count: message.declared_transmits(),
        })
    }

    /// Decode a stripped frame and dispatch it.
    pub fn handle(&self, raw: &[u8]) -> Result<Transmission> {
        let message = self.decode(raw)?;
        self.dispatch(&message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::command::UpbCommand;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Handler {
        let log = Arc::clone(log);
        Handler::new(move |_message| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    // ctl 0x0804: length 8, tx count field 1; net 2, dest 0, src 17, DEVICE_STATE_REPORT, level 100
    const STATE_REPORT: [u8; 7] = [0x08, 0x04, 0x02, 0x00, 0x11, 0x86, 0x64];

    #[test]
    fn handle_returns_transmission_summary() {
        let decoder = MessageDecoder::new();
        let summary = decoder.handle(&STATE_REPORT).unwrap();
        assert_eq!(
            summary,
            Transmission {
                network_id: 2,
                src_id: 0x11,
                tx_count: 2,
            }
        );
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut decoder = MessageDecoder::new();
        decoder.add_handler(UpbCommand::DeviceStateReport, recorder(&log, "first"));
        decoder.add_handler(UpbCommand::DeviceStateReport, recorder(&log, "second"));
        decoder.add_handler(UpbCommand::Goto, recorder(&log, "goto"));

        decoder.handle(&STATE_REPORT).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = recorder(&log, "once");
        let mut decoder = MessageDecoder::new();

        assert!(decoder.add_handler(0x86u8, handler.clone()));
        assert!(!decoder.add_handler(0x86u8, handler.clone()));
        assert_eq!(decoder.handler_count(UpbCommand::DeviceStateReport), 1);

        // Same handler under a different code is a separate registration.
        assert!(decoder.add_handler(UpbCommand::Goto, handler));

        decoder.handle(&STATE_REPORT).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["once"]);
    }

    #[test]
    fn handler_receives_decoded_message() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut decoder = MessageDecoder::new();
        decoder.add_handler(
            UpbCommand::DeviceStateReport,
            Handler::new(move |message| {
                *sink.lock().unwrap() = Some(message.clone());
                Ok(())
            }),
        );

        decoder.handle(&STATE_REPORT).unwrap();
        let message = seen.lock().unwrap().take().unwrap();
        assert_eq!(message.src_id, 0x11);
        assert_eq!(message.data.as_ref(), &[0x64]);
    }

    #[test]
    fn failing_handler_stops_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut decoder = MessageDecoder::new();
        decoder.add_handler(0x86u8, recorder(&log, "before"));
        decoder.add_handler(0x86u8, Handler::new(|_message| Err("device unknown".into())));
        decoder.add_handler(0x86u8, recorder(&log, "after"));

        let err = decoder.handle(&STATE_REPORT).unwrap_err();
        match err {
            MessageError::Handler { command, source } => {
                assert_eq!(command, 0x86);
                assert_eq!(source.to_string(), "device unknown");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["before"]);
    }

    #[test]
    fn unknown_command_is_not_an_error() {
        let decoder = MessageDecoder::new();
        let raw = [0x07, 0x00, 0x01, 0x02, 0x03, 0xEE];
        let message = decoder.decode(&raw).unwrap();
        assert_eq!(message.msg_id, 0xEE);
        assert!(decoder.dispatch(&message).is_ok());
    }

    #[test]
    fn short_frame_is_malformed() {
        let decoder = MessageDecoder::new();
        let err = decoder.handle(&STATE_REPORT[..5]).unwrap_err();
        assert!(matches!(
            err,
            MessageError::Frame(upbwire_frame::FrameError::MalformedFrame { len: 5, .. })
        ));
    }
}
