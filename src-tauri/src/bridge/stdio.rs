//! Framed JSON transport for the bridge over stdin/stdout.
//!
//! Each frame is a 4-byte little-endian length followed by that many bytes of
//! JSON. Inbound frames are either [`MethodCall`]s or overlay control clicks
//! (`{"action": "close" | "goBack"}`), each with an optional `id`. Every JSON
//! frame is answered with a response echoing the `id`. Dismissal
//! notifications are written as unsolicited method frames.

use super::{BridgeController, MethodCall, MethodResult};
use crate::config::OverlayPolicy;
use crate::constants::MAX_FRAME_SIZE;
use crate::error::{FrameError, OverlayError};
use crate::notifier::{ChannelNotifier, DismissListener, OutboundChannel};
use crate::platform::OverlayAction;
use crate::presenter::Collaborators;
use crate::safe_lock;
use crate::service::OverlayService;
use crate::ui_thread::MainQueue;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

/// What an inbound frame asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Call(MethodCall),
    /// Close / go back pressed on the overlay
    Action(OverlayAction),
    /// JSON with neither a string `method` nor a known `action`
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Echoed verbatim in the response; any JSON value but `null`
    pub id: Option<Value>,
    pub body: Inbound,
}

impl Request {
    /// Never fails: fields of the wrong type make the frame `Unrecognized`.
    pub fn from_value(value: &Value) -> Self {
        let id = value.get("id").filter(|id| !id.is_null()).cloned();

        let body = if let Some(action) = value.get("action") {
            serde_json::from_value(action.clone()).map_or(Inbound::Unrecognized, Inbound::Action)
        } else if let Some(method) = value.get("method").and_then(Value::as_str) {
            let arguments = value.get("arguments").cloned().unwrap_or(Value::Null);
            Inbound::Call(MethodCall::new(method, arguments))
        } else {
            Inbound::Unrecognized
        };

        Self { id, body }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingFrame {
    Response { id: Option<Value>, result: MethodResult },
    Notification { method: String, arguments: Value },
}

pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T, FrameError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = usize::try_from(u32::from_le_bytes(len_bytes)).unwrap_or(usize::MAX);

    if len > MAX_FRAME_SIZE {
        return Err(FrameError::TooLarge {
            len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;

    Ok(serde_json::from_slice(&buffer)?)
}

pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), FrameError> {
    let json = serde_json::to_vec(value)?;
    let too_large = || FrameError::TooLarge {
        len: json.len(),
        max: MAX_FRAME_SIZE,
    };
    if json.len() > MAX_FRAME_SIZE {
        return Err(too_large());
    }
    let len = u32::try_from(json.len()).map_err(|_| too_large())?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}

/// Output half of the stdio channel, shared by responses and notifications
pub struct FrameChannel<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> FrameChannel<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn send(&self, frame: &OutgoingFrame) -> Result<(), FrameError> {
        write_frame(&mut *safe_lock(&self.writer, "FrameChannel"), frame)
    }
}

impl<W: Write + Send> OutboundChannel for FrameChannel<W> {
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<(), OverlayError> {
        self.send(&OutgoingFrame::Notification {
            method: method.to_string(),
            arguments,
        })
        .map_err(|e| OverlayError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Headless host: reads method calls, answers them, and flushes queued UI
/// work (dismissal notifications) after every frame.
pub struct StdioHost<R, W> {
    reader: R,
    channel: Arc<FrameChannel<W>>,
    queue: MainQueue,
    bridge: BridgeController,
}

impl<R, W> StdioHost<R, W>
where
    R: Read,
    W: Write + Send + 'static,
{
    /// `platform` supplies window service, terminator and launcher; the
    /// dismissal listener is always this host's channel.
    pub fn new<F>(reader: R, writer: W, policy: OverlayPolicy, platform: F) -> Self
    where
        F: Fn() -> Collaborators + Send + 'static,
    {
        let queue = MainQueue::new();
        let channel = Arc::new(FrameChannel::new(writer));
        let listener: Arc<dyn DismissListener> = Arc::new(ChannelNotifier::new(
            Arc::new(queue.clone()),
            Arc::clone(&channel) as Arc<dyn OutboundChannel>,
        ));

        let service = OverlayService::new(policy, move || Collaborators {
            listener: Some(Arc::clone(&listener)),
            ..platform()
        });

        Self {
            reader,
            channel,
            queue,
            bridge: BridgeController::new(Arc::new(Mutex::new(service))),
        }
    }

    pub fn bridge(&self) -> &BridgeController {
        &self.bridge
    }

    /// Run posted UI tasks. Returns how many ran.
    pub fn run_ui_tasks(&self) -> usize {
        self.queue.run_pending()
    }

    /// Handle one frame. Returns `false` once the peer has closed the stream.
    pub fn step(&mut self) -> Result<bool, FrameError> {
        let value: Value = match read_frame(&mut self.reader) {
            Ok(value) => value,
            Err(e) if e.is_eof() => return Ok(false),
            // The length prefix was honoured, so the stream is still aligned
            Err(FrameError::Malformed(e)) => {
                warn!("StdioHost: skipping frame that is not JSON: {e}");
                return Ok(true);
            }
            Err(e) => return Err(e),
        };

        let request = Request::from_value(&value);
        let result = self.dispatch(&request);
        self.channel.send(&OutgoingFrame::Response {
            id: request.id,
            result,
        })?;

        self.run_ui_tasks();
        Ok(true)
    }

    fn dispatch(&self, request: &Request) -> MethodResult {
        match &request.body {
            Inbound::Call(call) => {
                debug!("StdioHost: {} (id {:?})", call.method, request.id);
                self.bridge.handle(call)
            }
            Inbound::Action(action) => {
                debug!("StdioHost: overlay {action:?} (id {:?})", request.id);
                safe_lock(self.bridge.service(), "OverlayService").handle_action(*action);
                MethodResult::success(true)
            }
            Inbound::Unrecognized => {
                warn!("StdioHost: frame {:?} has no method or known action", request.id);
                MethodResult::NotImplemented
            }
        }
    }

    /// Serve until EOF, then stop the overlay service.
    pub fn run(&mut self) -> Result<(), FrameError> {
        let outcome = loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        info!("StdioHost: connection closed");
        self.bridge.stop_block_overlay();
        self.run_ui_tasks();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::METHOD_ON_OVERLAY_DISMISSED;
    use crate::test_utils::{collaborators, TestParts};
    use serde_json::json;
    use std::io::Cursor;

    /// Writer whose bytes stay inspectable after the host takes ownership
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn frames(&self) -> Vec<OutgoingFrame> {
            let bytes = self.0.lock().unwrap().clone();
            let mut cursor = Cursor::new(bytes);
            let mut frames = Vec::new();
            while let Ok(frame) = read_frame(&mut cursor) {
                frames.push(frame);
            }
            frames
        }
    }

    fn encode(values: &[Value]) -> Vec<u8> {
        let mut out = Vec::new();
        for value in values {
            write_frame(&mut out, value).unwrap();
        }
        out
    }

    fn host(input: Vec<u8>, policy: OverlayPolicy) -> (StdioHost<Cursor<Vec<u8>>, SharedBuf>, SharedBuf, Arc<TestParts>) {
        let out = SharedBuf::default();
        let parts = Arc::new(TestParts::new());
        let factory_parts = Arc::clone(&parts);
        let host = StdioHost::new(Cursor::new(input), out.clone(), policy, move || {
            collaborators(&factory_parts)
        });
        (host, out, parts)
    }

    #[test]
    fn test_read_frame_rejects_oversized_length() {
        let mut input = Cursor::new(u32::MAX.to_le_bytes().to_vec());
        let err = read_frame::<_, Value>(&mut input).unwrap_err();
        assert!(matches!(err, FrameError::TooLarge { .. }));
    }

    #[test]
    fn test_read_frame_truncated_body_is_eof() {
        let mut bytes = 10u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let err = read_frame::<_, Value>(&mut Cursor::new(bytes)).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_run_answers_each_request_in_order() {
        let input = encode(&[
            json!({"id": 1, "method": "showBlockOverlay", "arguments": {"packageName": "com.example.game"}}),
            json!({"id": 2, "method": "launchRockets"}),
            json!({"id": 3, "method": "stopBlockOverlay"}),
        ]);
        let (mut host, out, parts) = host(input, OverlayPolicy::enforcing());

        host.run().unwrap();

        assert_eq!(
            out.frames(),
            vec![
                OutgoingFrame::Response { id: Some(json!(1)), result: MethodResult::success(true) },
                OutgoingFrame::Response { id: Some(json!(2)), result: MethodResult::NotImplemented },
                OutgoingFrame::Response { id: Some(json!(3)), result: MethodResult::success(true) },
            ]
        );
        assert!(parts.windows.lock().unwrap().live.is_empty());
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let mut input = 3u32.to_le_bytes().to_vec();
        input.extend_from_slice(b"{{{");
        input.extend(encode(&[json!({"id": 9, "method": "stopBlockOverlay"})]));
        let (mut host, out, _parts) = host(input, OverlayPolicy::enforcing());

        host.run().unwrap();

        assert_eq!(
            out.frames(),
            vec![OutgoingFrame::Response { id: Some(json!(9)), result: MethodResult::success(true) }]
        );
    }

    #[test]
    fn test_dismissal_is_written_after_ui_tasks_run() {
        let input = encode(&[json!({"id": 1, "method": "showBlockOverlay", "arguments": {"packageName": "com.example.game"}})]);
        let (mut host, out, parts) = host(input, OverlayPolicy::enforcing());

        assert!(host.step().unwrap());
        host.bridge().service().lock().unwrap().handle_action(OverlayAction::Close);
        assert_eq!(out.frames().len(), 1);

        assert_eq!(host.run_ui_tasks(), 1);
        assert_eq!(
            out.frames().last(),
            Some(&OutgoingFrame::Notification {
                method: METHOD_ON_OVERLAY_DISMISSED.to_string(),
                arguments: Value::Null,
            })
        );
        assert_eq!(parts.journal.count("kill:com.example.game"), 1);
    }

    #[test]
    fn test_eof_stops_service() {
        let input = encode(&[json!({"method": "showBlockOverlay"})]);
        let (mut host, _out, parts) = host(input, OverlayPolicy::enforcing());

        host.run().unwrap();

        assert!(!host.bridge().service().lock().unwrap().is_running());
        assert_eq!(parts.windows.lock().unwrap().removed, 1);
        assert_eq!(parts.journal.count("dismissed"), 0);
    }

    #[test]
    fn test_json_frames_without_a_valid_method_still_get_an_answer() {
        let input = encode(&[
            json!({"id": 1, "method": 5}),
            json!({"id": "abc", "method": "stopBlockOverlay"}),
            json!({"id": 3}),
            json!([1, 2, 3]),
        ]);
        let (mut host, out, parts) = host(input, OverlayPolicy::enforcing());

        host.run().unwrap();

        assert_eq!(
            out.frames(),
            vec![
                OutgoingFrame::Response { id: Some(json!(1)), result: MethodResult::NotImplemented },
                OutgoingFrame::Response { id: Some(json!("abc")), result: MethodResult::success(true) },
                OutgoingFrame::Response { id: Some(json!(3)), result: MethodResult::NotImplemented },
                OutgoingFrame::Response { id: None, result: MethodResult::NotImplemented },
            ]
        );
        assert!(parts.journal.entries().is_empty());
    }

    #[test]
    fn test_close_action_frame_dismisses_and_notifies() {
        let input = encode(&[
            json!({"id": 1, "method": "showBlockOverlay", "arguments": {"packageName": "com.example.game"}}),
            json!({"id": 2, "action": "close"}),
        ]);
        let (mut host, out, parts) = host(input, OverlayPolicy::enforcing());

        assert!(host.step().unwrap());
        assert!(host.step().unwrap());

        assert_eq!(
            out.frames(),
            vec![
                OutgoingFrame::Response { id: Some(json!(1)), result: MethodResult::success(true) },
                OutgoingFrame::Response { id: Some(json!(2)), result: MethodResult::success(true) },
                OutgoingFrame::Notification {
                    method: METHOD_ON_OVERLAY_DISMISSED.to_string(),
                    arguments: Value::Null,
                },
            ]
        );
        assert_eq!(
            parts.journal.entries(),
            vec!["add:com.example.game", "kill:com.example.game", "remove", "home"]
        );
        let service = host.bridge().service().lock().unwrap();
        assert!(service.is_running());
        assert!(!service.is_showing());
    }

    #[test]
    fn test_unknown_action_is_not_implemented() {
        let input = encode(&[
            json!({"method": "showBlockOverlay"}),
            json!({"id": 4, "action": "explode"}),
        ]);
        let (mut host, out, parts) = host(input, OverlayPolicy::enforcing());

        assert!(host.step().unwrap());
        assert!(host.step().unwrap());

        assert_eq!(
            out.frames().last(),
            Some(&OutgoingFrame::Response { id: Some(json!(4)), result: MethodResult::NotImplemented })
        );
        assert!(host.bridge().service().lock().unwrap().is_showing());
        assert_eq!(parts.journal.count("kill:"), 0);
    }

    #[test]
    fn test_request_reads_method_call_fields() {
        let request = Request::from_value(&json!({
            "id": 7,
            "method": "showBlockOverlay",
            "arguments": {"packageName": "com.example.game"},
        }));

        assert_eq!(request.id, Some(json!(7)));
        assert_eq!(
            request.body,
            Inbound::Call(MethodCall::new("showBlockOverlay", json!({"packageName": "com.example.game"})))
        );
        assert_eq!(Request::from_value(&json!({"id": null, "action": "goBack"})).id, None);
    }
}
