use kage_hotkey::{CommandSink, DispatchError};
use kage_types::Command;
use kage_ui::{BridgeError, UiBridge};

/// Hands hotkey commands from the listener thread to the GUI loop.
pub struct ChannelDispatcher {
    bridge: UiBridge<Command>,
}

impl ChannelDispatcher {
    pub fn new(bridge: UiBridge<Command>) -> Self {
        Self { bridge }
    }
}

impl CommandSink for ChannelDispatcher {
    fn dispatch(&self, command: Command) -> Result<(), DispatchError> {
        self.bridge.send(command).map_err(|e| match e {
            BridgeError::Closed => DispatchError::Closed,
            BridgeError::Full => DispatchError::Failed(format!("{} dropped: {}", command, e)),
        })
    }
}
