//! Emergency-stop plumbing. Whatever input layer the host wires up (a
//! global hotkey, a tray action) fires the trigger; the session loop holds
//! the signal end and tears the session down when it fires.

use tokio::sync::mpsc;

#[derive(Clone)]
pub struct PanicTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl PanicTrigger {
    /// Requests an immediate stop of all playback. Safe to call from any
    /// thread; a missing listener makes this a no-op.
    pub fn fire(&self) {
        let _ = self.tx.send(());
    }
}

pub struct PanicSignal {
    rx: mpsc::UnboundedReceiver<()>,
}

impl PanicSignal {
    /// Waits for the next trigger. `None` once every trigger handle is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

pub fn panic_channel() -> (PanicTrigger, PanicSignal) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PanicTrigger { tx }, PanicSignal { rx })
}
