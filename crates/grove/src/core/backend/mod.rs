/// In-memory platform for tests and scripted runs.
pub mod headless;

use std::{
    collections::HashMap,
    fmt,
    sync::mpsc::{self, TryRecvError},
};

use geom::{Expanse, Rect};
use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use crate::{
    EntityId, WindowId,
    canvas::Canvas,
    config::Config,
    core::world::Core,
    error::{Error, Result},
    event::WindowEvent,
    theme::Theme,
};

/// An opaque platform window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

/// A callback run on the loop thread with exclusive access to the core.
/// Callbacks hold entity ids, never references; check
/// [`Core::contains`] before using one.
pub type Deferred = Box<dyn FnOnce(&mut Core) + Send>;

/// Messages consumed by the event loop.
enum Message {
    /// A decoded event for a native window.
    Event(NativeHandle, WindowEvent),
    /// A deferred callback.
    Do(Deferred),
    /// End the loop.
    Stop,
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(h, e) => write!(f, "Event({h:?}, {e:?})"),
            Self::Do(_) => write!(f, "Do"),
            Self::Stop => write!(f, "Stop"),
        }
    }
}

impl Message {
    /// The window a pointer motion event is for.
    fn motion_target(&self) -> Option<NativeHandle> {
        match self {
            Self::Event(handle, WindowEvent::MouseMotion { .. }) => Some(*handle),
            _ => None,
        }
    }
}

/// The platform's channel into the event loop.
#[derive(Debug, Clone)]
pub struct EventSink {
    /// Loop message sender.
    tx: mpsc::Sender<Message>,
}

impl EventSink {
    /// Deliver a decoded event for a native window.
    pub fn send(&self, handle: NativeHandle, event: WindowEvent) -> Result<()> {
        self.tx
            .send(Message::Event(handle, event))
            .map_err(|_| Error::Closed)
    }
}

/// A handle other threads use to run code on the loop thread.
#[derive(Debug, Clone)]
pub struct Poster {
    /// Loop message sender.
    tx: mpsc::Sender<Message>,
}

impl Poster {
    /// Queue a callback to run between events.
    pub fn post(&self, f: impl FnOnce(&mut Core) + Send + 'static) -> Result<()> {
        self.tx
            .send(Message::Do(Box::new(f)))
            .map_err(|_| Error::Closed)
    }

    /// Ask the loop to stop after the messages already queued.
    pub fn stop(&self) -> Result<()> {
        self.tx.send(Message::Stop).map_err(|_| Error::Closed)
    }
}

/// The windowing system: a source of decoded events and a sink for pixels.
pub trait Platform {
    /// Open the connection. Events are delivered through `sink`.
    fn connect(&mut self, sink: EventSink) -> Result<()>;

    /// Create a native surface.
    fn create_window(&mut self, size: Expanse) -> Result<NativeHandle>;

    /// Destroy a native surface.
    fn destroy_window(&mut self, handle: NativeHandle) -> Result<()>;

    /// Set a surface title.
    fn set_title(&mut self, handle: NativeHandle, title: &str) -> Result<()>;

    /// Constrain a surface's minimum size.
    fn set_minimum_size(&mut self, handle: NativeHandle, size: Expanse) -> Result<()>;

    /// Resize a surface.
    fn resize_window(&mut self, handle: NativeHandle, size: Expanse) -> Result<()>;

    /// Copy `region` of the canvas to the surface.
    fn push(&mut self, handle: NativeHandle, canvas: &Canvas, region: Rect) -> Result<()>;

    /// Close the connection.
    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Owns the core, the platform connection, and the event loop.
///
/// The loop is single threaded. Other threads reach it only through a
/// [`Poster`] (deferred callbacks) or the platform's [`EventSink`]. Every
/// message is handled to completion and followed by a refresh of all
/// windows, so all effects of one event are visible before the next is
/// read.
pub struct Backend {
    /// Entity arena and windows.
    core: Core,
    /// Platform connection.
    platform: Box<dyn Platform>,
    /// Native handle to window.
    handles: HashMap<NativeHandle, WindowId>,
    /// Window to native handle.
    natives: SecondaryMap<WindowId, NativeHandle>,
    /// Loop message sender, cloned into sinks and posters.
    tx: mpsc::Sender<Message>,
    /// Loop message receiver.
    rx: mpsc::Receiver<Message>,
    /// A message read ahead while coalescing motion.
    pending: Option<Message>,
    /// The loop has not been stopped.
    open: bool,
    /// The platform connection is live.
    connected: bool,
}

impl Backend {
    /// Connect to a platform. Connection failures are returned as
    /// [`Error::Connection`].
    pub fn new(
        platform: impl Platform + 'static,
        config: Config,
        theme: impl Theme + 'static,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let mut platform: Box<dyn Platform> = Box::new(platform);
        platform
            .connect(EventSink { tx: tx.clone() })
            .map_err(|e| match e {
                Error::Connection(_) => e,
                other => Error::Connection(other.to_string()),
            })?;
        debug!("platform connected");
        Ok(Self {
            core: Core::new(config, theme),
            platform,
            handles: HashMap::new(),
            natives: SecondaryMap::new(),
            tx,
            rx,
            pending: None,
            open: true,
            connected: true,
        })
    }

    /// The core.
    pub fn core(&self) -> &Core {
        &self.core
    }

    /// The core, mutably.
    pub fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    /// Create a native window and its core window, optionally with a root.
    pub fn create_window(&mut self, size: Expanse, root: Option<EntityId>) -> Result<WindowId> {
        let handle = self.platform.create_window(size)?;
        let window = self.core.open_window(size);
        self.handles.insert(handle, window);
        self.natives.insert(window, handle);
        debug!(?window, ?handle, "window created");
        if root.is_some() {
            self.core.set_root(window, root)?;
        }
        Ok(window)
    }

    /// Set a window's title.
    pub fn set_title(&mut self, window: WindowId, title: &str) -> Result<()> {
        let handle = self.native_handle(window)?;
        self.platform.set_title(handle, title)
    }

    /// Destroy a window. Its root is unlinked and returned.
    pub fn destroy_window(&mut self, window: WindowId) -> Result<Option<EntityId>> {
        let handle = self
            .natives
            .remove(window)
            .ok_or(Error::WindowNotFound(window))?;
        self.handles.remove(&handle);
        let root = self.core.close_window(window)?;
        debug!(?window, ?handle, "window destroyed");
        self.platform.destroy_window(handle)?;
        Ok(root)
    }

    /// The native handle behind a window.
    pub fn native_handle(&self, window: WindowId) -> Result<NativeHandle> {
        self.natives
            .get(window)
            .copied()
            .ok_or(Error::WindowNotFound(window))
    }

    /// The window behind a native handle.
    pub fn window_for(&self, handle: NativeHandle) -> Option<WindowId> {
        self.handles.get(&handle).copied()
    }

    /// Number of open windows.
    pub fn window_count(&self) -> usize {
        self.handles.len()
    }

    /// Is the loop still accepting work?
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// A channel for delivering platform events.
    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
        }
    }

    /// A handle for posting callbacks from other threads.
    pub fn poster(&self) -> Poster {
        Poster {
            tx: self.tx.clone(),
        }
    }

    /// Queue a callback to run on the next loop iteration.
    pub fn post(&self, f: impl FnOnce(&mut Core) + Send + 'static) -> Result<()> {
        self.poster().post(f)
    }

    /// Replace the theme in every window.
    pub fn set_theme(&mut self, theme: impl Theme + 'static) {
        self.core.set_theme(theme);
    }

    /// Replace the configuration in every window.
    pub fn set_config(&mut self, config: Config) {
        self.core.set_config(config);
    }

    /// Run the loop until it is stopped or the last window closes, then
    /// close the backend.
    pub fn run(&mut self) -> Result<()> {
        self.refresh()?;
        while self.open && !self.handles.is_empty() {
            let Some(msg) = self.next_message(true) else {
                break;
            };
            self.handle_message(msg)?;
            self.refresh()?;
        }
        self.close()
    }

    /// Handle every queued message without blocking. Returns the number of
    /// messages handled.
    pub fn pump(&mut self) -> Result<usize> {
        self.refresh()?;
        let mut handled = 0;
        while self.open {
            let Some(msg) = self.next_message(false) else {
                break;
            };
            self.handle_message(msg)?;
            self.refresh()?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Stop the loop after the current message.
    pub fn stop(&mut self) {
        self.open = false;
    }

    /// Destroy every window and disconnect from the platform. Further calls
    /// are no-ops.
    pub fn close(&mut self) -> Result<()> {
        self.open = false;
        if !self.connected {
            return Ok(());
        }
        let windows: Vec<WindowId> = self.natives.keys().collect();
        for window in windows {
            self.destroy_window(window)?;
        }
        self.connected = false;
        debug!("platform disconnected");
        self.platform.disconnect()
    }

    /// Lay out and paint every window, forwarding surface changes and
    /// pushing the painted region.
    pub fn refresh(&mut self) -> Result<()> {
        self.reap_closed_windows()?;
        let windows: Vec<(WindowId, NativeHandle)> =
            self.natives.iter().map(|(w, h)| (w, *h)).collect();
        for (window, handle) in windows {
            let region = self.core.refresh_window(window)?;
            let surface = self.core.take_surface_request(window);
            if let Some(size) = surface.minimum {
                self.platform.set_minimum_size(handle, size)?;
            }
            if let Some(size) = surface.resize {
                self.platform.resize_window(handle, size)?;
            }
            if let Some(region) = region {
                trace!(?window, ?region, "push");
                let canvas = self.core.window(window)?.canvas();
                self.platform.push(handle, canvas, region)?;
            }
        }
        Ok(())
    }

    /// Destroy the native surfaces of windows closed directly on the core,
    /// as a deferred callback may do.
    fn reap_closed_windows(&mut self) -> Result<()> {
        let closed: Vec<(WindowId, NativeHandle)> = self
            .natives
            .iter()
            .filter(|(w, _)| self.core.window(*w).is_err())
            .map(|(w, h)| (w, *h))
            .collect();
        for (window, handle) in closed {
            self.natives.remove(window);
            self.handles.remove(&handle);
            debug!(?window, ?handle, "reaping window closed on the core");
            self.platform.destroy_window(handle)?;
        }
        Ok(())
    }

    /// The next message, coalescing runs of pointer motion for one window
    /// so that only the latest position in a run is handled.
    fn next_message(&mut self, block: bool) -> Option<Message> {
        if let Some(msg) = self.pending.take() {
            return Some(msg);
        }
        let mut msg = if block {
            self.rx.recv().ok()?
        } else {
            self.rx.try_recv().ok()?
        };
        if let Some(target) = msg.motion_target() {
            loop {
                match self.rx.try_recv() {
                    Ok(next) if next.motion_target() == Some(target) => msg = next,
                    Ok(next) => {
                        self.pending = Some(next);
                        break;
                    }
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
        Some(msg)
    }

    /// Handle one message.
    fn handle_message(&mut self, msg: Message) -> Result<()> {
        trace!(?msg, "message");
        let (handle, event) = match msg {
            Message::Stop => {
                self.open = false;
                return Ok(());
            }
            Message::Do(f) => {
                f(&mut self.core);
                return Ok(());
            }
            Message::Event(handle, event) => (handle, event),
        };
        let Some(window) = self.window_for(handle) else {
            warn!(?handle, ?event, "dropping event for unknown window");
            return Ok(());
        };
        match event {
            WindowEvent::Close => {
                self.destroy_window(window)?;
                if self.handles.is_empty() {
                    debug!("last window closed");
                    self.open = false;
                }
                Ok(())
            }
            WindowEvent::Expose => {
                let canvas = self.core.window(window)?.canvas();
                self.platform.push(handle, canvas, canvas.bounds())
            }
            event => self.core.handle_event(window, event),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        thread,
    };

    use geom::Point;

    use super::{
        headless::{HeadlessLog, HeadlessPlatform, Record},
        *,
    };
    use crate::{
        event::{Button, key},
        testing::probe::{Probe, events, reset},
        theme::DefaultTheme,
    };

    fn backend() -> (Arc<Mutex<HeadlessLog>>, Backend) {
        let (log, platform) = HeadlessPlatform::create();
        let backend = Backend::new(platform, Config::default(), DefaultTheme).unwrap();
        (log, backend)
    }

    #[test]
    fn connection_failure_is_an_error() {
        let err = Backend::new(HeadlessPlatform::failing(), Config::default(), DefaultTheme)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn refresh_pushes_once_per_change() -> Result<()> {
        let (log, mut backend) = backend();
        let root = backend.core_mut().create(Probe::container("root"));
        let window = backend.create_window(Expanse::new(8, 4), Some(root))?;
        let handle = backend.native_handle(window)?;
        backend.pump()?;
        backend.pump()?;
        assert_eq!(
            log.lock().unwrap().pushes(handle),
            vec![Rect::new(0, 0, 8, 4)]
        );
        Ok(())
    }

    #[test]
    fn motion_is_coalesced() -> Result<()> {
        let (_, mut backend) = backend();
        let root = backend.core_mut().create(Probe::leaf("root").mouse());
        let window = backend.create_window(Expanse::new(8, 4), Some(root))?;
        let handle = backend.native_handle(window)?;
        backend.pump()?;
        let sink = backend.sink();
        for x in 0..3 {
            sink.send(
                handle,
                WindowEvent::MouseMotion {
                    point: Point::new(x, 1),
                    mods: key::Empty,
                },
            )?;
        }
        sink.send(
            handle,
            WindowEvent::MouseDown {
                point: Point::new(2, 1),
                button: Button::Left,
                mods: key::Empty,
            },
        )?;
        reset();
        assert_eq!(backend.pump()?, 2);
        assert_eq!(events(), vec!["root.motion(2,1)", "root.mouse_down(Left)"]);
        Ok(())
    }

    #[test]
    fn motion_for_different_windows_is_kept() -> Result<()> {
        let (_, mut backend) = backend();
        let a = backend.core_mut().create(Probe::leaf("a").mouse());
        let b = backend.core_mut().create(Probe::leaf("b").mouse());
        let wa = backend.create_window(Expanse::new(8, 4), Some(a))?;
        let wb = backend.create_window(Expanse::new(8, 4), Some(b))?;
        backend.pump()?;
        let sink = backend.sink();
        for (window, x) in [(wa, 1), (wa, 2), (wb, 3), (wa, 4)] {
            sink.send(
                backend.native_handle(window)?,
                WindowEvent::MouseMotion {
                    point: Point::new(x, 1),
                    mods: key::Empty,
                },
            )?;
        }
        reset();
        assert_eq!(backend.pump()?, 3);
        assert_eq!(events(), vec!["a.motion(2,1)", "b.motion(3,1)", "a.motion(4,1)"]);
        Ok(())
    }

    #[test]
    fn windows_closed_by_callbacks_are_destroyed() -> Result<()> {
        let (log, mut backend) = backend();
        let root = backend.core_mut().create(Probe::container("root"));
        let wa = backend.create_window(Expanse::new(8, 4), Some(root))?;
        let wb = backend.create_window(Expanse::new(8, 4), None)?;
        let ha = backend.native_handle(wa)?;
        backend.pump()?;

        backend.post(move |core| {
            core.close_window(wa).unwrap();
        })?;
        assert_eq!(backend.pump()?, 1);
        assert_eq!(backend.window_count(), 1);
        assert!(backend.native_handle(wa).is_err());
        assert!(backend.native_handle(wb).is_ok());
        assert!(log.lock().unwrap().records.contains(&Record::Destroyed(ha)));

        backend.sink().send(ha, WindowEvent::KeyDown('x'.into()))?;
        assert_eq!(backend.pump()?, 1);
        backend.close()?;
        let log = log.lock().unwrap();
        let destroyed = log
            .records
            .iter()
            .filter(|r| **r == Record::Destroyed(ha))
            .count();
        assert_eq!(destroyed, 1);
        Ok(())
    }

    #[test]
    fn deferred_callbacks_run_on_the_loop() -> Result<()> {
        let (_, mut backend) = backend();
        let root = backend.core_mut().create(Probe::container("root"));
        backend.create_window(Expanse::new(8, 4), Some(root))?;
        let poster = backend.poster();
        thread::spawn(move || {
            poster
                .post(move |core| core.set_minimum_size(root, Expanse::new(2, 2)))
                .unwrap();
            poster.stop().unwrap();
        })
        .join()
        .unwrap();
        backend.run()?;
        assert_eq!(
            backend.core().entity(root).unwrap().min_size(),
            Expanse::new(2, 2)
        );
        assert_eq!(backend.window_count(), 0);
        assert!(!backend.is_open());
        Ok(())
    }

    #[test]
    fn unknown_handles_are_dropped() -> Result<()> {
        let (_, mut backend) = backend();
        let root = backend.core_mut().create(Probe::leaf("root").keyboard());
        backend.create_window(Expanse::new(8, 4), Some(root))?;
        backend
            .sink()
            .send(NativeHandle(999), WindowEvent::KeyDown('x'.into()))?;
        assert_eq!(backend.pump()?, 1);
        assert_eq!(backend.window_count(), 1);
        Ok(())
    }
}
