use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use geom::{Expanse, Rect};

use super::{EventSink, NativeHandle, Platform};
use crate::{
    canvas::Canvas,
    error::{Error, Result},
};

/// One request the platform received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// The backend connected.
    Connected,
    /// A surface was created.
    Created(NativeHandle, Expanse),
    /// A surface was destroyed.
    Destroyed(NativeHandle),
    /// A title was set.
    Title(NativeHandle, String),
    /// A minimum size was set.
    MinimumSize(NativeHandle, Expanse),
    /// A surface was resized.
    Resized(NativeHandle, Expanse),
    /// A region was pushed.
    Push(NativeHandle, Rect),
    /// The backend disconnected.
    Disconnected,
}

/// Everything a [`HeadlessPlatform`] has been asked to do.
#[derive(Debug, Default)]
pub struct HeadlessLog {
    /// Requests in arrival order.
    pub records: Vec<Record>,
    /// The latest full canvas pushed to each surface.
    frames: HashMap<NativeHandle, Canvas>,
    /// The sink handed over on connect.
    sink: Option<EventSink>,
}

impl HeadlessLog {
    /// Regions pushed to a surface, oldest first.
    pub fn pushes(&self, handle: NativeHandle) -> Vec<Rect> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Push(h, region) if *h == handle => Some(*region),
                _ => None,
            })
            .collect()
    }

    /// The canvas as of the latest push to a surface.
    pub fn frame(&self, handle: NativeHandle) -> Option<&Canvas> {
        self.frames.get(&handle)
    }

    /// The event sink, once connected. Scripted drivers feed input here.
    pub fn sink(&self) -> Option<EventSink> {
        self.sink.clone()
    }

    /// Forget recorded requests. Frames are kept.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// A [`Platform`] without a display. Requests are recorded in a shared
/// [`HeadlessLog`].
#[derive(Debug)]
pub struct HeadlessPlatform {
    /// Shared request log.
    log: Arc<Mutex<HeadlessLog>>,
    /// Next surface handle.
    next: u64,
    /// Refuse to connect.
    fail_connect: bool,
}

impl HeadlessPlatform {
    /// A platform and a handle to its log.
    pub fn create() -> (Arc<Mutex<HeadlessLog>>, Self) {
        let log = Arc::new(Mutex::new(HeadlessLog::default()));
        let platform = Self {
            log: Arc::clone(&log),
            next: 1,
            fail_connect: false,
        };
        (log, platform)
    }

    /// A platform whose connection attempt fails.
    pub fn failing() -> Self {
        let (_, mut platform) = Self::create();
        platform.fail_connect = true;
        platform
    }

    /// Lock the log.
    fn log(&self) -> Result<MutexGuard<'_, HeadlessLog>> {
        self.log
            .lock()
            .map_err(|e| Error::Platform(format!("headless log poisoned: {e}")))
    }

    /// Append a record.
    fn record(&self, record: Record) -> Result<()> {
        self.log()?.records.push(record);
        Ok(())
    }
}

impl Platform for HeadlessPlatform {
    fn connect(&mut self, sink: EventSink) -> Result<()> {
        if self.fail_connect {
            return Err(Error::Connection("headless display unavailable".into()));
        }
        let mut log = self.log()?;
        log.sink = Some(sink);
        log.records.push(Record::Connected);
        Ok(())
    }

    fn create_window(&mut self, size: Expanse) -> Result<NativeHandle> {
        let handle = NativeHandle(self.next);
        self.next += 1;
        self.record(Record::Created(handle, size))?;
        Ok(handle)
    }

    fn destroy_window(&mut self, handle: NativeHandle) -> Result<()> {
        self.record(Record::Destroyed(handle))
    }

    fn set_title(&mut self, handle: NativeHandle, title: &str) -> Result<()> {
        self.record(Record::Title(handle, title.to_string()))
    }

    fn set_minimum_size(&mut self, handle: NativeHandle, size: Expanse) -> Result<()> {
        self.record(Record::MinimumSize(handle, size))
    }

    fn resize_window(&mut self, handle: NativeHandle, size: Expanse) -> Result<()> {
        self.record(Record::Resized(handle, size))
    }

    fn push(&mut self, handle: NativeHandle, canvas: &Canvas, region: Rect) -> Result<()> {
        let mut log = self.log()?;
        log.records.push(Record::Push(handle, region));
        log.frames.insert(handle, canvas.clone());
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let mut log = self.log()?;
        log.sink = None;
        log.records.push(Record::Disconnected);
        Ok(())
    }
}
