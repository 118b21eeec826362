//! Read-only streaming channels over embedded files.
//!
//! A [`Channel`] presents one file's static bytes as a seekable stream. The
//! handle owns the cursor; the state that queued readiness notifications need
//! lives behind an `Arc` shared by the handle and every pending notification,
//! so it is released exactly once, by whichever owner lets go last.
//!
//! ```text
//! open ──▶ Channel { cursor, Arc<ChannelState> }
//!            │ watch()          ┌──────────────────────────┐
//!            └─────────────────▶│ queued event (Arc clone) │──▶ on_ready()
//!                               └──────────────────────────┘    unless closed
//! ```

use std::io;
use std::sync::Arc;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use bitflags::bitflags;
use strum::{Display, EnumString};

use crate::error::{XvfsError, XvfsResult};
use crate::event::EventQueue;
use crate::instance::FilesystemInstance;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

bitflags! {
    /// Readiness a caller can watch for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Interest: u32 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        const EXCEPTION = 1 << 2;
    }
}

/// Base for a relative seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SeekMode {
    Start,
    Current,
    End,
}

#[cfg(test)]
thread_local! {
    static ALLOCATED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
    static FREED: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// State shared between a channel handle and its queued notifications.
struct ChannelState {
    name: String,
    instance: Arc<FilesystemInstance>,
    path: String,
    size: u64,
    pending: AtomicUsize,
    closed: AtomicBool,
}

impl ChannelState {
    fn new(instance: Arc<FilesystemInstance>, path: &str, size: u64) -> Self {
        #[cfg(test)]
        ALLOCATED.with(|n| n.set(n.get() + 1));

        let id = NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            name: format!("xvfs0x{id:x}"),
            instance,
            path: path.to_string(),
            size,
            pending: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

impl Drop for ChannelState {
    fn drop(&mut self) {
        #[cfg(test)]
        FREED.with(|n| n.set(n.get() + 1));

        tracing::trace!(channel = %self.name, path = %self.path, "channel state freed");
    }
}

/// Observes whether a channel's shared state has been released.
#[derive(Clone)]
pub struct ChannelTracker {
    state: Weak<ChannelState>,
}

impl ChannelTracker {
    /// True once the handle and every queued notification are gone.
    pub fn is_freed(&self) -> bool {
        self.state.strong_count() == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    offset: u64,
    eof: bool,
}

/// A seekable, read-only handle on one embedded file.
pub struct Channel {
    state: Arc<ChannelState>,
    events: Arc<dyn EventQueue>,
    cursor: Cursor,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.state.name)
            .field("instance", &self.state.instance.name())
            .field("path", &self.state.path)
            .field("size", &self.state.size)
            .field("offset", &self.cursor.offset)
            .field("eof", &self.cursor.eof)
            .finish()
    }
}

impl Channel {
    /// Open `path` (relative to the instance root) for reading.
    pub fn open(
        instance: Arc<FilesystemInstance>,
        path: &str,
        events: Arc<dyn EventQueue>,
    ) -> XvfsResult<Self> {
        let stat = instance.provider().stat(path)?;
        if stat.is_dir() {
            return Err(XvfsError::is_a_directory(path));
        }

        let state = ChannelState::new(instance, path, stat.size);
        tracing::debug!(
            channel = %state.name,
            instance = %state.instance.name(),
            path = %path,
            size = stat.size,
            "channel opened"
        );
        Ok(Self {
            state: Arc::new(state),
            events,
            cursor: Cursor::default(),
        })
    }

    /// Unique host-visible channel name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Path relative to the instance root.
    pub fn path(&self) -> &str {
        &self.state.path
    }

    pub fn size(&self) -> u64 {
        self.state.size
    }

    /// Current offset.
    pub fn tell(&self) -> u64 {
        self.cursor.offset
    }

    pub fn is_eof(&self) -> bool {
        self.cursor.eof
    }

    /// Readiness notifications queued but not yet fired.
    pub fn pending_notifications(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    pub fn tracker(&self) -> ChannelTracker {
        ChannelTracker {
            state: Arc::downgrade(&self.state),
        }
    }

    /// Read up to `max_len` bytes at the current offset.
    ///
    /// Returns an empty slice at end of file; once there, further reads stay
    /// empty until a seek moves the offset. Short reads are normal.
    pub fn read_chunk(&mut self, max_len: usize) -> XvfsResult<&[u8]> {
        if self.cursor.eof || max_len == 0 {
            return Ok(&[]);
        }

        let state = &*self.state;
        let data = state
            .instance
            .provider()
            .data(&state.path, self.cursor.offset, max_len)?;
        let data = &data[..data.len().min(max_len)];

        if data.is_empty() {
            self.cursor.eof = true;
        } else {
            self.cursor.offset += data.len() as u64;
        }
        tracing::trace!(
            channel = %state.name,
            len = data.len(),
            offset = self.cursor.offset,
            eof = self.cursor.eof,
            "read"
        );
        Ok(data)
    }

    /// Move the offset. Targets outside `[0, size]` are rejected and leave
    /// the offset where it was.
    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> XvfsResult<u64> {
        let base = match mode {
            SeekMode::Start => 0,
            SeekMode::Current => self.cursor.offset,
            SeekMode::End => self.state.size,
        };
        self.seek_to(i128::from(base) + i128::from(offset))
    }

    fn seek_to(&mut self, target: i128) -> XvfsResult<u64> {
        if target < 0 || target > i128::from(self.state.size) {
            return Err(XvfsError::invalid_argument(format!(
                "seek to {target} outside 0..={} in {}",
                self.state.size, self.state.path
            )));
        }
        // In range, so it fits in u64.
        let target = target as u64;
        if target != self.cursor.offset {
            self.cursor.offset = target;
            self.cursor.eof = false;
        }
        tracing::trace!(channel = %self.state.name, offset = target, "seek");
        Ok(target)
    }

    /// Queue a readiness notification on the host event queue.
    ///
    /// Only readability is ever reported, and not at end of file. The
    /// callback is skipped if the channel is closed before the event runs.
    pub fn watch(&self, interest: Interest, on_ready: impl FnOnce() + Send + 'static) {
        if !interest.contains(Interest::READABLE) || self.cursor.eof {
            return;
        }

        let state = Arc::clone(&self.state);
        state.pending.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(channel = %state.name, "readiness queued");

        let queued = Arc::clone(&state);
        let accepted = self.events.queue(Box::new(move || {
            queued.pending.fetch_sub(1, Ordering::AcqRel);
            if queued.closed.load(Ordering::Acquire) {
                tracing::trace!(channel = %queued.name, "readiness dropped after close");
                return;
            }
            on_ready();
        }));
        if !accepted {
            state.pending.fetch_sub(1, Ordering::AcqRel);
            tracing::debug!(channel = %state.name, "event queue gone, readiness not queued");
        }
    }

    /// Close the handle. Returns true if the channel state was released
    /// immediately, false if queued notifications still hold it.
    pub fn close(self) -> bool {
        let tracker = self.tracker();
        drop(self);
        tracker.is_freed()
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.state.closed.store(true, Ordering::Release);
        tracing::debug!(
            channel = %self.state.name,
            pending = self.pending_notifications(),
            "channel closed"
        );
    }
}

impl io::Read for Channel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let chunk = self.read_chunk(buf.len())?;
        let n = chunk.len();
        buf[..n].copy_from_slice(chunk);
        Ok(n)
    }
}

impl io::Seek for Channel {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = match pos {
            io::SeekFrom::Start(n) => i128::from(n),
            io::SeekFrom::Current(n) => i128::from(self.cursor.offset) + i128::from(n),
            io::SeekFrom::End(n) => i128::from(self.state.size) + i128::from(n),
        };
        Ok(self.seek_to(target)?)
    }
}
