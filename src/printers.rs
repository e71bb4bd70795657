use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use crate::errors::PrintError;

/// A write target addressed by a filesystem path, such as a printer device node.
pub trait OutputDevice {
    /// Opens `path` for writing with create + truncate semantics.
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write>>;
    fn remove(&self, path: &Path) -> io::Result<()>;
    fn type_name(&self) -> &'static str;
}

/// Plain filesystem device. Works for regular files and character devices alike.
pub struct FileDevice;

impl OutputDevice for FileDevice {
    fn create(&self, path: &Path) -> io::Result<Box<dyn Write>> {
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn type_name(&self) -> &'static str {
        "File Device"
    }
}

/// Sends `source_path` to `destination` `copies` times, one full pass per copy.
///
/// The source is opened once and rewound before every pass. Each pass truncates the
/// destination, so a successful run leaves exactly one copy of the source bytes
/// there. The first failing pass ends the run.
pub fn print_copies(
    device: &dyn OutputDevice,
    source_path: &Path,
    destination: &Path,
    copies: u32,
) -> Result<(), PrintError> {
    if copies == 0 {
        info!("No copies requested for {:?}, nothing to print", source_path);
        return Ok(());
    }

    let mut source = File::open(source_path).map_err(|e| {
        warn!("could not open source file {:?}: {}", source_path, e);
        PrintError::OpenSource {
            path: source_path.to_path_buf(),
            source: e,
        }
    })?;

    info!(
        "Starting print job: {} copies of {:?} to {} {:?}",
        copies,
        source_path,
        device.type_name(),
        destination
    );

    for pass in 1..=copies {
        source.seek(SeekFrom::Start(0)).map_err(|e| PrintError::Rewind {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        let bytes = copy_pass(device, &mut source, destination).map_err(|e| {
            error!("could not print file {:?} (copy {}/{}): {}", source_path, pass, copies, e);
            e
        })?;

        debug!("Copy {}/{} sent ({} bytes)", pass, copies, bytes);
    }

    info!("Print job complete: {} copies of {:?}", copies, source_path);
    Ok(())
}

/// One full pass of `source` into a freshly truncated `destination`.
///
/// A failure reading the source mid-stream counts as a transfer failure, same as a
/// failed write: the destination is removed either way.
fn copy_pass(
    device: &dyn OutputDevice,
    source: &mut impl Read,
    destination: &Path,
) -> Result<u64, PrintError> {
    let mut writer = device.create(destination).map_err(|e| {
        warn!("could not open destination file {:?}: {}", destination, e);
        PrintError::OpenDestination {
            path: destination.to_path_buf(),
            source: e,
        }
    })?;

    let outcome = stream(source, writer.as_mut());
    // The handle must be closed before the artifact can be removed.
    drop(writer);

    let transfer = match outcome {
        Ok(bytes) => return Ok(bytes),
        Err(e) => e,
    };

    match device.remove(destination) {
        Ok(()) => {
            warn!("Removed partial output at {:?}", destination);
            Err(PrintError::Transfer {
                path: destination.to_path_buf(),
                source: transfer,
            })
        }
        Err(cleanup) => {
            error!("could not delete destination file {:?}: {}", destination, cleanup);
            Err(PrintError::Cleanup {
                path: destination.to_path_buf(),
                transfer,
                cleanup,
            })
        }
    }
}

fn stream(source: &mut impl Read, writer: &mut dyn Write) -> io::Result<u64> {
    let bytes = io::copy(source, writer)?;
    writer.flush()?;
    Ok(bytes)
}

/// What a [`MockDevice`] has seen so far.
#[derive(Debug, Default, Clone)]
pub struct MockDeviceState {
    pub opened: u32,
    pub contents: Option<Vec<u8>>,
    pub removed: bool,
}

/// In-memory device for testing, or for running without a physical printer.
/// Can be told to fail writes on a given pass and to refuse removal.
#[derive(Default)]
pub struct MockDevice {
    fail_on_pass: Option<u32>,
    fail_remove: bool,
    state: Rc<RefCell<MockDeviceState>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_write_on_pass(mut self, pass: u32) -> Self {
        self.fail_on_pass = Some(pass);
        self
    }

    pub fn fail_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    /// Shared handle on the recorded state; stays valid after the device is moved.
    pub fn state(&self) -> Rc<RefCell<MockDeviceState>> {
        Rc::clone(&self.state)
    }
}

impl OutputDevice for MockDevice {
    fn create(&self, _path: &Path) -> io::Result<Box<dyn Write>> {
        let mut state = self.state.borrow_mut();
        state.opened += 1;
        state.contents = Some(Vec::new());
        state.removed = false;

        Ok(Box::new(MockWriter {
            state: Rc::clone(&self.state),
            fail: self.fail_on_pass == Some(state.opened),
            accepted_partial: false,
        }))
    }

    fn remove(&self, _path: &Path) -> io::Result<()> {
        if self.fail_remove {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock device refused removal",
            ));
        }
        let mut state = self.state.borrow_mut();
        state.contents = None;
        state.removed = true;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "Mock Device"
    }
}

struct MockWriter {
    state: Rc<RefCell<MockDeviceState>>,
    fail: bool,
    accepted_partial: bool,
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail {
            if self.accepted_partial || buf.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "mock device stopped accepting data",
                ));
            }
            // Take a few bytes first so there is a partial artifact to clean up.
            self.accepted_partial = true;
            let n = buf.len().min(4);
            self.append(&buf[..n]);
            return Ok(n);
        }
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MockWriter {
    fn append(&self, buf: &[u8]) {
        if let Some(contents) = self.state.borrow_mut().contents.as_mut() {
            contents.extend_from_slice(buf);
        }
    }
}
