use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maximum log file size before rotation (5 MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Size to keep after rotation (1 MB of most recent logs)
const KEEP_SIZE: u64 = 1024 * 1024;

pub const LOG_FILE_NAME: &str = "lifeplan.log";

/// Rotate log file if it exceeds `max_size`, keeping the last `keep` bytes.
fn rotate_log_if_needed(log_path: &Path, max_size: u64, keep: u64) -> io::Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let metadata = fs::metadata(log_path)?;
    if metadata.len() <= max_size {
        return Ok(());
    }

    let mut file = File::open(log_path)?;
    let start_pos = metadata.len().saturating_sub(keep);
    file.seek(SeekFrom::Start(start_pos))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    drop(file);

    // Skip to the first newline to avoid partial lines
    let skip = buffer
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
    file.write_all(&buffer[skip..])?;
    Ok(())
}

/// A writer factory that produces writers for the shared log file
#[derive(Clone)]
struct LogWriterFactory {
    file: Arc<Mutex<File>>,
}

/// A writer that holds a reference to the shared file
struct LogWriter {
    file: Arc<Mutex<File>>,
}

impl LogWriter {
    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> io::Result<T>) -> io::Result<T> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        f(&mut file)
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            file: self.file.clone(),
        }
    }
}

fn open_log_file(data_dir: &Path) -> io::Result<LogWriterFactory> {
    fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(LOG_FILE_NAME);

    if let Err(e) = rotate_log_if_needed(&log_path, MAX_LOG_SIZE, KEEP_SIZE) {
        eprintln!("Warning: Failed to rotate log file: {e}");
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    Ok(LogWriterFactory {
        file: Arc::new(Mutex::new(file)),
    })
}

/// Initialize logging.
///
/// With a data directory, logs are appended to `{data_dir}/lifeplan.log`;
/// once it exceeds 5MB only the last 1MB is kept. Without one they go to
/// stderr. `RUST_LOG` overrides `level`.
pub fn init_logging(data_dir: Option<&Path>, level: &str) -> color_eyre::Result<()> {
    let default_filter = format!("lifeplan={level},lifeplan_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let file_layer = match data_dir {
        Some(dir) => Some(
            fmt::layer()
                .with_writer(open_log_file(dir)?)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        ),
        None => None,
    };
    let stderr_layer = data_dir
        .is_none()
        .then(|| fmt::layer().with_writer(io::stderr).with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    if let Some(dir) = data_dir {
        tracing::info!(
            "Logging initialized (log_path={})",
            dir.join(LOG_FILE_NAME).display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_small_log_is_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "one\ntwo\n").unwrap();

        rotate_log_if_needed(&path, 1024, 4).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_rotation_keeps_whole_recent_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "first line\nsecond line\nthird\n").unwrap();

        // Last 10 bytes: "ine\nthird\n"; the partial line is dropped
        rotate_log_if_needed(&path, 16, 10).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "--- Log rotated (older entries removed) ---\nthird\n"
        );
    }

    #[test]
    fn test_missing_log_is_fine() {
        let dir = tempdir().unwrap();
        rotate_log_if_needed(&dir.path().join("absent.log"), 1, 1).unwrap();
    }
}
