//! Live Document Capture CLI
//!
//! Runs one capture session against the mock device (or a real camera
//! with the `camera` feature), presses the capture button after a delay
//! and writes the captured blob to disk.

use clap::{Parser, ValueEnum};
use doc_live_capture::{
    capture::{FileConfig, MediaDevice, MockDevice, PermissionMode},
    metrics::{MetricsRegistry, MetricsSnapshot},
    session::{CaptureError, CaptureHost, CaptureResult, CaptureSession, SessionState},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeviceKind {
    /// Synthetic frames.
    Mock,
    /// Platform camera (requires the `camera` feature).
    Native,
}

#[derive(Debug, Parser)]
#[command(name = "doc-live-capture", version, about = "Capture a live document photo")]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document type, e.g. passport or driving_licence.
    #[arg(long)]
    document_type: Option<String>,

    /// Skip camera permission negotiation.
    #[arg(long)]
    pre_granted: bool,

    /// Inactivity window in seconds.
    #[arg(long)]
    watchdog_secs: Option<u64>,

    /// Delay before pressing the capture button, in milliseconds.
    #[arg(long)]
    capture_after_ms: Option<u64>,

    /// Directory the captured file is written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print Prometheus metrics at the end.
    #[arg(long)]
    metrics: bool,

    /// Device backend.
    #[arg(long, value_enum, default_value = "mock")]
    device: DeviceKind,
}

/// Host that stores captures on disk.
struct FileHost {
    directory: PathBuf,
    written: Option<PathBuf>,
    write_error: Option<std::io::Error>,
    last_error: Option<CaptureError>,
}

impl FileHost {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            written: None,
            write_error: None,
            last_error: None,
        }
    }
}

impl CaptureHost for FileHost {
    fn on_capture(&mut self, result: CaptureResult) {
        let path = self.directory.join(result.filename());
        let fingerprint = result.fingerprint();
        match std::fs::write(&path, result.into_image_bytes()) {
            Ok(()) => {
                info!(path = %path.display(), %fingerprint, "Capture written");
                self.written = Some(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write capture");
                self.write_error = Some(e);
            }
        }
    }

    fn on_error(&mut self, error: &CaptureError) {
        warn!(code = error.code(), "{}", error);
        self.last_error = Some(error.clone());
    }
}

/// The demo presses the button once; any delivered capture or surfaced
/// error ends the run.
fn run_finished<D: MediaDevice>(session: &CaptureSession<D, FileHost>) -> bool {
    matches!(
        session.state(),
        SessionState::Inactive(_) | SessionState::DeviceError(_)
    ) || session.stats().captures_delivered > 0
}

fn open_device(kind: DeviceKind) -> Result<Box<dyn MediaDevice>, String> {
    match kind {
        DeviceKind::Mock => Ok(Box::new(MockDevice::new())),
        #[cfg(feature = "camera")]
        DeviceKind::Native => Ok(Box::new(doc_live_capture::capture::NativeDevice::new())),
        #[cfg(not(feature = "camera"))]
        DeviceKind::Native => Err("built without the `camera` feature".to_string()),
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Live Document Capture v{}", doc_live_capture::VERSION);

    let mut file_config = match &cli.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(2);
            }
        },
        None => FileConfig::default(),
    };

    // Command-line flags win over the file.
    if let Some(document_type) = cli.document_type {
        file_config.capture.document_type = Some(document_type);
    }
    if cli.pre_granted {
        file_config.capture.permission_mode = PermissionMode::PreGranted;
    }
    if let Some(secs) = cli.watchdog_secs {
        file_config.capture.watchdog_secs = secs;
    }
    if let Some(ms) = cli.capture_after_ms {
        file_config.output.capture_after_ms = ms;
    }
    if let Some(dir) = cli.output_dir {
        file_config.output.directory = dir;
    }
    let output = file_config.output;

    let mut device = match open_device(cli.device) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("Failed to select device: {}", e);
            std::process::exit(2);
        }
    };
    if file_config.capture.permission_mode == PermissionMode::PreGranted {
        // Pre-granted sessions never open the device themselves.
        if let Err(e) = device.open(&file_config.capture) {
            eprintln!("Failed to open camera: {}", e);
            std::process::exit(1);
        }
    }

    let host = FileHost::new(output.directory.clone());
    let mut session = match CaptureSession::new(file_config.capture, device, host) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    info!(
        document_size = ?session.render_hints().document_size,
        "Starting capture session"
    );
    session.start();

    let started = Instant::now();
    let capture_after = Duration::from_millis(output.capture_after_ms);

    loop {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted");
            break;
        }

        session.tick();
        if run_finished(&session) {
            break;
        }
        if started.elapsed() >= capture_after && session.state().accepts_capture() {
            session.request_capture();
            continue;
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    session.teardown();

    if output.print_metrics || cli.metrics {
        match MetricsRegistry::new() {
            Ok(registry) => {
                registry.update(&MetricsSnapshot::from_session(&session));
                match registry.encode() {
                    Ok(text) => print!("{}", text),
                    Err(e) => warn!("Failed to encode metrics: {}", e),
                }
            }
            Err(e) => warn!("Failed to create metrics registry: {}", e),
        }
    }

    let host = session.host();
    match (&host.written, &host.write_error, &host.last_error) {
        (Some(path), _, _) => println!("{}", path.display()),
        (None, Some(e), _) => {
            eprintln!("Capture taken but not saved: {}", e);
            std::process::exit(1);
        }
        (None, None, Some(error)) => {
            eprintln!("No capture: {} ({})", error, error.code());
            std::process::exit(1);
        }
        (None, None, None) => std::process::exit(1),
    }
}
