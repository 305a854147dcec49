use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use text_watermark::{
    source, Compositor, Position, Session, WatermarkRequest, DEFAULT_FONT_NAME, DEFAULT_TEXT,
};

#[derive(Parser)]
#[command(
    name = "text-watermark",
    about = "Overlay a translucent text watermark onto a PNG or JPEG image",
    version,
    after_help = "Example: text-watermark photo.jpg -t \"© Jane Doe\\nDo not repost\" -p center\n\n\
                  Positions: bottom-right, bottom-left, top-right, top-left, center"
)]
struct Cli {
    /// Input image (PNG or JPEG)
    input: PathBuf,

    /// Output PNG file (default: watermarked.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Watermark text; "\n" starts a new line
    #[arg(short, long, env = "WATERMARK_TEXT", default_value = DEFAULT_TEXT)]
    text: String,

    /// Where to place the watermark
    #[arg(short, long, default_value = "bottom-right")]
    position: Position,

    /// Text size as percent of the image width
    #[arg(short, long, default_value_t = 6, value_parser = clap::value_parser!(u32).range(2..=15))]
    size: u32,

    /// Opacity of the text and its shadow
    #[arg(long, default_value_t = 160, value_parser = clap::value_parser!(u8).range(50..=255))]
    opacity: u8,

    /// Font file name or path
    #[arg(long, env = "WATERMARK_FONT", default_value = DEFAULT_FONT_NAME)]
    font: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to install logger: {e}");
    }

    if !cli.input.is_file() {
        eprintln!("Error: Input file does not exist: {}", cli.input.display());
        process::exit(1);
    }
    if !source::is_supported_image(&cli.input) {
        eprintln!(
            "Error: Unsupported input {} (expected .png, .jpg or .jpeg)",
            cli.input.display()
        );
        process::exit(1);
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| source::default_output_path(&cli.input));

    let request = WatermarkRequest {
        text: unescape_newlines(&cli.text),
        position: cli.position,
        size_percent: cli.size,
        opacity: cli.opacity,
    };

    if let Err(e) = run(&cli.input, &output, &cli.font, &request) {
        eprintln!("[FAIL] {}: {e}", file_label(&cli.input));
        process::exit(1);
    }

    eprintln!("[OK] {} -> {}", file_label(&cli.input), output.display());
}

fn run(
    input: &Path,
    output: &Path,
    font: &str,
    request: &WatermarkRequest,
) -> text_watermark::Result<()> {
    request.validate()?;

    let mut session = Session::new(Compositor::with_font_name(font));
    session.upload(&std::fs::read(input)?)?;
    session.apply(request)?;

    let Some(download) = session.download()? else {
        return Err(text_watermark::Error::NoImage);
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output, download.bytes)?;
    Ok(())
}

/// Turn literal `\n` sequences typed on the command line into line breaks.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

fn file_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
