use anyhow::{bail, Context, Result};
use bytes::Bytes;
use crowdcam::api::{ApiClient, Record};
use crowdcam::insights::{bucket_chart, usage_slices};
use crowdcam::media::{format_count, truncate_url, MediaKind};
use crowdcam::CrowdcamConfig;
use std::env;
use std::path::Path;

const USAGE: &str = "Usage: crowdcam-cli [--config <path>] [--json] <command> [args]

Commands:
  models                          list counting models
  archive                         list stored records
  record <id>                     show one record
  upload <path>                   upload an image or video
  count <media_id> <model_id>     count a stored media item
  insights                        model usage and count distribution
  devices                         list cameras (native feature)
  capture [device_id]             capture a photo and upload it (native feature)";

struct Options {
    config: Option<String>,
    json: bool,
    args: Vec<String>,
}

fn parse_options(raw: Vec<String>) -> Result<Options> {
    let mut options = Options {
        config: None,
        json: false,
        args: Vec::new(),
    };
    let mut iter = raw.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--config" => {
                options.config = Some(iter.next().context("--config requires a path")?);
            }
            _ => options.args.push(arg),
        }
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    crowdcam::init_logging();

    let options = parse_options(env::args().collect())?;
    let Some(command) = options.args.first().cloned() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    let config = match &options.config {
        Some(path) => CrowdcamConfig::load_from_file(path)?,
        None => CrowdcamConfig::load_or_default(),
    };
    let api = ApiClient::new(&config.api)?;

    match command.as_str() {
        "models" => cmd_models(&api, &options).await,
        "archive" => cmd_archive(&api, &options).await,
        "record" => cmd_record(&api, &options).await,
        "upload" => cmd_upload(&api, &options).await,
        "count" => cmd_count(&api, &options).await,
        "insights" => cmd_insights(&api, &options).await,
        "devices" => cmd_devices(&options).await,
        "capture" => cmd_capture(&api, &config, &options).await,
        _ => {
            eprintln!("Unknown command: {}\n\n{}", command, USAGE);
            std::process::exit(1);
        }
    }
}

fn arg<'a>(options: &'a Options, index: usize, name: &str) -> Result<&'a str> {
    options
        .args
        .get(index)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{}>\n\n{}", name, USAGE))
}

fn print_record(record: &Record) {
    let kind = MediaKind::from_url(&record.original_url);
    println!(
        "{:>6}  {:<7}  {:<32}  {:<12}  {}",
        record.id,
        kind.as_str(),
        truncate_url(&record.original_url),
        record.model_name.as_deref().unwrap_or("-"),
        format_count(record.average_count_per_frame),
    );
}

async fn cmd_models(api: &ApiClient, options: &Options) -> Result<()> {
    let models = api.models_or_empty().await;
    if options.json {
        println!("{}", serde_json::to_string(&models)?);
    } else {
        for m in models {
            println!("{}: {}", m.id, m.name);
        }
    }
    Ok(())
}

async fn cmd_archive(api: &ApiClient, options: &Options) -> Result<()> {
    let records = api.archive_or_empty().await;
    if options.json {
        println!("{}", serde_json::to_string(&records)?);
    } else {
        for record in &records {
            print_record(record);
        }
    }
    Ok(())
}

async fn cmd_record(api: &ApiClient, options: &Options) -> Result<()> {
    let id: i64 = arg(options, 1, "id")?.parse()?;
    match api.record_or_none(id).await {
        Some(record) if options.json => println!("{}", serde_json::to_string(&record)?),
        Some(record) => {
            print_record(&record);
            if let Some(annotated) = record.annotated_url.as_deref() {
                println!("annotated: {}", annotated);
            }
        }
        None => println!("Record {} not found", id),
    }
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "webm" => "video/webm",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

async fn cmd_upload(api: &ApiClient, options: &Options) -> Result<()> {
    let path = Path::new(arg(options, 1, "path")?);
    if MediaKind::from_url(&path.to_string_lossy()) == MediaKind::Unknown {
        bail!("{} is neither an image nor a video", path.display());
    }
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("path has no file name")?;

    let response = api
        .upload_file(file_name, mime_for(path), Bytes::from(data))
        .await?;
    if options.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Uploaded as {}: {}", response.id, response.url);
    }
    Ok(())
}

async fn cmd_count(api: &ApiClient, options: &Options) -> Result<()> {
    let media_id: i64 = arg(options, 1, "media_id")?.parse()?;
    let model_id: i64 = arg(options, 2, "model_id")?.parse()?;
    let response = api.count(media_id, model_id).await?;
    if options.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Counted {}: {}", response.id, response.url);
    }
    Ok(())
}

async fn cmd_insights(api: &ApiClient, options: &Options) -> Result<()> {
    let Some(insights) = api.insights_or_none().await else {
        println!("No insights available");
        return Ok(());
    };
    if options.json {
        println!("{}", serde_json::to_string(&insights)?);
        return Ok(());
    }

    println!("Model usage:");
    for slice in usage_slices(&insights) {
        println!("  {:<16} {}", slice.label, slice.value);
    }
    let chart = bucket_chart(&insights);
    println!("Count distribution:");
    for series in chart.series {
        let cells: Vec<String> = chart
            .x_axis
            .iter()
            .zip(series.data)
            .map(|(model, value)| format!("{}={}", model, value))
            .collect();
        println!("  {:<16} {}", series.label, cells.join(" "));
    }
    Ok(())
}

#[cfg(feature = "native")]
async fn cmd_devices(options: &Options) -> Result<()> {
    use crowdcam::DeviceProvider;

    let devices = crowdcam::NativeProvider::new().list_devices().await?;
    if options.json {
        println!("{}", serde_json::to_string(&devices)?);
    } else {
        for d in devices {
            println!("{}: {}", d.id, d.display_name());
        }
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
async fn cmd_devices(_options: &Options) -> Result<()> {
    bail!("camera access requires building with the `native` feature")
}

#[cfg(feature = "native")]
async fn cmd_capture(api: &ApiClient, config: &CrowdcamConfig, options: &Options) -> Result<()> {
    use crowdcam::{CaptureMode, CaptureSession};
    use std::sync::Arc;

    let session = CaptureSession::with_config(
        Arc::new(crowdcam::NativeProvider::new()),
        config.capture.clone(),
    );
    if let Some(device) = options.args.get(1) {
        session.select_device(Some(device.clone())).await?;
    }

    session.start_capture(CaptureMode::Photo).await?;
    let artifact = session.capture_photo()?;
    println!("Captured {} ({} bytes)", artifact.file_name, artifact.size_bytes());

    let response = session.submit(api).await?;
    if options.json {
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Uploaded as {}: {}", response.id, response.url);
    }
    Ok(())
}

#[cfg(not(feature = "native"))]
async fn cmd_capture(_api: &ApiClient, _config: &CrowdcamConfig, _options: &Options) -> Result<()> {
    bail!("camera access requires building with the `native` feature")
}
