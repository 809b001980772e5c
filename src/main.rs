//! `sid-filter-curve` - dump an expanded cutoff curve as CSV
//!
//! Writes one `code,frequency_hz,w0` row per FC code so the table can be
//! compared against reference output.

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process;

use sid_filter::filter::coefficients::angular_cutoff;
use sid_filter::{ChipModel, Filter, FilterSettings, SidFilterError};

const USAGE: &str = "Usage:\n  sid-filter-curve [--chip <6581|8580>] [--curve <settings.json>] [--output <file.csv>]\n\nFlags:\n  --chip <model>       Chip model (default 6581)\n  --curve <file>       Load chip model and cutoff curve from JSON settings\n  --output <file>      Write CSV to a file instead of stdout\n  -h, --help           Show this help\n";

struct Args {
    chip: Option<ChipModel>,
    settings_path: Option<String>,
    output_path: Option<String>,
}

fn parse_args() -> sid_filter::Result<Option<Args>> {
    let mut parsed = Args {
        chip: None,
        settings_path: None,
        output_path: None,
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--chip" => {
                let value = args.next().ok_or_else(|| {
                    SidFilterError::ConfigError("--chip requires an argument (6581|8580)".into())
                })?;
                parsed.chip = Some(value.parse()?);
            }
            _ if arg.starts_with("--chip=") => {
                parsed.chip = Some(arg["--chip=".len()..].parse()?);
            }
            "--curve" => {
                parsed.settings_path = Some(args.next().ok_or_else(|| {
                    SidFilterError::ConfigError("--curve requires a file".into())
                })?);
            }
            "--output" | "-o" => {
                parsed.output_path = Some(args.next().ok_or_else(|| {
                    SidFilterError::ConfigError("--output requires a file".into())
                })?);
            }
            _ => {
                return Err(SidFilterError::ConfigError(format!(
                    "unknown argument: {arg}"
                )));
            }
        }
    }

    Ok(Some(parsed))
}

fn write_curve<W: Write>(filter: &Filter, out: W) -> sid_filter::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["code", "frequency_hz", "w0"])?;
    for (code, &f0) in filter.cutoff_table().as_slice().iter().enumerate() {
        writer.write_record(&[
            code.to_string(),
            f0.to_string(),
            angular_cutoff(f64::from(f0)).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn run() -> sid_filter::Result<()> {
    let Some(args) = parse_args()? else {
        eprint!("{USAGE}");
        return Ok(());
    };

    let mut settings = match &args.settings_path {
        Some(path) => FilterSettings::load(path)?,
        None => FilterSettings::default(),
    };
    if let Some(chip) = args.chip {
        settings.chip_model = chip;
    }

    let filter = Filter::from_settings(&settings)?;
    eprintln!(
        "{}: {} control points, jumps at {:?}",
        filter.chip_model(),
        filter.cutoff_curve().len(),
        filter.cutoff_curve().discontinuities()
    );

    match &args.output_path {
        Some(path) => write_curve(&filter, File::create(path)?),
        None => write_curve(&filter, io::stdout().lock()),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}\n");
        eprint!("{USAGE}");
        process::exit(1);
    }
}
