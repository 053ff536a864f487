use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use beamkit::{init_logging, EngraveJob};

fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut numbered = false;
    let mut paths: Vec<&str> = Vec::new();
    for arg in &args {
        match arg.as_str() {
            "--numbered" => numbered = true,
            "--version" => {
                println!("beamkit {} ({})", beamkit::VERSION, beamkit::BUILD_DATE);
                return Ok(());
            }
            other => paths.push(other),
        }
    }

    let (input, output) = match paths.as_slice() {
        [input] => {
            let input = PathBuf::from(*input);
            let output = input.with_extension("nc");
            (input, output)
        }
        [input, output] => (PathBuf::from(*input), PathBuf::from(*output)),
        _ => bail!("usage: beamkit <job.json> [output.nc] [--numbered] [--version]"),
    };

    let text = fs::read_to_string(&input)
        .with_context(|| format!("failed to read job file {}", input.display()))?;
    let job: EngraveJob = serde_json::from_str(&text)
        .with_context(|| format!("invalid job description in {}", input.display()))?;

    let gcode = job.generate()?;

    let output = if numbered {
        next_numbered_path(&output)?
    } else {
        output
    };
    fs::write(&output, gcode)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!("program written to {}", output.display());
    println!("{}", output.display());
    Ok(())
}

/// Pick `stem_NNNN.ext` one past the highest suffix already present in the
/// output directory, starting at `_0001`.
fn next_numbered_path(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("output filename is not valid UTF-8")?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("nc");

    let pattern = regex::Regex::new(&format!(
        "^{}_(\\d+)\\.{}$",
        regex::escape(stem),
        regex::escape(ext)
    ))?;

    let mut max_num = 0u32;
    if dir.exists() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if let Some(caps) = pattern.captures(name) {
                    if let Ok(num) = caps[1].parse::<u32>() {
                        max_num = max_num.max(num);
                    }
                }
            }
        }
    }

    Ok(dir.join(format!("{}_{:04}.{}", stem, max_num + 1, ext)))
}
