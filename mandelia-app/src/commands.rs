//! Command-line parsing and the commands themselves.

use std::convert::Infallible;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info};

use mandelia_render::{
    ExportFormat, ExportSpec, FractaleManager, RenderBuffer, RenderError, Surface,
};

use crate::preferences::AppPreferences;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unsupported output format: {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "mandelia", version)]
#[command(about = "Mandelbrot and Julia explorer: stills, zoom animations and saved views")]
#[command(after_help = "Export settings come from preferences.json (see `mandelia prefs`).")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where a command takes its starting state from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSource {
    Default,
    Stdin,
    File(PathBuf),
}

impl FromStr for StateSource {
    type Err = Infallible;

    fn from_str(arg: &str) -> Result<Self, Self::Err> {
        Ok(match arg {
            "-" => Self::Default,
            "@stdin" => Self::Stdin,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Render a still image, or the zoom animation for a `.gif` output
    Render {
        /// Saved view (.mbc), `-` for the default view, or `@stdin`
        state: StateSource,
        /// Output file; the extension picks PNG, JPEG or GIF
        out: PathBuf,
    },
    /// Export the zoom-in animation from the top view as a GIF
    Animate {
        /// Saved view (.mbc), `-` for the default view, or `@stdin`
        state: StateSource,
        out: PathBuf,
    },
    /// Print a summary of a saved view
    Info {
        /// Saved view (.mbc), `-` for the default view, or `@stdin`
        state: StateSource,
    },
    /// Write the current preferences file and print its path
    Prefs,
}

impl Command {
    pub fn run(self, prefs: &AppPreferences) -> Result<(), CliError> {
        match self {
            Self::Render { state, out } => {
                let format = ExportFormat::from_path(&out)
                    .ok_or_else(|| CliError::UnknownFormat { path: out.clone() })?;
                let spec = ExportSpec {
                    format,
                    ..prefs.export.clone()
                };
                export(prefs, &state, &spec, &out)
            }
            Self::Animate { state, out } => {
                let spec = ExportSpec {
                    format: ExportFormat::Gif,
                    ..prefs.export.clone()
                };
                export(prefs, &state, &spec, &out)
            }
            Self::Info { state } => {
                let mut manager = manager(prefs, &state)?;
                print!("{}", describe(&mut manager));
                Ok(())
            }
            Self::Prefs => {
                let path = prefs.save()?;
                println!("{}", path.display());
                Ok(())
            }
        }
    }
}

/// Build a manager from preferences and load the starting state.
fn manager(prefs: &AppPreferences, state: &StateSource) -> Result<FractaleManager, CliError> {
    let mut manager = FractaleManager::with_coloration(
        prefs.window_width,
        prefs.window_height,
        prefs.coloration,
    )?;
    manager.set_iterations(prefs.default_max_iterations)?;
    match state {
        StateSource::Default => debug!("Starting from the default view"),
        StateSource::Stdin => {
            let mut data = Vec::with_capacity(FractaleManager::save_size());
            io::stdin().read_to_end(&mut data)?;
            manager.from_bytes(&data)?;
        }
        StateSource::File(path) => manager.load(path)?,
    }
    Ok(manager)
}

fn export(
    prefs: &AppPreferences,
    state: &StateSource,
    spec: &ExportSpec,
    out: &Path,
) -> Result<(), CliError> {
    let mut manager = manager(prefs, state)?;
    let mut next_report = 0.0;
    let summary = manager.export(spec, out, |progress, _: &RenderBuffer| {
        if progress >= next_report {
            info!("Export {:>3.0}%", progress * 100.0);
            next_report = progress + 0.1;
        }
        ControlFlow::Continue(())
    })?;
    info!(
        format = ?summary.format,
        frames = summary.frames,
        path = %out.display(),
        "Export complete"
    );
    Ok(())
}

/// Human-readable summary of the manager state.
pub fn describe(manager: &mut FractaleManager) -> String {
    let first = manager.first();
    let viewport = *first.viewport();
    let mut out = format!(
        "first:       {}\n\
         size:        {}x{}\n\
         top left:    {}\n\
         bottom right:{}\n\
         iterations:  {}\n\
         pixel size:  {:e}\n\
         centre:      {} {}i\n\
         julia c:     {}\n",
        first.kind(),
        viewport.width,
        viewport.height,
        viewport.top_left,
        viewport.bottom_right,
        first.iterations(),
        first.pixel_size(),
        manager.real(),
        manager.imaginary(),
        manager.julia().c(),
    );
    let (r, g, b) = manager.rgb();
    out.push_str(&format!("coloration:  {r} {g} {b}\n"));
    out.push_str(&format!(
        "iterations/pixel: {:.2}\n",
        manager.iter_pixel()
    ));
    out
}
