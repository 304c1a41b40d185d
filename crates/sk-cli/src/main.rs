//! sketchkit: command-line access to Sketchkit projects.
//!
//! Projects live as JSON files in a store directory (see [`store`]). The
//! CLI can create a project, add elements and images, list layers, and
//! export the deterministic HTML/CSS output as loose files or a zip bundle.

mod store;

use anyhow::{Context, Result, bail};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use sk_core::bundle::write_bundle;
use sk_core::document::{ProjectGateway, SceneDocument};
use sk_core::emitter::{self, image_assets};
use sk_core::layers::LayerList;
use sk_core::media::{decode_upload, media_bytes};
use sk_core::model::{CanvasSize, ElementKind, Scene};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use store::FileGateway;

/// Sketchkit project tool
#[derive(Parser)]
#[command(name = "sketchkit", version)]
#[command(about = "Create, inspect, and export Sketchkit projects", long_about = None)]
struct Cli {
    /// Project store directory
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project
    New {
        project: String,
        #[arg(long, default_value_t = 800.0)]
        width: f32,
        #[arg(long, default_value_t = 600.0)]
        height: f32,
        /// Replace an existing project
        #[arg(long)]
        force: bool,
    },

    /// Add an element from the palette
    Add {
        project: String,
        /// block, button, paragraph, line, arrow, or ellipse
        kind: String,
        /// Left edge; centered on the canvas when omitted
        #[arg(long, requires = "y", allow_hyphen_values = true)]
        x: Option<f32>,
        /// Top edge; centered on the canvas when omitted
        #[arg(long, requires = "x", allow_hyphen_values = true)]
        y: Option<f32>,
        /// Display name in the layer list
        #[arg(long)]
        name: Option<String>,
    },

    /// Add an image element from a JPEG, PNG, or GIF file
    Image {
        project: String,
        file: PathBuf,
        /// Override the natural width
        #[arg(long)]
        width: Option<f32>,
        /// Override the natural height
        #[arg(long)]
        height: Option<f32>,
    },

    /// Remove an element by id
    Remove { project: String, id: String },

    /// Print the layer list
    Layers { project: String },

    /// Export `index.html`, `styles.css`, and `images/`
    Export {
        project: String,
        /// Output directory, or zip file with --bundle
        #[arg(long)]
        out: PathBuf,
        /// Write a single zip archive instead of loose files
        #[arg(long)]
        bundle: bool,
        /// Footer year; defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print a self-contained preview document
    Preview {
        project: String,
        #[arg(long)]
        year: Option<i32>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let mut gw = FileGateway::new(&cli.dir);

    match cli.command {
        Commands::New {
            project,
            width,
            height,
            force,
        } => {
            if gw.exists(&project) && !force {
                bail!("project `{project}` already exists (use --force to replace)");
            }
            let doc = SceneDocument {
                elements: Vec::new(),
                canvas_size: CanvasSize { width, height },
            };
            gw.save(&project, &doc)?;
            writeln!(out, "{}", gw.path(&project)?.display())?;
        }

        Commands::Add {
            project,
            kind,
            x,
            y,
            name,
        } => {
            let kind: ElementKind = kind.parse()?;
            if kind == ElementKind::Image {
                bail!("image elements are added with `sketchkit image`");
            }
            let mut scene = load(&mut gw, &project)?;
            let id = scene.create_element(kind, x.zip(y));
            if let Some(name) = name {
                scene.rename(id, &name);
            }
            gw.save(&project, &SceneDocument::capture(&scene))?;
            writeln!(out, "{id}")?;
        }

        Commands::Image {
            project,
            file,
            width,
            height,
        } => {
            let bytes =
                fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            let media = decode_upload(&file_name, mime_for(&file), &bytes)?;
            let w = width.unwrap_or(media.natural_width as f32);
            let h = height.unwrap_or(media.natural_height as f32);

            let mut scene = load(&mut gw, &project)?;
            let id = scene.create_image(media, w, h, None);
            gw.save(&project, &SceneDocument::capture(&scene))?;
            writeln!(out, "{id}")?;
        }

        Commands::Remove { project, id } => {
            let mut scene = load(&mut gw, &project)?;
            let id = sk_core::ElementId::intern(&id);
            if scene.remove(id).is_none() {
                bail!("no element `{id}` in project `{project}`");
            }
            gw.save(&project, &SceneDocument::capture(&scene))?;
        }

        Commands::Layers { project } => {
            let scene = load(&mut gw, &project)?;
            let mut layers = LayerList::new();
            layers.sync(&scene);
            for entry in layers.entries() {
                writeln!(out, "{} {:<24} {}", entry.icon, entry.name, entry.id)?;
            }
        }

        Commands::Export {
            project,
            out: dest,
            bundle,
            year,
        } => {
            let scene = load(&mut gw, &project)?;
            let year = year.unwrap_or_else(current_year);
            if bundle {
                let file = fs::File::create(&dest)
                    .with_context(|| format!("creating {}", dest.display()))?;
                write_bundle(&scene, year, file)?;
            } else {
                export_files(&scene, year, &dest)?;
            }
            writeln!(out, "{}", dest.display())?;
        }

        Commands::Preview { project, year } => {
            let scene = load(&mut gw, &project)?;
            let html = emitter::emit_preview(&scene, year.unwrap_or_else(current_year));
            out.write_all(html.as_bytes())?;
        }
    }
    Ok(())
}

fn load(gw: &mut FileGateway, project: &str) -> Result<Scene> {
    let doc = gw
        .load(project)
        .with_context(|| format!("loading project from {}", gw.dir().display()))?;
    Ok(doc.into_scene())
}

/// Write the export as loose files under `dest`.
fn export_files(scene: &Scene, year: i32, dest: &Path) -> Result<()> {
    let export = emitter::export(scene, year);
    fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    fs::write(dest.join("index.html"), export.markup)?;
    fs::write(dest.join("styles.css"), export.stylesheet)?;

    let assets = image_assets(scene);
    if !assets.is_empty() {
        fs::create_dir_all(dest.join("images"))?;
    }
    for asset in assets {
        fs::write(dest.join(&asset.path), media_bytes(asset.media)?)?;
    }
    Ok(())
}

/// MIME type from the file extension; the decoder still checks the bytes.
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}
