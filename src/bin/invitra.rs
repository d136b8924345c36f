use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "invitra", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every template in a catalog manifest.
    Validate(ValidateArgs),
    /// Render one side of a template as a PNG.
    Side(SideArgs),
    /// Render both sides and write the final mockup composite as a PNG.
    Mockup(MockupArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,
}

#[derive(Parser, Debug)]
struct SideArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Template id within the manifest.
    #[arg(long)]
    template: String,

    /// Values JSON (an object of key → string). Defaults to template
    /// defaults only.
    #[arg(long)]
    values: Option<PathBuf>,

    /// Which side to render.
    #[arg(long, default_value = "front")]
    side: invitra::Side,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory of ttf/otf/ttc files to register before rendering.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MockupArgs {
    /// Input manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Template id within the manifest.
    #[arg(long)]
    template: String,

    /// Values JSON (an object of key → string).
    #[arg(long)]
    values: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory of ttf/otf/ttc files to register before rendering.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Side(args) => cmd_side(args),
        Command::Mockup(args) => cmd_mockup(args),
    }
}

fn read_manifest(path: &Path) -> anyhow::Result<invitra::Manifest> {
    let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
    let r = BufReader::new(f);
    let manifest: invitra::Manifest =
        serde_json::from_reader(r).with_context(|| "parse manifest JSON")?;
    Ok(manifest)
}

fn read_values(path: Option<&Path>) -> anyhow::Result<invitra::ValueStore> {
    let Some(path) = path else {
        return Ok(invitra::ValueStore::new());
    };
    let f = File::open(path).with_context(|| format!("open values '{}'", path.display()))?;
    let values: invitra::ValueStore =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse values JSON")?;
    Ok(values)
}

fn make_shaper(fonts_dir: Option<&Path>) -> invitra::TextShaper {
    let mut shaper = invitra::TextShaper::new();
    if let Some(dir) = fonts_dir {
        let n = shaper.load_fonts_from_dir(dir);
        eprintln!("registered {n} font files from {}", dir.display());
    }
    shaper
}

fn assets_root(manifest_path: &Path) -> &Path {
    manifest_path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let manifest = read_manifest(&args.manifest)?;
    manifest.validate()?;
    eprintln!(
        "{}: {} templates ok",
        args.manifest.display(),
        manifest.templates.len()
    );
    Ok(())
}

fn cmd_side(args: SideArgs) -> anyhow::Result<()> {
    let manifest = read_manifest(&args.manifest)?;
    manifest.validate()?;
    let template = manifest.template(&args.template)?.clone();

    let mut values = read_values(args.values.as_deref())?;
    values.seed_defaults(&template);

    let loader = invitra::FsImageLoader::new(assets_root(&args.manifest));
    let mut shaper = make_shaper(args.fonts_dir.as_deref());

    let mut surface = invitra::Surface::from_size(template.size)?;
    let gate = invitra::RenderGate::new();
    let ticket = gate.begin();
    invitra::SideRenderer::new(&loader, &mut shaper).render(
        &mut surface,
        &template,
        &values.snapshot(),
        args.side,
        &ticket,
    )?;

    write_png(&surface, &args.out)
}

fn cmd_mockup(args: MockupArgs) -> anyhow::Result<()> {
    let manifest = read_manifest(&args.manifest)?;
    manifest.validate()?;
    let template = manifest.template(&args.template)?.clone();
    let single_sided = template.is_single_sided();

    let loader = invitra::FsImageLoader::new(assets_root(&args.manifest));
    let shaper = make_shaper(args.fonts_dir.as_deref());
    let mut session = invitra::EditorSession::with_shaper(template, Box::new(loader), shaper)?;

    let values = read_values(args.values.as_deref())?;
    for (key, value) in values.iter() {
        session.set_value(key, value)?;
    }

    if !single_sided {
        session.approve_front()?;
        session.approve_back()?;
    }
    let composite = session.finish()?;
    write_png(composite, &args.out)
}

fn write_png(surface: &invitra::Surface, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        out,
        &surface.to_unpremultiplied_rgba8(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}
