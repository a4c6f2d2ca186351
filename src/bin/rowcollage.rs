use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rowcollage::{
    BuildOpts, BuildOutcome, CaptionStyle, CollageBuilder, CollageOptions, ImageSourceItem,
    Manifest, PatternTagExtractor, extract_theme, extract_themes, looks_like_image, shuffle_items,
};

#[derive(Parser, Debug)]
#[command(name = "rowcollage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a collage described by a JSON manifest.
    Compose(ComposeArgs),
    /// Build a collage straight from image files.
    Files(FilesArgs),
    /// Print the theme tag scraped from each image as JSON.
    Themes(ThemesArgs),
}

#[derive(Parser, Debug)]
struct OutputArgs {
    /// Output JPEG path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the collage as a base64 data URL on stdout.
    #[arg(long, default_value_t = false)]
    data_url: bool,

    /// Shuffle the images with this seed before laying them out.
    #[arg(long)]
    shuffle_seed: Option<u64>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = rowcollage::DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Override decode worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct FilesArgs {
    /// Images, in collage order. Non-image files are skipped.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Collage width in pixels.
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Advisory height in pixels; the real height follows the layout.
    #[arg(long, default_value_t = 1024)]
    height: u32,

    /// Caption each image with its file name.
    #[arg(long, default_value_t = false)]
    titles: bool,

    /// Caption each image with the theme tag scraped from its bytes.
    #[arg(long, default_value_t = false)]
    themes: bool,

    /// Caption font (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct ThemesArgs {
    /// Images to scan.
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Files(args) => cmd_files(args),
        Command::Themes(args) => cmd_themes(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let manifest = Manifest::from_path(&args.in_path)?;
    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let mut items = manifest.load_items(root)?;
    if manifest.options.show_themes {
        for item in items.iter_mut().filter(|i| i.theme.is_none()) {
            item.theme = extract_theme(&item.bytes).into_iter().next();
        }
    }

    let mut style = CaptionStyle::default();
    if let Some(font) = manifest.load_font(root)? {
        style = style.with_font(font);
    }

    run_build(items, &manifest.options, style, &args.output, false)
}

fn cmd_files(args: FilesArgs) -> anyhow::Result<()> {
    let items = load_images(&args.images)?;
    let options = CollageOptions {
        width: args.width,
        height: args.height,
        show_titles: args.titles,
        show_themes: args.themes,
        ..CollageOptions::default()
    };

    let mut style = CaptionStyle::default();
    if let Some(font) = &args.font {
        let bytes =
            std::fs::read(font).with_context(|| format!("read font '{}'", font.display()))?;
        style = style.with_font(bytes);
    }

    run_build(items, &options, style, &args.output, args.themes)
}

fn cmd_themes(args: ThemesArgs) -> anyhow::Result<()> {
    let items = load_images(&args.images)?;
    let extractor = PatternTagExtractor::new()?;
    let themes = extract_themes(&items, &extractor);

    let report: BTreeMap<String, Vec<String>> = args
        .images
        .iter()
        .filter(|p| looks_like_image(p))
        .map(|p| p.display().to_string())
        .zip(themes)
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_images(paths: &[PathBuf]) -> anyhow::Result<Vec<ImageSourceItem>> {
    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        if !looks_like_image(path) {
            tracing::warn!(path = %path.display(), "skipping non-image file");
            continue;
        }
        items.push(ImageSourceItem::from_path(path)?);
    }
    if items.is_empty() {
        anyhow::bail!("no image files given");
    }
    Ok(items)
}

fn run_build(
    mut items: Vec<ImageSourceItem>,
    options: &CollageOptions,
    style: CaptionStyle,
    output: &OutputArgs,
    scrape_themes: bool,
) -> anyhow::Result<()> {
    if output.out.is_none() && !output.data_url {
        anyhow::bail!("nothing to do: pass --out and/or --data-url");
    }
    if let Some(seed) = output.shuffle_seed {
        shuffle_items(&mut items, seed);
    }

    let opts = BuildOpts {
        threads: output.threads,
        jpeg_quality: output.quality,
        ..BuildOpts::default()
    };
    let builder = CollageBuilder::new(opts, style)?;
    let ticket = builder.begin();
    let outcome = if scrape_themes {
        let extractor = PatternTagExtractor::new()?;
        builder.run_with_extractor(ticket, &mut items, options, &extractor)?
    } else {
        builder.run(ticket, &items, options)?
    };

    let BuildOutcome::Published(published) = outcome else {
        anyhow::bail!("collage build was superseded");
    };
    let collage = &published.collage;

    if let Some(out) = &output.out {
        collage.write_to(out)?;
        eprintln!(
            "wrote {} ({}x{})",
            out.display(),
            collage.width,
            collage.height
        );
    }
    if output.data_url {
        println!("{}", collage.to_data_url());
    }
    Ok(())
}
