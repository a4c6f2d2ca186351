use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use crate::assets::decode::{DecodeLimits, DecodedImage, decode_image};
use crate::encode::jpeg::{DEFAULT_JPEG_QUALITY, EncodedCollage, encode_jpeg};
use crate::foundation::error::{CollageError, CollageResult};
use crate::layout::justified::{aspect_ratios, layout_justified};
use crate::render::caption::CaptionStyle;
use crate::render::cpu::render_collage;
use crate::scene::item::{CollageOptions, ImageSourceItem};
use crate::theme::TagExtractor;

/// Options for a [`CollageBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOpts {
    /// Decode worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Per-item decode caps.
    pub limits: DecodeLimits,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for BuildOpts {
    fn default() -> Self {
        Self {
            threads: None,
            limits: DecodeLimits::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Generation marker handed out by [`CollageBuilder::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildTicket {
    generation: u64,
}

impl BuildTicket {
    /// Monotonically increasing build number, starting at 1.
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// A collage accepted as the current result.
#[derive(Clone, Debug)]
pub struct PublishedCollage {
    /// Generation of the build that produced it.
    pub generation: u64,
    /// Encoded output.
    pub collage: EncodedCollage,
}

/// What happened to a finished build.
#[derive(Clone, Debug)]
pub enum BuildOutcome {
    /// The build was the newest one and its result is now current.
    Published(Arc<PublishedCollage>),
    /// A newer build started meanwhile; this result was discarded.
    Superseded {
        /// Generation of the discarded build.
        generation: u64,
        /// Newest generation at the time of discarding.
        latest: u64,
    },
}

impl BuildOutcome {
    /// The published collage, if any.
    pub fn published(&self) -> Option<&Arc<PublishedCollage>> {
        match self {
            Self::Published(p) => Some(p),
            Self::Superseded { .. } => None,
        }
    }
}

/// Decode all items concurrently; the first failure fails the whole batch.
///
/// Already-decoded bitmaps are dropped when a sibling fails. Results keep item order.
#[tracing::instrument(skip_all, fields(n = items.len()))]
pub fn decode_all(
    items: &[ImageSourceItem],
    limits: DecodeLimits,
) -> CollageResult<Vec<DecodedImage>> {
    items
        .par_iter()
        .enumerate()
        .map(|(i, item)| decode_image(&item.bytes, i, limits))
        .collect()
}

/// Decode, lay out, composite, and encode in one pass on the current rayon pool.
#[tracing::instrument(skip_all, fields(n = items.len(), width = options.width))]
pub fn build_collage(
    items: &[ImageSourceItem],
    options: &CollageOptions,
    style: &CaptionStyle,
    opts: &BuildOpts,
) -> CollageResult<EncodedCollage> {
    options.validate()?;
    if items.is_empty() {
        return Err(CollageError::validation("collage needs at least one image"));
    }
    let images = decode_all(items, opts.limits)?;
    compose(images, items, options, style, opts.jpeg_quality)
}

/// Lay out `images`, draw them with captions, and encode.
pub fn compose(
    images: Vec<DecodedImage>,
    items: &[ImageSourceItem],
    options: &CollageOptions,
    style: &CaptionStyle,
    jpeg_quality: u8,
) -> CollageResult<EncodedCollage> {
    let layout = layout_justified(&aspect_ratios(&images), options.width);
    let raster = render_collage(images, &layout, items, options, style)?;
    encode_jpeg(&raster, jpeg_quality)
}

/// Runs builds and publishes only the newest one.
///
/// Every trigger (new image set, changed options) calls [`CollageBuilder::begin`]; a build whose
/// ticket is no longer the newest when it finishes is discarded, so a slow older build can never
/// replace a newer result.
pub struct CollageBuilder {
    pool: rayon::ThreadPool,
    opts: BuildOpts,
    style: CaptionStyle,
    latest: AtomicU64,
    published: Mutex<Option<Arc<PublishedCollage>>>,
}

impl CollageBuilder {
    /// Create a builder with its own decode pool.
    pub fn new(opts: BuildOpts, style: CaptionStyle) -> CollageResult<Self> {
        Ok(Self {
            pool: build_thread_pool(opts.threads)?,
            opts,
            style,
            latest: AtomicU64::new(0),
            published: Mutex::new(None),
        })
    }

    /// Register a new build and return its ticket.
    pub fn begin(&self) -> BuildTicket {
        BuildTicket {
            generation: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Newest generation handed out so far (0 before the first build).
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Return `true` when `ticket` is still the newest build.
    pub fn is_current(&self, ticket: BuildTicket) -> bool {
        ticket.generation == self.latest_generation()
    }

    /// The most recently published collage.
    pub fn current(&self) -> Option<Arc<PublishedCollage>> {
        self.published
            .lock()
            .map(|g| g.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Start and run a build in one call.
    pub fn build(
        &self,
        items: &[ImageSourceItem],
        options: &CollageOptions,
    ) -> CollageResult<BuildOutcome> {
        let ticket = self.begin();
        self.run(ticket, items, options)
    }

    /// Run the build for `ticket`.
    ///
    /// Errors surface only for the newest build; a stale build reports
    /// [`BuildOutcome::Superseded`] whether or not it succeeded.
    #[tracing::instrument(skip(self, items, options), fields(generation = ticket.generation))]
    pub fn run(
        &self,
        ticket: BuildTicket,
        items: &[ImageSourceItem],
        options: &CollageOptions,
    ) -> CollageResult<BuildOutcome> {
        let result = self
            .pool
            .install(|| build_collage(items, options, &self.style, &self.opts));
        self.finish(ticket, result)
    }

    /// Like [`CollageBuilder::run`], but scrapes theme tags concurrently with decoding and
    /// attaches them to `items` before compositing.
    #[tracing::instrument(skip(self, items, options, extractor), fields(generation = ticket.generation))]
    pub fn run_with_extractor(
        &self,
        ticket: BuildTicket,
        items: &mut [ImageSourceItem],
        options: &CollageOptions,
        extractor: &dyn TagExtractor,
    ) -> CollageResult<BuildOutcome> {
        if let Err(e) = options.validate() {
            return self.finish(ticket, Err(e));
        }
        if items.is_empty() {
            return self.finish(
                ticket,
                Err(CollageError::validation("collage needs at least one image")),
            );
        }

        let limits = self.opts.limits;
        let shared: &[ImageSourceItem] = items;
        let (themes, decoded) = self.pool.install(|| {
            rayon::join(
                || crate::theme::extract_themes(shared, extractor),
                || decode_all(shared, limits),
            )
        });

        for (item, found) in items.iter_mut().zip(themes) {
            item.theme = found.into_iter().next();
        }

        let result = decoded.and_then(|images| {
            self.pool.install(|| {
                compose(images, items, options, &self.style, self.opts.jpeg_quality)
            })
        });
        self.finish(ticket, result)
    }

    fn finish(
        &self,
        ticket: BuildTicket,
        result: CollageResult<EncodedCollage>,
    ) -> CollageResult<BuildOutcome> {
        let mut published = self
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let latest = self.latest_generation();
        let newer_published = published
            .as_ref()
            .is_some_and(|p| p.generation > ticket.generation);
        if ticket.generation != latest || newer_published {
            tracing::warn!(
                generation = ticket.generation,
                latest,
                ok = result.is_ok(),
                "discarding superseded collage build"
            );
            return Ok(BuildOutcome::Superseded {
                generation: ticket.generation,
                latest,
            });
        }

        let collage = result?;
        let out = Arc::new(PublishedCollage {
            generation: ticket.generation,
            collage,
        });
        *published = Some(out.clone());
        Ok(BuildOutcome::Published(out))
    }
}

fn build_thread_pool(threads: Option<usize>) -> CollageResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CollageError::validation(
            "decode 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CollageError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/build.rs"]
mod tests;
