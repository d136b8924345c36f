use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{InvitraError, InvitraResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl LoadedImage {
    /// Uniform-color image. Handy for placeholder backgrounds and fixtures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        let px = [premul(r, a), premul(g, a), premul(b, a), a];
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px.repeat(width as usize * height as usize)),
        }
    }
}

/// Decode encoded image bytes (any format the `image` crate understands) and
/// convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> InvitraResult<LoadedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| InvitraError::load(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(LoadedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = premul(px[0], a);
        px[1] = premul(px[1], a);
        px[2] = premul(px[2], a);
    }
}

fn premul(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

/// The external image-loading collaborator: given a reference, produce a
/// decoded raster of known pixel dimensions.
///
/// References are opaque to the core; the two shipped loaders resolve
/// root-relative paths and `data:` URIs.
pub trait ImageLoader {
    fn load(&self, reference: &str) -> InvitraResult<LoadedImage>;
}

/// Normalize a root-relative image reference.
///
/// Uses `/` separators, drops `.` segments, and rejects absolute paths and
/// parent traversals.
pub fn normalize_rel_path(reference: &str) -> InvitraResult<String> {
    let s = reference.replace('\\', "/");
    if s.starts_with('/') {
        return Err(InvitraError::load("image references must be relative"));
    }
    if s.is_empty() {
        return Err(InvitraError::load("image reference must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(InvitraError::load("image references must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(InvitraError::load("image reference must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Filesystem-backed loader rooted at a directory (typically the manifest's
/// parent). Also resolves `data:image/...;base64,` references, the form
/// user-uploaded custom backgrounds arrive in. Decoded images are cached per
/// reference.
pub struct FsImageLoader {
    root: PathBuf,
    cache: Mutex<HashMap<String, LoadedImage>>,
}

impl FsImageLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_uncached(&self, reference: &str) -> InvitraResult<LoadedImage> {
        if reference.starts_with("data:") {
            return decode_data_uri(reference);
        }

        let norm = normalize_rel_path(reference)?;
        let path = self.root.join(Path::new(&norm));
        tracing::debug!(path = %path.display(), "loading image");
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image from '{}'", path.display()))
            .map_err(|e| InvitraError::load(format!("{e:#}")))?;
        decode_image(&bytes)
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, reference: &str) -> InvitraResult<LoadedImage> {
        if let Ok(cache) = self.cache.lock()
            && let Some(hit) = cache.get(reference)
        {
            return Ok(hit.clone());
        }
        let img = self.load_uncached(reference)?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(reference.to_string(), img.clone());
        }
        Ok(img)
    }
}

fn decode_data_uri(uri: &str) -> InvitraResult<LoadedImage> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| InvitraError::load("malformed data URI (no comma)"))?;
    if !header.ends_with(";base64") {
        return Err(InvitraError::load("only base64 data URIs are supported"));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| InvitraError::load(format!("decode data URI payload: {e}")))?;
    decode_image(&bytes)
}

/// Preloaded in-memory loader for tests and embedded fixtures.
#[derive(Default)]
pub struct MemoryImageLoader {
    map: HashMap<String, LoadedImage>,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: LoadedImage) {
        self.map.insert(reference.into(), image);
    }

    pub fn insert_bytes(&mut self, reference: impl Into<String>, bytes: &[u8]) -> InvitraResult<()> {
        self.map.insert(reference.into(), decode_image(bytes)?);
        Ok(())
    }
}

impl ImageLoader for MemoryImageLoader {
    fn load(&self, reference: &str) -> InvitraResult<LoadedImage> {
        self.map
            .get(reference)
            .cloned()
            .ok_or_else(|| InvitraError::load(format!("unknown image reference '{reference}'")))
    }
}
