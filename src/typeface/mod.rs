//! Font selection for rendered text.
//!
//! [`FontResolver`] walks an ordered list of font candidates and loads the
//! first one that exists and parses. When none do, it returns
//! [`Typeface::Builtin`], so resolution itself never fails.

pub mod builtin;

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

/// Directory depth searched below each font directory.
const SEARCH_DEPTH: usize = 4;

pub enum Typeface {
    TrueType { name: String, font: FontVec },
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Typeface {
    pub fn name(&self) -> &str {
        match self {
            Typeface::TrueType { name, .. } => name,
            Typeface::Builtin => "builtin",
        }
    }

    /// Width and height of `text` rendered at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        match self {
            Typeface::TrueType { font, .. } => text_size(PxScale::from(px), font, text),
            Typeface::Builtin => builtin::measure(text, px),
        }
    }

    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        x: i32,
        y: i32,
        px: f32,
        text: &str,
    ) {
        match self {
            Typeface::TrueType { font, .. } => {
                draw_text_mut(canvas, color, x, y, PxScale::from(px), font, text)
            }
            Typeface::Builtin => builtin::draw(canvas, color, x, y, px, text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FontResolver {
    candidates: Vec<String>,
    search_dirs: Vec<PathBuf>,
}

impl FontResolver {
    /// `candidates` are file names (searched for in `extra_dirs` and the
    /// platform font directories) or absolute paths, in preference order.
    pub fn new(candidates: Vec<String>, extra_dirs: Vec<PathBuf>) -> Self {
        let mut search_dirs = vec![PathBuf::from(".")];
        search_dirs.extend(extra_dirs);
        search_dirs.extend(default_font_dirs());
        Self {
            candidates,
            search_dirs,
        }
    }

    /// Resolver that only looks in `dirs`, for tests and sandboxed setups.
    pub fn with_dirs(candidates: Vec<String>, dirs: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            search_dirs: dirs,
        }
    }

    pub fn resolve(&self) -> Typeface {
        for candidate in &self.candidates {
            let Some(path) = self.locate(candidate) else {
                tracing::debug!(font = %candidate, "Font not installed");
                continue;
            };

            match fs::read(&path).map(FontVec::try_from_vec) {
                Ok(Ok(font)) => {
                    tracing::debug!(path = %path.display(), "Loaded font");
                    return Typeface::TrueType {
                        name: candidate.clone(),
                        font,
                    };
                }
                Ok(Err(e)) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unreadable font file")
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Cannot open font"),
            }
        }

        tracing::info!("No TrueType font found, using builtin bitmap font");
        Typeface::Builtin
    }

    fn locate(&self, candidate: &str) -> Option<PathBuf> {
        let path = Path::new(candidate);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }

        self.search_dirs
            .iter()
            .find_map(|dir| find_file(dir, candidate, SEARCH_DEPTH))
    }
}

fn find_file(dir: &Path, file_name: &str, depth: usize) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.eq_ignore_ascii_case(file_name))
        {
            return Some(path);
        }
    }

    if depth == 0 {
        return None;
    }
    subdirs
        .iter()
        .find_map(|sub| find_file(sub, file_name, depth - 1))
}

fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(user) = dirs::font_dir() {
        dirs.push(user);
    }
    dirs.extend(
        [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ]
        .into_iter()
        .map(PathBuf::from),
    );
    dirs
}
