//! Font lookup for the overlay text.
//!
//! Resolution order: the system font catalog (preferred families, best
//! first), then configured and well-known font files, then the face bundled
//! with egui. The face is loaded once per process; handles are memoized per
//! pixel size.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use ab_glyph::{FontArc, FontVec};
use eframe::egui;
use kage_core::ResourceError;

/// System font catalog queried by family name.
pub trait FontCatalog: Send + Sync {
    fn name(&self) -> &str;

    fn is_available(&self) -> bool;

    /// Path of a font file for `family`, if the catalog knows one.
    fn lookup(&self, family: &str) -> Option<PathBuf>;
}

/// fontconfig, through the `fc-list` tool.
pub struct FontConfigCatalog {
    available: bool,
}

impl FontConfigCatalog {
    pub fn detect() -> Self {
        let available = Command::new("fc-list")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);

        if !available {
            tracing::debug!("fc-list not found, skipping font catalog");
        }
        Self { available }
    }
}

impl FontCatalog for FontConfigCatalog {
    fn name(&self) -> &str {
        "fontconfig"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn lookup(&self, family: &str) -> Option<PathBuf> {
        if !self.available {
            return None;
        }

        let output = Command::new("fc-list")
            .arg("--format=%{file}\n")
            .arg(family)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from)
    }
}

/// Catalog that never answers.
pub struct NoCatalog;

impl FontCatalog for NoCatalog {
    fn name(&self) -> &str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn lookup(&self, _family: &str) -> Option<PathBuf> {
        None
    }
}

pub fn well_known_font_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(windows) {
        &[
            r"C:\Windows\Fonts\meiryo.ttc",
            r"C:\Windows\Fonts\YuGothM.ttc",
            r"C:\Windows\Fonts\msgothic.ttc",
            r"C:\Windows\Fonts\arial.ttf",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/ヒラギノ角ゴシック W3.ttc",
            "/System/Library/Fonts/Hiragino Sans GB.ttc",
            "/Library/Fonts/Arial Unicode.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// Where the resolved face came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontOrigin {
    Catalog(PathBuf),
    File(PathBuf),
    Builtin,
    /// Nothing loaded; text is skipped and boxes still drawn
    Unavailable,
}

impl fmt::Display for FontOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontOrigin::Catalog(path) => write!(f, "catalog {}", path.display()),
            FontOrigin::File(path) => write!(f, "file {}", path.display()),
            FontOrigin::Builtin => f.write_str("built-in"),
            FontOrigin::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[derive(Clone)]
pub struct FontHandle {
    face: Option<FontArc>,
    size_px: f32,
    origin: FontOrigin,
}

impl FontHandle {
    pub fn face(&self) -> Option<&FontArc> {
        self.face.as_ref()
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("size_px", &self.size_px)
            .field("origin", &self.origin)
            .finish()
    }
}

pub fn load_font_file(path: &Path) -> Result<FontArc, ResourceError> {
    let bytes = fs::read(path).map_err(|e| ResourceError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let face = FontVec::try_from_vec(bytes).map_err(|e| ResourceError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(FontArc::new(face))
}

/// Raw bytes of egui's default proportional face.
pub fn builtin_font_bytes() -> Option<(Vec<u8>, u32)> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let font_name = family.first()?;
    let data = definitions.font_data.get(font_name)?;
    Some((data.font.to_vec(), data.index))
}

pub fn builtin_font() -> Result<FontArc, ResourceError> {
    let (bytes, index) = builtin_font_bytes()
        .ok_or_else(|| ResourceError::BuiltinFont("no proportional font bundled".to_string()))?;
    FontVec::try_from_vec_and_index(bytes, index)
        .map(FontArc::new)
        .map_err(|e| ResourceError::BuiltinFont(e.to_string()))
}

pub struct FontResolver {
    catalog: Arc<dyn FontCatalog>,
    families: Vec<String>,
    paths: Vec<PathBuf>,
    face: OnceLock<(Option<FontArc>, FontOrigin)>,
    handles: Mutex<HashMap<u32, FontHandle>>,
}

impl FontResolver {
    /// `extra_paths` are tried before the platform's well-known paths.
    pub fn new(
        catalog: Arc<dyn FontCatalog>,
        families: Vec<String>,
        extra_paths: Vec<PathBuf>,
    ) -> Self {
        let mut paths = extra_paths;
        paths.extend(well_known_font_paths());
        Self::with_paths(catalog, families, paths)
    }

    /// Like [`FontResolver::new`] but probes exactly `paths`.
    pub fn with_paths(
        catalog: Arc<dyn FontCatalog>,
        families: Vec<String>,
        paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            families,
            paths,
            face: OnceLock::new(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, size_px: f32) -> FontHandle {
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles
            .entry(size_px.to_bits())
            .or_insert_with(|| {
                let (face, origin) = self.face.get_or_init(|| self.load_face());
                FontHandle {
                    face: face.clone(),
                    size_px,
                    origin: origin.clone(),
                }
            })
            .clone()
    }

    fn load_face(&self) -> (Option<FontArc>, FontOrigin) {
        if self.catalog.is_available() {
            for family in &self.families {
                let Some(path) = self.catalog.lookup(family) else {
                    continue;
                };
                match load_font_file(&path) {
                    Ok(face) => {
                        tracing::info!("Overlay font {:?} from {}", family, path.display());
                        return (Some(face), FontOrigin::Catalog(path));
                    }
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            tracing::debug!(
                "{} had none of {:?}, trying font files",
                self.catalog.name(),
                self.families
            );
        }

        for path in &self.paths {
            if !path.exists() {
                continue;
            }
            match load_font_file(path) {
                Ok(face) => {
                    tracing::info!("Overlay font from {}", path.display());
                    return (Some(face), FontOrigin::File(path.clone()));
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }

        match builtin_font() {
            Ok(face) => {
                tracing::info!("Overlay font: built-in");
                (Some(face), FontOrigin::Builtin)
            }
            Err(e) => {
                tracing::error!("{}; overlay text will not be drawn", e);
                (None, FontOrigin::Unavailable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FixedCatalog {
        answers: HashMap<String, PathBuf>,
        lookups: AtomicUsize,
    }

    impl FixedCatalog {
        fn new(answers: &[(&str, &Path)]) -> Arc<Self> {
            Arc::new(Self {
                answers: answers
                    .iter()
                    .map(|(family, path)| (family.to_string(), path.to_path_buf()))
                    .collect(),
                lookups: AtomicUsize::new(0),
            })
        }
    }

    impl FontCatalog for FixedCatalog {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn lookup(&self, family: &str) -> Option<PathBuf> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.answers.get(family).cloned()
        }
    }

    fn families(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn font_file() -> tempfile::NamedTempFile {
        let (bytes, _) = builtin_font_bytes().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    #[test]
    fn catalog_hit_wins() {
        let file = font_file();
        let catalog = FixedCatalog::new(&[("Second", file.path())]);
        let resolver =
            FontResolver::with_paths(catalog, families(&["First", "Second"]), Vec::new());

        let handle = resolver.resolve(14.0);
        assert_eq!(handle.origin(), &FontOrigin::Catalog(file.path().to_path_buf()));
        assert!(handle.face().is_some());
    }

    #[test]
    fn broken_catalog_file_falls_through_to_paths() {
        let mut broken = tempfile::NamedTempFile::new().unwrap();
        broken.write_all(b"not a font").unwrap();
        let good = font_file();

        let catalog = FixedCatalog::new(&[("Broken", broken.path())]);
        let resolver = FontResolver::with_paths(
            catalog,
            families(&["Broken"]),
            vec![PathBuf::from("/definitely/missing.ttf"), good.path().to_path_buf()],
        );

        assert_eq!(
            resolver.resolve(14.0).origin(),
            &FontOrigin::File(good.path().to_path_buf())
        );
    }

    #[test]
    fn falls_back_to_builtin() {
        let resolver = FontResolver::with_paths(Arc::new(NoCatalog), families(&["Any"]), Vec::new());

        let handle = resolver.resolve(14.0);
        assert_eq!(handle.origin(), &FontOrigin::Builtin);
        assert!(handle.face().is_some());
    }

    #[test]
    fn face_is_loaded_once() {
        let catalog = FixedCatalog::new(&[]);
        let resolver = FontResolver::with_paths(
            Arc::clone(&catalog) as Arc<dyn FontCatalog>,
            families(&["A", "B"]),
            Vec::new(),
        );

        let small = resolver.resolve(12.0);
        let large = resolver.resolve(20.0);
        resolver.resolve(12.0);

        assert_eq!(catalog.lookups.load(Ordering::SeqCst), 2);
        assert_eq!(small.size_px(), 12.0);
        assert_eq!(large.size_px(), 20.0);
        assert_eq!(small.origin(), large.origin());
    }
}
