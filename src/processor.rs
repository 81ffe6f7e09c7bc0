use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use oxipng::{InFile, Options, OutFile, StripChunks};
use walkdir::WalkDir;

use crate::constants::{
    JPEG_EXTENSIONS, JPEG_REENCODE_CEILING, JPEG_REENCODE_FLOOR, MAX_OXIPNG_PRESET, PNG_EXTENSIONS,
    TEXT_EXTENSIONS,
};
use crate::error::ProcessorError;
use crate::minify;
use crate::quality::QualityState;
use crate::search::{AssetProcessor, ProcessResult};
use crate::{verbose, warn};

/// In-process [`AssetProcessor`]: oxipng drives the lossless knob on PNGs,
/// the JPEG encoder drives the lossy knob, and text assets are minified.
///
/// A single file that fails to decode or optimize is logged and left as-is;
/// only infrastructure failures (unreadable working dir, file-system errors)
/// abort the attempt.
#[derive(Debug, Clone)]
pub struct ImageAssetProcessor {
    pub optimize_png: bool,
    pub recompress_jpeg: bool,
    pub minify_text: bool,
}

impl Default for ImageAssetProcessor {
    fn default() -> Self {
        Self {
            optimize_png: true,
            recompress_jpeg: true,
            minify_text: true,
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

impl AssetProcessor for ImageAssetProcessor {
    fn process(
        &self,
        working_dir: &Path,
        quality: &QualityState,
    ) -> Result<ProcessResult, ProcessorError> {
        let mut bytes_saved: i64 = 0;
        let mut original_bytes: u64 = 0;
        let mut degraded = false;

        for entry in WalkDir::new(working_dir) {
            let entry = entry.map_err(|e| ProcessorError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let Some(ext) = extension_of(path) else {
                continue;
            };

            if self.optimize_png && PNG_EXTENSIONS.contains(&ext.as_str()) {
                let (saved, original) = optimize_png_file(path, quality.lossless_level)?;
                bytes_saved += saved;
                original_bytes += original;
            } else if self.recompress_jpeg && JPEG_EXTENSIONS.contains(&ext.as_str()) {
                let (saved, original, reencoded) =
                    recompress_jpeg_file(path, quality.lossy_quality)?;
                bytes_saved += saved;
                original_bytes += original;
                degraded |= reencoded;
            } else if self.minify_text && TEXT_EXTENSIONS.contains(&ext.as_str()) {
                let saved = minify::minify_file(path).map_err(ProcessorError::Io)?;
                bytes_saved += saved;
            }
        }

        Ok(ProcessResult {
            bytes_saved,
            original_bytes,
            degraded,
        })
    }
}

/// Runs oxipng in place at the preset matching the lossless level (clamped
/// to oxipng's 0-6 range). A failed optimization keeps the original file.
fn optimize_png_file(path: &Path, lossless_level: u8) -> Result<(i64, u64), ProcessorError> {
    let original = fs::metadata(path)?.len();
    if original == 0 {
        return Ok((0, 0));
    }

    let mut options = Options::from_preset(lossless_level.min(MAX_OXIPNG_PRESET));
    options.force = true;
    options.strip = StripChunks::Safe;

    let input = InFile::Path(path.to_path_buf());
    let output = OutFile::Path {
        path: None,
        preserve_attrs: false,
    };
    if let Err(e) = oxipng::optimize(&input, &output, &options) {
        warn!("oxipng failed on {}: {}", path.display(), e);
        return Ok((0, original));
    }

    let compressed = fs::metadata(path)?.len();
    let saved = original as i64 - compressed as i64;
    verbose!("{}: {} bytes saved (png)", path.display(), saved);
    Ok((saved, original))
}

/// Deletes the scratch file if the re-encode never got renamed over the
/// original.
struct ScratchFileGuard(PathBuf);

impl Drop for ScratchFileGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

/// Re-encodes a JPEG in place at the lossy quality, clamped to [10, 95].
/// At 95 and above the file is left untouched. Undecodable files are logged
/// and skipped.
fn recompress_jpeg_file(path: &Path, lossy_quality: u8) -> Result<(i64, u64, bool), ProcessorError> {
    let original = fs::metadata(path)?.len();
    if original == 0 {
        return Ok((0, 0, false));
    }

    let applied = lossy_quality.clamp(JPEG_REENCODE_FLOOR, JPEG_REENCODE_CEILING);
    if applied >= JPEG_REENCODE_CEILING {
        return Ok((0, original, false));
    }

    let img = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!("cannot decode {}: {}", path.display(), e);
            return Ok((0, original, false));
        }
    };
    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let scratch = path.with_extension("reencode.jpg");
    let _guard = ScratchFileGuard(scratch.clone());
    {
        let file = fs::File::create(&scratch)?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, applied);
        if let Err(e) = rgb.write_with_encoder(encoder) {
            warn!("jpeg re-encode failed on {}: {}", path.display(), e);
            return Ok((0, original, false));
        }
        writer.flush()?;
    }
    fs::rename(&scratch, path)?;

    let compressed = fs::metadata(path)?.len();
    let saved = original as i64 - compressed as i64;
    verbose!("{}: {} bytes saved (jpeg q{})", path.display(), saved, applied);
    Ok((saved, original, true))
}
