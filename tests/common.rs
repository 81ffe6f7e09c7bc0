use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use image::{ImageFormat, Rgb, RgbImage};

pub fn create_project_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Creates one banner folder under the project dir with an HTML entry point
/// and a couple of real image assets.
pub fn create_banner_folder(project_dir: &Path, name: &str) -> PathBuf {
    let folder = project_dir.join(name);
    std::fs::create_dir(&folder).unwrap();

    File::create(folder.join("index.html"))
        .unwrap()
        .write_all(b"<!DOCTYPE html>\n<html><body><img src=\"hero.png\"></body></html>\n")
        .unwrap();
    File::create(folder.join("style.css"))
        .unwrap()
        .write_all(b"body { margin: 0; }\n")
        .unwrap();

    write_gradient_image(&folder.join("hero.png"), ImageFormat::Png);
    write_gradient_image(&folder.join("photo.jpg"), ImageFormat::Jpeg);

    folder
}

fn write_gradient_image(path: &Path, format: ImageFormat) {
    let img = RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
    img.save_with_format(path, format).unwrap();
}
