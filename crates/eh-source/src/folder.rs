use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions image reconnues.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Liste récursivement les images d'un dossier, triées.
///
/// # Errors
/// Retourne une erreur si le dossier n'existe pas ou ne peut être lu.
pub fn scan_images(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        anyhow::bail!("Dossier introuvable : {}", folder.display());
    }
    let mut files = Vec::new();
    scan_dir(folder, &mut files)?;
    files.sort();
    log::info!("{} images trouvées dans {}", files.len(), folder.display());
    Ok(files)
}

fn scan_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Lecture de {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            scan_dir(&path, files)?;
        } else if is_image(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()))
}

/// Chemin de sortie miroir : `file` relatif à `input_root`, replanté sous `output_root`.
///
/// # Example
/// ```
/// use eh_source::folder::mirror_path;
/// use std::path::Path;
/// let out = mirror_path(Path::new("in/a/b.png"), Path::new("in"), Path::new("out"));
/// assert_eq!(out, Path::new("out/a/b.png"));
/// ```
#[must_use]
pub fn mirror_path(file: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    let relative = file
        .strip_prefix(input_root)
        .map_or_else(|_| file.file_name().map(PathBuf::from).unwrap_or_default(), Path::to_path_buf);
    output_root.join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_nested_images_only() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(nested.join("c.bmp"), b"").unwrap();

        let files = scan_images(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.jpg".to_string()));
        assert!(names.contains(&"b.PNG".to_string()));
        assert!(files.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn scan_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_images(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn mirror_outside_root_keeps_file_name() {
        let out = mirror_path(Path::new("/x/y.png"), Path::new("/in"), Path::new("/out"));
        assert_eq!(out, Path::new("/out/y.png"));
    }
}
