use crate::config::write_atomic;
use crate::pattern::{Pattern, PatternLibrary};
use crate::rle;
use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

pub trait PatternStorage {
    fn save(&self, pattern: &Pattern) -> Result<()>;
    fn load(&self, name: &str) -> Result<Option<Pattern>>;
    fn list(&self) -> Result<Vec<String>>;
}

pub struct FilePatternStorage {
    dir: PathBuf,
}

impl FilePatternStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.rle"))
    }
}

impl PatternStorage for FilePatternStorage {
    fn save(&self, pattern: &Pattern) -> Result<()> {
        write_atomic(&self.path_for(pattern.name()), rle::encode(pattern).as_bytes())
    }

    fn load(&self, name: &str) -> Result<Option<Pattern>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let mut pattern =
            rle::parse(&text).with_context(|| format!("parsing {}", path.display()))?;
        if pattern.metadata.name.is_empty() {
            pattern.metadata.name = name.to_string();
        }
        Ok(Some(pattern))
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("rle") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn load_library(storage: &dyn PatternStorage) -> PatternLibrary {
    let mut library = PatternLibrary::default();
    let names = match storage.list() {
        Ok(names) => names,
        Err(e) => {
            log::warn!("listing stored patterns failed: {e:#}");
            return library;
        }
    };
    for name in names {
        match storage.load(&name) {
            Ok(Some(p)) => library.add(p),
            Ok(None) => {}
            Err(e) => log::warn!("skipping pattern {name}: {e:#}"),
        }
    }
    library
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::pattern::{PatternCategory, PatternMetadata};

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lifeterm-{tag}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn save_load_list() {
        let dir = scratch_dir("storage");
        let store = FilePatternStorage::new(&dir);
        assert!(store.list().unwrap().is_empty());

        let mut meta = PatternMetadata::new("tub", "small still life", PatternCategory::StillLife);
        meta.author = Some("someone".into());
        let tub = Pattern::new(meta, Grid::from_ascii(&[".o.", "o.o", ".o."]));
        store.save(&tub).unwrap();

        assert_eq!(store.list().unwrap(), vec!["tub".to_string()]);
        store.save(&tub).unwrap();
        assert_eq!(store.list().unwrap(), vec!["tub".to_string()]);
        let back = store.load("tub").unwrap().unwrap();
        assert_eq!(back.cells, tub.cells);
        assert_eq!(back.metadata.author.as_deref(), Some("someone"));
        assert!(store.load("missing").unwrap().is_none());

        let lib = load_library(&store);
        assert_eq!(lib.len(), 10);
        assert_eq!(lib.nth(10).map(|p| p.name()), Some("tub"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn broken_files_are_skipped() {
        let dir = scratch_dir("broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bad.rle"), "x = 1, y = 1\nzz!").unwrap();
        fs::write(dir.join("huge.rle"), "x = 18446744073709551615, y = 2\no!").unwrap();
        let store = FilePatternStorage::new(&dir);
        assert!(store.load("bad").is_err());
        assert!(store.load("huge").is_err());
        assert_eq!(load_library(&store).len(), 9);
        let _ = fs::remove_dir_all(&dir);
    }
}
