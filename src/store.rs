use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::Builder;

use crate::domain::BarcodeEntry;
use crate::error::EnteroError;

/// Output directory holding downloaded assemblies.
#[derive(Debug, Clone)]
pub struct AssemblyStore {
    root: Utf8PathBuf,
    append_barcode: bool,
}

impl AssemblyStore {
    pub fn new(root: Utf8PathBuf, append_barcode: bool) -> Self {
        Self {
            root,
            append_barcode,
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn assembly_path(&self, entry: &BarcodeEntry) -> Utf8PathBuf {
        self.root.join(entry.file_name(self.append_barcode))
    }

    /// Writes through a temp file in the same directory, so the final name
    /// only ever holds a complete download.
    pub fn write_assembly(
        &self,
        entry: &BarcodeEntry,
        content: &[u8],
    ) -> Result<Utf8PathBuf, EnteroError> {
        let dest = self.assembly_path(entry);
        if !entry.is_path_safe() || dest.parent() != Some(self.root.as_path()) {
            return Err(EnteroError::Filesystem(format!(
                "refusing to write {dest}: outside {}",
                self.root
            )));
        }
        Self::write_bytes_atomic(&dest, content)?;
        Ok(dest)
    }

    pub fn write_bytes_atomic(dest: &Utf8Path, content: &[u8]) -> Result<(), EnteroError> {
        let parent = dest
            .parent()
            .ok_or_else(|| EnteroError::Filesystem("invalid destination path".to_string()))?;
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| EnteroError::Filesystem(err.to_string()))?;
        let mut temp = Builder::new()
            .prefix(".entero-fetch")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| EnteroError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| EnteroError::Filesystem(format!("write {dest}: {err}")))?;
        if dest.as_std_path().exists() {
            fs::remove_file(dest.as_std_path())
                .map_err(|err| EnteroError::Filesystem(err.to_string()))?;
        }
        temp.persist(dest.as_std_path())
            .map_err(|err| EnteroError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let entry = BarcodeEntry::new("strainA", "BC1");
        let plain = AssemblyStore::new(Utf8PathBuf::from("out"), false);
        assert!(plain.assembly_path(&entry).ends_with("out/strainA.fna"));

        let tagged = AssemblyStore::new(Utf8PathBuf::from("out"), true);
        assert!(tagged.assembly_path(&entry).ends_with("out/strainA__BC1.fna"));
    }

    #[test]
    fn write_leaves_only_the_final_file() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let store = AssemblyStore::new(root.clone(), false);
        let entry = BarcodeEntry::new("strainA", "BC1");

        let path = store.write_assembly(&entry, b">seq1\nACGT\n").unwrap();
        assert_eq!(fs::read(path.as_std_path()).unwrap(), b">seq1\nACGT\n");

        let names: Vec<_> = fs::read_dir(root.as_std_path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["strainA.fna".to_string()]);
    }

    #[test]
    fn write_stays_inside_root() {
        let temp = tempfile::tempdir().unwrap();
        let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        let root = base.join("out");
        fs::create_dir_all(root.as_std_path()).unwrap();
        let store = AssemblyStore::new(root.clone(), false);

        let absolute = format!("{base}/escaped/abs");
        for name in ["../escaped", absolute.as_str(), "nested/strain"] {
            let err = store
                .write_assembly(&BarcodeEntry::new(name, "BC1"), b">x\nA\n")
                .unwrap_err();
            assert!(matches!(err, EnteroError::Filesystem(_)), "{name}: {err}");
        }

        let tagged = AssemblyStore::new(root.clone(), true);
        assert!(tagged
            .write_assembly(&BarcodeEntry::new("strainA", "../BC1"), b"x")
            .is_err());

        assert!(!base.join("escaped.fna").as_std_path().exists());
        assert!(!base.join("escaped").as_std_path().exists());
        assert_eq!(fs::read_dir(root.as_std_path()).unwrap().count(), 0);
    }
}
