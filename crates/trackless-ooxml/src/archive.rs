//! Package container handling for DOCX/DOTX files
//!
//! A package is a ZIP archive of XML parts and binary resources. Entries
//! keep the order and compression they were read with, so saving a package
//! in which only some parts changed rewrites nothing else.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::trace;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::Result;

/// Path of the content-type manifest, written first
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

#[derive(Debug, Clone)]
struct Entry {
    path: String,
    contents: Vec<u8>,
    compression: CompressionMethod,
}

/// An unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// Entries in package order
    entries: Vec<Entry>,
}

impl OoxmlArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX/DOTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Unpack a package held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Unpack from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut contents = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut contents)?;
            entries.push(Entry {
                path: file.name().to_string(),
                contents,
                compression: writable(file.compression()),
            });
        }

        trace!(entries = entries.len(), "package unpacked");
        Ok(Self { entries })
    }

    fn entry(&self, path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Contents of an entry
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entry(path).map(|e| e.contents.as_slice())
    }

    /// Contents of an entry as text (lossy UTF-8)
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Whether the package has an entry at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.entry(path).is_some()
    }

    /// Entry paths in package order
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the package has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace an entry's contents, or append a new compressed entry
    ///
    /// A replaced entry keeps its position and compression.
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        let path = path.into();
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => entry.contents = contents,
            None => self.entries.push(Entry {
                path,
                contents,
                compression: CompressionMethod::Deflated,
            }),
        }
    }

    /// Set an entry from text
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Remove an entry, returning its contents
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        let index = self.entries.iter().position(|e| e.path == path)?;
        Some(self.entries.remove(index).contents)
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(File::create(path)?)
    }

    /// Write the package into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the package to any writer
    ///
    /// The content-type manifest goes first; everything else follows in
    /// package order.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let manifest = self.entries.iter().filter(|e| e.path == CONTENT_TYPES);
        let rest = self.entries.iter().filter(|e| e.path != CONTENT_TYPES);
        for entry in manifest.chain(rest) {
            let options = SimpleFileOptions::default().compression_method(entry.compression);
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Stored entries stay stored; every other method is written back deflated
fn writable(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_operations() {
        let mut archive = OoxmlArchive::new();
        assert!(archive.is_empty());

        archive.set_string("test.xml", "<root/>");
        assert!(archive.contains("test.xml"));
        assert_eq!(archive.get_string("test.xml"), Some("<root/>".to_string()));

        archive.set_string("test.xml", "<other/>");
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.get("test.xml"), Some(&b"<other/>"[..]));

        assert_eq!(archive.remove("test.xml"), Some(b"<other/>".to_vec()));
        assert!(!archive.contains("test.xml"));
        assert_eq!(archive.remove("test.xml"), None);
    }

    #[test]
    fn test_order_and_manifest_position() {
        let mut archive = OoxmlArchive::new();
        archive.set_string("word/document.xml", "<w:document/>");
        archive.set("word/media/image1.png", vec![0x89, 0x50, 0x4E, 0x47]);
        archive.set_string(CONTENT_TYPES, "<Types/>");
        archive.set_string("_rels/.rels", "<Relationships/>");

        let restored = OoxmlArchive::from_bytes(&archive.to_bytes().unwrap()).unwrap();
        let files: Vec<_> = restored.file_list().collect();
        assert_eq!(
            files,
            vec![
                CONTENT_TYPES,
                "word/document.xml",
                "word/media/image1.png",
                "_rels/.rels"
            ]
        );
        assert_eq!(
            restored.get("word/media/image1.png"),
            Some(&[0x89, 0x50, 0x4E, 0x47][..])
        );
    }

    #[test]
    fn test_stored_entries_stay_stored() {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("word/media/image1.png", stored).unwrap();
            zip.write_all(&[1, 2, 3]).unwrap();
            zip.finish().unwrap();
        }

        let archive = OoxmlArchive::from_bytes(buffer.get_ref()).unwrap();
        let rewritten = archive.to_bytes().unwrap();

        let mut zip = ZipArchive::new(Cursor::new(rewritten)).unwrap();
        let file = zip.by_name("word/media/image1.png").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");

        let mut archive = OoxmlArchive::new();
        archive.set_string("word/document.xml", "<w:document/>");
        archive.write_to_file(&path).unwrap();

        let reopened = OoxmlArchive::open(&path).unwrap();
        assert!(reopened.contains("word/document.xml"));
    }
}
