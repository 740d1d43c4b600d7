//! Office Open XML packages (`.docx`, `.xlsx`) as in-memory zip archives.

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::TemplateError;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// All entries of an archive, kept in their original order.
#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<Entry>,
}

impl Package {
    pub fn read(bytes: &[u8]) -> Result<Self, TemplateError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| TemplateError::Package(e.to_string()))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| TemplateError::Package(e.to_string()))?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)
                    .map_err(|e| TemplateError::Package(e.to_string()))?;
            }
            entries.push(Entry {
                name: file.name().to_string(),
                stored: file.compression() == CompressionMethod::Stored,
                is_dir: file.is_dir(),
                data,
            });
        }
        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.name == name && !e.is_dir)
            .map(|e| e.data.as_slice())
    }

    pub fn require(&self, name: &str) -> Result<&[u8], TemplateError> {
        self.part(name)
            .ok_or_else(|| TemplateError::MissingPart(name.to_string()))
    }

    /// Replaces an entry's bytes, appending a new entry if absent.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.data = data,
            None => self.entries.push(Entry {
                name: name.to_string(),
                data,
                stored: false,
                is_dir: false,
            }),
        }
    }

    pub fn write(&self) -> Result<Vec<u8>, TemplateError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let method = if entry.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(|e| TemplateError::Package(e.to_string()))?;
                continue;
            }
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| TemplateError::Package(e.to_string()))?;
            writer
                .write_all(&entry.data)
                .map_err(|e| TemplateError::Package(e.to_string()))?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| TemplateError::Package(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
