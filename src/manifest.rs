//! The flatpak-builder sources document written for the artifacts.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};

/// Directory label every artifact is placed under when the sources are
/// restored offline.
pub const DEST: &str = "dependencies/flatRepo";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    #[serde(rename = "type")]
    kind: EntryKind,
    url: String,
    sha256: String,
    dest: String,
}

impl ManifestEntry {
    pub fn file(url: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File,
            url: url.into(),
            sha256: sha256.into(),
            dest: DEST.to_string(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Four-space indented JSON followed by a newline.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        let mut ser =
            serde_json::Serializer::with_formatter(&mut w, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        w.write_all(b"\n").map_err(serde_json::Error::io)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|err| {
            Error::Manifest(serde_json::Error::io(std::io::Error::other(err)))
        })
    }

    pub fn read_from<R: Read>(r: R) -> Result<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| Error::filesystem(path, err))?;
        Self::read_from(BufReader::new(file))
    }

    /// Like [`Manifest::write_to`], but failures of `w` itself are reported
    /// as filesystem errors on `path`.
    pub fn write_file<W: Write>(&self, w: W, path: &Path) -> Result<()> {
        self.write_to(w).map_err(|err| match err {
            Error::Manifest(json) if json.is_io() => Error::filesystem(path, io::Error::from(json)),
            other => other,
        })
    }

    /// Replaces `path` in one step: the document goes to a temporary file
    /// next to it, which is renamed over `path` only once fully written.
    /// An existing file keeps its permissions; a new one gets the same mode
    /// a plain create would give it.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Subject to the umask, like File::create.
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let tmp = builder
            .tempfile_in(dir)
            .map_err(|err| Error::filesystem(dir, err))?;

        if let Ok(existing) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|err| Error::filesystem(tmp.path(), err))?;
        }

        let mut writer = BufWriter::new(tmp.as_file());
        self.write_file(&mut writer, tmp.path())?;
        writer
            .flush()
            .map_err(|err| Error::filesystem(tmp.path(), err))?;
        drop(writer);

        tmp.persist(path)
            .map_err(|err| Error::filesystem(path, err.error))?;
        Ok(())
    }
}
