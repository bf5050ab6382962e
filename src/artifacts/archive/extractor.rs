use anyhow::Context;
use quick_xml::Reader;
use quick_xml::events::Event;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Local name of the element that holds run text
const TEXT_RUN_TAG: &[u8] = b"t";

/// Upper bound on the buffer reserved from a member's declared size
const MAX_PREALLOCATION: u64 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Uncompressed size
    pub size: u64,
    /// Hex SHA-1 of the uncompressed content, empty when unreadable
    pub hash: String,
}

pub type MemberMap = BTreeMap<String, MemberInfo>;

pub struct ArchiveTextExtractor<R = File> {
    archive: ZipArchive<R>,
}

impl ArchiveTextExtractor<File> {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open archive: {:?}", path))?;

        Self::from_reader(file).with_context(|| format!("Failed to read archive: {:?}", path))
    }
}

impl<R: Read + Seek> ArchiveTextExtractor<R> {
    pub fn from_reader(reader: R) -> anyhow::Result<Self> {
        Ok(ArchiveTextExtractor {
            archive: ZipArchive::new(reader)?,
        })
    }

    pub fn members(&mut self) -> MemberMap {
        let names = self
            .archive
            .file_names()
            .map(String::from)
            .collect::<Vec<_>>();

        names
            .into_iter()
            .map(|name| {
                let info = self.member_info(&name).unwrap_or_else(|err| {
                    tracing::debug!(member = %name, %err, "unreadable archive member");
                    MemberInfo {
                        size: 0,
                        hash: String::new(),
                    }
                });
                (name, info)
            })
            .collect()
    }

    fn member_info(&mut self, name: &str) -> anyhow::Result<MemberInfo> {
        let mut member = self.archive.by_name(name)?;
        let size = member.size();

        let mut hasher = Sha1::new();
        std::io::copy(&mut member, &mut hasher)?;

        Ok(MemberInfo {
            size,
            hash: format!("{:x}", hasher.finalize()),
        })
    }

    pub fn read_member(&mut self, name: &str) -> anyhow::Result<Vec<u8>> {
        let mut member = self
            .archive
            .by_name(name)
            .with_context(|| format!("Archive member not found: {}", name))?;

        let mut data = Vec::with_capacity(initial_capacity(member.size()));
        member.read_to_end(&mut data)?;

        Ok(data)
    }

    pub fn member_text(&mut self, name: &str) -> anyhow::Result<String> {
        Ok(extract_plain_text(&self.read_member(name)?))
    }
}

/// Concatenate the character data of every text-run element.
///
/// Markup, attributes and everything outside text runs is ignored.
/// Malformed XML yields an empty string.
pub fn extract_plain_text(xml: &[u8]) -> String {
    let mut reader = Reader::from_reader(xml);
    let mut text = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) if start.local_name().as_ref() == TEXT_RUN_TAG => {
                in_run = true;
            }
            Ok(Event::End(end)) if end.local_name().as_ref() == TEXT_RUN_TAG => {
                in_run = false;
            }
            Ok(Event::Text(chars)) if in_run => match chars.unescape() {
                Ok(chars) => text.push_str(&chars),
                Err(err) => {
                    tracing::debug!(%err, "malformed text run, extracted text dropped");
                    return String::new();
                }
            },
            Ok(Event::CData(chars)) if in_run => text.push_str(&String::from_utf8_lossy(&chars)),
            Ok(Event::Eof) => break,
            Err(err) => {
                tracing::debug!(%err, "malformed XML, extracted text dropped");
                return String::new();
            }
            _ => {}
        }
    }

    text
}

/// The declared size comes from the archive header and is not trusted
fn initial_capacity(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0)
}
