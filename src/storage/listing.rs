//! Parser for the `List Blobs` XML response.

use chrono::{DateTime, Utc};
use quick_xml::{events::Event, Reader};

use crate::{
    errors::{AppError, AppResult},
    storage::BlobInfo,
};

#[derive(Debug, Default, PartialEq)]
pub struct BlobPage {
    pub blobs: Vec<BlobInfo>,
    pub next_marker: Option<String>,
}

#[derive(Default)]
struct PartialBlob {
    name: Option<String>,
    size: u64,
    last_modified: Option<DateTime<Utc>>,
}

pub fn parse_blob_list(xml: &str) -> AppResult<BlobPage> {
    let mut reader = Reader::from_str(xml.trim_start_matches('\u{feff}'));
    reader.config_mut().trim_text(true);

    let mut page = BlobPage::default();
    let mut current: Option<PartialBlob> = None;
    let mut element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                element = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if element == "Blob" {
                    current = Some(PartialBlob::default());
                }
            }
            Ok(Event::Text(text)) => {
                let value = text
                    .unescape()
                    .map_err(|e| AppError::StorageError(format!("XML inválido: {}", e)))?;

                match (element.as_str(), current.as_mut()) {
                    ("Name", Some(blob)) => blob.name = Some(value.into_owned()),
                    ("Content-Length", Some(blob)) => blob.size = value.parse().unwrap_or(0),
                    ("Last-Modified", Some(blob)) => {
                        blob.last_modified = DateTime::parse_from_rfc2822(&value)
                            .ok()
                            .map(|d| d.with_timezone(&Utc));
                    }
                    ("NextMarker", None) if !value.is_empty() => {
                        page.next_marker = Some(value.into_owned());
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"Blob" {
                    if let Some(PartialBlob {
                        name: Some(name),
                        size,
                        last_modified,
                    }) = current.take()
                    {
                        page.blobs.push(BlobInfo {
                            name,
                            size,
                            last_modified,
                        });
                    }
                }
                element.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(AppError::StorageError(format!(
                    "XML inválido en la posición {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://cuenta.blob.core.windows.net/" ContainerName="recursos">
  <Blobs>
    <Blob>
      <Name>manual &amp; guia.pdf</Name>
      <Properties>
        <Last-Modified>Wed, 09 Sep 2009 09:20:02 GMT</Last-Modified>
        <Content-Length>2048</Content-Length>
        <Content-Type>application/pdf</Content-Type>
      </Properties>
    </Blob>
    <Blob>
      <Name>induccion.mp4</Name>
      <Properties>
        <Content-Length>10</Content-Length>
      </Properties>
    </Blob>
  </Blobs>
  <NextMarker>2!88!MDAw</NextMarker>
</EnumerationResults>"#;

    #[test]
    fn parses_names_sizes_and_dates() {
        let page = parse_blob_list(LISTING).unwrap();

        assert_eq!(page.blobs.len(), 2);
        assert_eq!(page.blobs[0].name, "manual & guia.pdf");
        assert_eq!(page.blobs[0].size, 2048);
        assert_eq!(
            page.blobs[0].last_modified.unwrap().to_rfc3339(),
            "2009-09-09T09:20:02+00:00"
        );
        assert_eq!(page.blobs[1].name, "induccion.mp4");
        assert!(page.blobs[1].last_modified.is_none());
    }

    #[test]
    fn reads_continuation_marker() {
        let page = parse_blob_list(LISTING).unwrap();
        assert_eq!(page.next_marker.as_deref(), Some("2!88!MDAw"));
    }

    #[test]
    fn empty_container_has_no_marker() {
        let page = parse_blob_list(
            "\u{feff}<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>",
        )
        .unwrap();

        assert_eq!(page, BlobPage::default());
    }
}
