use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info};

use crate::frame::Frame;
use crate::io::format::{FormatRegistry, SupportedFormat};
use crate::io::markable::MarkableReader;
use crate::io::options::ReadOptions;
use crate::{FrameError, Result};

/// A parsed frame together with the format that parsed it.
#[derive(Clone)]
pub struct ReadFrame {
    /// Format that produced `frame`.
    pub format: Arc<dyn SupportedFormat>,
    /// The parsed frame.
    pub frame: Frame,
}

impl fmt::Debug for ReadFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadFrame")
            .field("format", &self.format.name())
            .field("frame", &self.frame)
            .finish()
    }
}

/// Reads frames from streams, files and URLs, choosing a format from a
/// [`FormatRegistry`].
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    registry: FormatRegistry,
    options: ReadOptions,
}

impl FrameReader {
    /// Reader over `registry` with default options.
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            registry,
            options: ReadOptions::default(),
        }
    }

    /// Reader over `registry` with validated `options`.
    pub fn with_options(registry: FormatRegistry, options: ReadOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { registry, options })
    }

    /// Reader over the built-in formats, all configured with `options`.
    pub fn builtin(options: ReadOptions) -> Result<Self> {
        Self::with_options(FormatRegistry::builtin(&options), options)
    }

    /// The formats this reader chooses from.
    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Parse `reader` with `format`, or with the first registered format that
    /// accepts it.
    ///
    /// Without an explicit format every format is tried in priority order,
    /// each from the start of the stream; a format may look at most
    /// `look_ahead_limit` bytes before the stream can no longer be rewound
    /// for the next one. `reader` is dropped exactly once, after the last
    /// attempt.
    pub fn resolve_stream<R: Read>(
        &self,
        mut reader: R,
        format: Option<Arc<dyn SupportedFormat>>,
        header: &[String],
    ) -> Result<ReadFrame> {
        if let Some(format) = format {
            let frame = format.read_stream(&mut reader, header)?;
            return Ok(ReadFrame { format, frame });
        }

        let mut input = MarkableReader::new(reader);
        input.mark(self.options.look_ahead_limit);
        let resolved = self.try_formats(&mut input, header);
        input.close();
        resolved
    }

    fn try_formats<R: Read>(
        &self,
        input: &mut MarkableReader<R>,
        header: &[String],
    ) -> Result<ReadFrame> {
        for format in self.registry.sorted_by_priority() {
            if let Err(error) = input.reset() {
                debug!(format = format.name(), %error, "cannot rewind stream for format");
                continue;
            }
            match format.read_stream(input, header) {
                Ok(frame) => {
                    info!(format = format.name(), "resolved stream format");
                    return Ok(ReadFrame { format, frame });
                }
                Err(error) => debug!(format = format.name(), %error, "format rejected stream"),
            }
        }
        Err(FrameError::UnparseableStream)
    }

    /// Parse the file at `path` with `format`, or with the first registered
    /// format that accepts it.
    ///
    /// Trial parsing reopens the file for every format. A missing file is
    /// reported as soon as it is seen rather than treated as a rejection.
    pub fn resolve_file(
        &self,
        path: &Path,
        format: Option<Arc<dyn SupportedFormat>>,
        header: &[String],
    ) -> Result<ReadFrame> {
        if let Some(format) = format {
            let frame = format.read_file(path, header)?;
            return Ok(ReadFrame { format, frame });
        }

        for format in self.registry.sorted_by_priority() {
            match format.read_file(path, header) {
                Ok(frame) => {
                    info!(format = format.name(), path = %path.display(), "resolved file format");
                    return Ok(ReadFrame { format, frame });
                }
                Err(error) if error.is_not_found() => return Err(error),
                Err(error) => debug!(
                    format = format.name(),
                    path = %path.display(),
                    %error,
                    "format rejected file"
                ),
            }
        }
        Err(FrameError::UnparseableFile {
            path: path.to_path_buf(),
        })
    }

    /// Read the file at `path` with the format its extension names.
    pub fn read_file(&self, path: &Path, header: &[String]) -> Result<Frame> {
        let format = self
            .registry
            .guess_for_path(path)
            .ok_or_else(|| FrameError::unknown_format(path.display().to_string()))?;
        Ok(self.resolve_file(path, Some(format), header)?.frame)
    }

    /// Read `url` with the format its path extension names.
    ///
    /// `file:` URLs are read from disk, `http` and `https` URLs are fetched;
    /// other schemes are rejected before the extension is looked at.
    pub fn read_url(&self, url: &Url, header: &[String]) -> Result<Frame> {
        let invalid_protocol = || FrameError::InvalidProtocol {
            url: url.to_string(),
        };
        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|()| invalid_protocol())?;
                let format = self.guess_for_url(url)?;
                Ok(self.resolve_file(&path, Some(format), header)?.frame)
            }
            "http" | "https" => {
                let format = self.guess_for_url(url)?;
                debug!(%url, format = format.name(), "fetching remote frame");
                let response = reqwest::blocking::get(url.clone())
                    .and_then(|r| r.error_for_status())
                    .map_err(|source| FrameError::Http { source })?;
                Ok(self.resolve_stream(response, Some(format), header)?.frame)
            }
            _ => Err(invalid_protocol()),
        }
    }

    fn guess_for_url(&self, url: &Url) -> Result<Arc<dyn SupportedFormat>> {
        self.registry
            .guess_for_path(Path::new(url.path()))
            .ok_or_else(|| FrameError::unknown_format(url.as_str()))
    }

    /// Read a URL (anything with a `scheme://` prefix) or a local path.
    pub fn read_path(&self, path: &str, header: &[String]) -> Result<Frame> {
        if path.contains("://") {
            let url = Url::parse(path).map_err(|_| FrameError::InvalidProtocol {
                url: path.to_string(),
            })?;
            return self.read_url(&url, header);
        }
        self.read_file(Path::new(path), header)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::path::Path;
    use std::sync::Arc;

    use reqwest::Url;

    use super::FrameReader;
    use crate::frame::Frame;
    use crate::io::format::{FormatRegistry, SupportedFormat};
    use crate::io::{CsvFormat, JsonFormat, ReadOptions};
    use crate::{FrameError, Result};

    #[derive(Debug)]
    struct Greedy;

    // Consumes the whole stream, then rejects it.
    impl SupportedFormat for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn accepts_extension(&self, _ext: &str) -> bool {
            false
        }

        fn test_order(&self) -> i32 {
            0
        }

        fn read_stream(&self, reader: &mut dyn Read, _header: &[String]) -> Result<Frame> {
            let mut sink = Vec::new();
            reader.read_to_end(&mut sink).map_err(FrameError::io)?;
            Err(FrameError::invalid_operation("never accepts"))
        }
    }

    #[test]
    fn explicit_format_errors_are_not_retried() {
        let reader = FrameReader::default();
        let json: Arc<dyn SupportedFormat> = Arc::new(JsonFormat);
        let err = reader
            .resolve_stream(Cursor::new(b"a,b\n1,2\n".to_vec()), Some(json), &[])
            .unwrap_err();
        assert!(matches!(err, FrameError::Json { .. }));
    }

    #[test]
    fn stream_is_rewound_between_attempts() {
        let registry = FormatRegistry::empty()
            .with_format(CsvFormat::default())
            .with_format(Greedy);
        let reader = FrameReader::new(registry);
        let read = reader
            .resolve_stream(Cursor::new(b"a,b\n1,2\n".to_vec()), None, &[])
            .unwrap();
        assert_eq!(read.format.name(), "csv");
        assert_eq!(read.frame.height(), 1);
    }

    #[test]
    fn exhausted_look_ahead_rejects_later_formats() {
        let registry = FormatRegistry::empty()
            .with_format(CsvFormat::default())
            .with_format(Greedy);
        let options = ReadOptions::default().with_look_ahead_limit(4);
        let reader = FrameReader::with_options(registry, options).unwrap();
        let err = reader
            .resolve_stream(Cursor::new(b"a,b\n1,2\n".to_vec()), None, &[])
            .unwrap_err();
        assert!(matches!(err, FrameError::UnparseableStream));
    }

    #[test]
    fn unknown_extensions_and_schemes_fail_before_parsing() {
        let reader = FrameReader::default();
        assert!(matches!(
            reader.read_file(Path::new("data.xlsx"), &[]).unwrap_err(),
            FrameError::UnknownFormat { .. }
        ));
        let url = Url::parse("ftp://example.com/data.csv").unwrap();
        assert!(matches!(
            reader.read_url(&url, &[]).unwrap_err(),
            FrameError::InvalidProtocol { .. }
        ));
        let url = Url::parse("ftp://example.com/data").unwrap();
        assert!(matches!(
            reader.read_url(&url, &[]).unwrap_err(),
            FrameError::InvalidProtocol { .. }
        ));
        let url = Url::parse("file:///tmp/data").unwrap();
        assert!(matches!(
            reader.read_url(&url, &[]).unwrap_err(),
            FrameError::UnknownFormat { .. }
        ));
    }

    #[test]
    fn file_urls_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "a\n1\n2\n").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let reader = FrameReader::default();
        assert_eq!(reader.read_url(&url, &[]).unwrap().height(), 2);
        assert_eq!(reader.read_path(url.as_str(), &[]).unwrap().height(), 2);
        assert_eq!(
            reader
                .read_path(path.to_str().unwrap(), &[])
                .unwrap()
                .height(),
            2
        );
    }
}
