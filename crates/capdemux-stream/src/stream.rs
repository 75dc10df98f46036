use std::fs::File;
use std::io::Read;
use std::ops::Index;
use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, StreamError};
use crate::word::{Word, WordOrder, WORD_SIZE};

/// Default size ceiling for a capture: 32 MiB (8 Mi words).
pub const DEFAULT_MAX_FILE_SIZE: usize = 32 * 1024 * 1024;

/// Configuration for loading a [`WordStream`].
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Maximum capture size in bytes. Default: 32 MiB.
    pub max_file_size: usize,
    /// Byte order of the words in the capture. Default: native.
    pub word_order: WordOrder,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            word_order: WordOrder::default(),
        }
    }
}

/// A finite, read-only sequence of capture words.
///
/// One zero word is kept past the end so that lookahead at `len() - 1`
/// never leaves the buffer. The sentinel is reachable through [`get`]
/// and indexing but is not counted by [`len`].
///
/// [`get`]: WordStream::get
/// [`len`]: WordStream::len
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordStream {
    // always holds len() + 1 words, the last one being the sentinel
    words: Vec<Word>,
}

impl WordStream {
    /// Build a stream from an in-memory capture.
    ///
    /// Fails with [`StreamError::FileTooLarge`] when `bytes` exceeds the
    /// ceiling and with [`StreamError::InvalidLength`] when it is not word
    /// aligned. The ceiling is checked first.
    pub fn from_bytes(bytes: &[u8], config: &StreamConfig) -> Result<Self> {
        check_size(bytes.len() as u64, config.max_file_size)?;
        if bytes.len() % WORD_SIZE != 0 {
            return Err(StreamError::InvalidLength { len: bytes.len() });
        }

        let count = bytes.len() / WORD_SIZE;
        let mut words = Vec::with_capacity(count + 1);
        let mut buf = bytes;
        while buf.len() >= WORD_SIZE {
            words.push(config.word_order.get_word(&mut buf));
        }
        words.push(0);

        debug!(
            words = count,
            order = config.word_order.as_str(),
            "capture loaded"
        );
        Ok(Self { words })
    }

    /// Load a capture from disk.
    ///
    /// The size ceiling is checked against file metadata before any data is
    /// read.
    pub fn open(path: impl AsRef<Path>, config: &StreamConfig) -> Result<Self> {
        let bytes = read_capture(path, config.max_file_size)?;
        Self::from_bytes(&bytes, config)
    }

    /// Number of capture words, excluding the sentinel.
    pub fn len(&self) -> usize {
        self.words.len() - 1
    }

    /// Returns true if the capture holds no words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length of the original capture in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * WORD_SIZE
    }

    /// Word at `index`, or `None` past the sentinel.
    pub fn get(&self, index: usize) -> Option<Word> {
        self.words.get(index).copied()
    }

    /// Capture words, excluding the sentinel.
    pub fn as_words(&self) -> &[Word] {
        &self.words[..self.len()]
    }

    /// The trailing lookahead word. Always zero.
    pub fn sentinel(&self) -> Word {
        self.words[self.len()]
    }
}

impl Index<usize> for WordStream {
    type Output = Word;

    fn index(&self, index: usize) -> &Word {
        &self.words[index]
    }
}

/// Read a raw capture, enforcing only the size ceiling.
///
/// Used directly by the tag-routed legacy decoder, whose records sit behind a
/// file header and therefore carry no word alignment requirement.
pub fn read_capture(path: impl AsRef<Path>, max_file_size: usize) -> Result<Bytes> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|source| StreamError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let size = file.metadata()?.len();
    check_size(size, max_file_size)?;

    let mut data = Vec::with_capacity(size as usize);
    file.read_to_end(&mut data)?;
    // the file may have grown since the metadata call
    check_size(data.len() as u64, max_file_size)?;

    debug!(path = %path.display(), bytes = data.len(), "capture read");
    Ok(Bytes::from(data))
}

fn check_size(size: u64, max: usize) -> Result<()> {
    if size > max as u64 {
        return Err(StreamError::FileTooLarge { size, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "capdemux-stream-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ))
    }

    fn le_config() -> StreamConfig {
        StreamConfig {
            word_order: WordOrder::Little,
            ..StreamConfig::default()
        }
    }

    #[test]
    fn loads_words_and_appends_sentinel() {
        let bytes = [1, 0, 0, 0, 2, 0, 0, 0, 0xEE, 0xEE, 0xEE, 0xEE];
        let stream = WordStream::from_bytes(&bytes, &le_config()).unwrap();

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.byte_len(), bytes.len());
        assert_eq!(stream.as_words(), &[1, 2, 0xEEEE_EEEE]);
        assert_eq!(stream.sentinel(), 0);
        assert_eq!(stream.get(3), Some(0));
        assert_eq!(stream.get(4), None);
        assert_eq!(stream[1], 2);
    }

    #[test]
    fn word_count_matches_byte_length() {
        for words in [0usize, 1, 7, 64] {
            let bytes = vec![0xAB; words * WORD_SIZE];
            let stream = WordStream::from_bytes(&bytes, &StreamConfig::default()).unwrap();
            assert_eq!(stream.len() * 4, bytes.len());
            assert_eq!(stream.sentinel(), 0);
        }
    }

    #[test]
    fn empty_capture_is_valid() {
        let stream = WordStream::from_bytes(&[], &StreamConfig::default()).unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.sentinel(), 0);
    }

    #[test]
    fn rejects_unaligned_length() {
        let err = WordStream::from_bytes(&[0; 6], &StreamConfig::default()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidLength { len: 6 }));
    }

    #[test]
    fn rejects_oversized_buffer_before_alignment() {
        let config = StreamConfig {
            max_file_size: 8,
            ..StreamConfig::default()
        };
        let err = WordStream::from_bytes(&[0; 9], &config).unwrap_err();
        assert!(matches!(err, StreamError::FileTooLarge { size: 9, max: 8 }));

        // exactly at the ceiling is fine
        assert!(WordStream::from_bytes(&[0; 8], &config).is_ok());
    }

    #[test]
    fn open_rejects_oversized_file() {
        let path = unique_temp_path("oversized");
        let file = File::create(&path).unwrap();
        file.set_len((DEFAULT_MAX_FILE_SIZE + 4) as u64).unwrap();
        drop(file);

        let err = WordStream::open(&path, &StreamConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StreamError::FileTooLarge {
                size,
                max: DEFAULT_MAX_FILE_SIZE
            } if size == (DEFAULT_MAX_FILE_SIZE + 4) as u64
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn open_reports_missing_file() {
        let path = unique_temp_path("missing");
        let err = WordStream::open(&path, &StreamConfig::default()).unwrap_err();
        match err {
            StreamError::FileNotFound { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn open_reads_file_contents() {
        let path = unique_temp_path("contents");
        std::fs::write(&path, [0x04, 0x03, 0x02, 0x01]).unwrap();

        let stream = WordStream::open(&path, &le_config()).unwrap();
        assert_eq!(stream.as_words(), &[0x0102_0304]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn read_capture_ignores_alignment() {
        let path = unique_temp_path("raw");
        std::fs::write(&path, [1, 2, 3, 4, 5]).unwrap();

        let bytes = read_capture(&path, DEFAULT_MAX_FILE_SIZE).unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2, 3, 4, 5]);

        let _ = std::fs::remove_file(&path);
    }
}
