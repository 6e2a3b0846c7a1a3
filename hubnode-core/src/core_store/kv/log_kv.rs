/*
    log_kv.rs - KV engine backed by an append-only batch log

    Each committed transaction is one frame:

        [seq:8][len:4][batch:len][checksum:4]

    where `batch` is the bincode encoding of the transaction's ops and the
    checksum is CRC32 over `batch`. Opening the log replays every frame into
    the in-memory map. A frame cut short at the tail (crash during append)
    is dropped and the file truncated back to the last whole frame; a
    checksum mismatch is reported as corruption. A frame whose declared
    length runs past the end of the file counts as cut short, so a damaged
    length field never drives an allocation.

    A failed append is rolled back by truncating to the last whole frame,
    leaving the log ready for the next commit.
*/

use super::{apply_ops, KvEngine, KvOp, KvTransaction};
use crate::core_store::errors::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

const FRAME_HEADER: u64 = 8 + 4;
const FRAME_OVERHEAD: u64 = FRAME_HEADER + 4;

/// File operations the writer needs beyond `Write`
trait LogFile: Write + Send {
    fn sync_data(&self) -> io::Result<()>;
    fn set_len(&self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

struct LogWriter<F = File> {
    file: F,
    seq: u64,
    size: u64,
    /// Set when a rollback itself failed; the tail is unknown until reopen
    broken: bool,
}

impl<F: LogFile> LogWriter<F> {
    fn new(file: F, seq: u64, size: u64) -> Self {
        LogWriter { file, seq, size, broken: false }
    }

    /// Append and sync one frame, or leave the file as it was
    fn append(&mut self, batch: &[u8]) -> StoreResult<()> {
        if self.broken {
            return Err(StoreError::Storage("log tail unknown after failed rollback; reopen the log".to_string()));
        }
        let len = u32::try_from(batch.len())
            .map_err(|_| StoreError::Storage(format!("batch of {} bytes too large", batch.len())))?;

        let frame = encode_frame(self.seq, len, batch);
        let written = self.file.write_all(&frame).and_then(|()| self.file.flush()).and_then(|()| self.file.sync_data());
        if let Err(err) = written {
            warn!(seq = self.seq, error = %err, "log append failed, truncating to last frame");
            if let Err(truncate_err) = self.file.set_len(self.size) {
                error!(size = self.size, error = %truncate_err, "log rollback failed");
                self.broken = true;
            }
            return Err(err.into());
        }

        self.seq += 1;
        self.size += frame.len() as u64;
        Ok(())
    }
}

fn encode_frame(seq: u64, len: u32, batch: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_OVERHEAD as usize + batch.len());
    frame.extend_from_slice(&seq.to_le_bytes());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(batch);
    frame.extend_from_slice(&crc32fast::hash(batch).to_le_bytes());
    frame
}

pub struct LogKv {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

struct Replay {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    next_seq: u64,
    valid_len: u64,
}

impl LogKv {
    /// Open or create a log and replay it
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).read(true).open(&path)?;
        let replay = Self::replay(&path)?;

        let on_disk = file.metadata()?.len();
        if on_disk > replay.valid_len {
            warn!(
                path = %path.display(),
                dropped_bytes = on_disk - replay.valid_len,
                "truncating partial frame at log tail"
            );
            file.set_len(replay.valid_len)?;
        }

        debug!(path = %path.display(), frames = replay.next_seq, keys = replay.data.len(), "log kv opened");

        Ok(LogKv {
            path,
            writer: Mutex::new(LogWriter::new(file, replay.next_seq, replay.valid_len)),
            data: RwLock::new(replay.data),
        })
    }

    fn replay(path: &Path) -> StoreResult<Replay> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        let mut data = BTreeMap::new();
        let mut next_seq = 0;
        let mut valid_len = 0;

        loop {
            let mut header = [0u8; 12];
            if !read_frame_part(&mut reader, &mut header)? {
                break;
            }
            let mut seq_bytes = [0u8; 8];
            seq_bytes.copy_from_slice(&header[..8]);
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(&header[8..]);
            let seq = u64::from_le_bytes(seq_bytes);
            let len = u32::from_le_bytes(len_bytes) as u64;

            let remaining = file_len.saturating_sub(valid_len + FRAME_HEADER);
            if len + 4 > remaining {
                break;
            }

            let mut batch = vec![0u8; len as usize];
            let mut checksum_bytes = [0u8; 4];
            if !read_frame_part(&mut reader, &mut batch)? || !read_frame_part(&mut reader, &mut checksum_bytes)? {
                break;
            }

            if crc32fast::hash(&batch) != u32::from_le_bytes(checksum_bytes) {
                return Err(StoreError::CorruptedData(format!("invalid checksum at seq {}", seq)));
            }
            if seq != next_seq {
                return Err(StoreError::CorruptedData(format!("expected seq {}, found {}", next_seq, seq)));
            }

            let ops: Vec<KvOp> = bincode::deserialize(&batch)?;
            apply_ops(&mut data, ops);
            next_seq += 1;
            valid_len += FRAME_OVERHEAD + len;
        }

        Ok(Replay { data, next_seq, valid_len })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of committed frames
    pub async fn current_seq(&self) -> u64 {
        self.writer.lock().await.seq
    }

    /// Log size in bytes
    pub async fn size(&self) -> u64 {
        self.writer.lock().await.size
    }
}

/// Fill `buf` completely; `false` if the file ends first
fn read_frame_part(reader: &mut impl Read, buf: &mut [u8]) -> StoreResult<bool> {
    match reader.read_exact(buf) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl KvEngine for LogKv {
    async fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn commit(&self, txn: KvTransaction) -> StoreResult<()> {
        if txn.is_empty() {
            return Ok(());
        }
        let ops = txn.into_ops();
        let batch = bincode::serialize(&ops)?;

        // Writer lock is held until the map is updated, so commits apply in log order
        let mut writer = self.writer.lock().await;
        writer.append(&batch)?;

        let mut data = self.data.write().await;
        apply_ops(&mut data, ops);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Seek;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_commit_and_replay() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.log");

        let kv = LogKv::open(&path).unwrap();
        let mut txn = kv.begin();
        txn.put("a", "1").put("b", "2");
        kv.commit(txn).await.unwrap();
        let mut txn = kv.begin();
        txn.delete("a");
        kv.commit(txn).await.unwrap();
        assert_eq!(kv.current_seq().await, 2);
        drop(kv);

        let kv = LogKv::open(&path).unwrap();
        assert_eq!(kv.get(b"a").await.unwrap(), None);
        assert_eq!(kv.get(b"b").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(kv.current_seq().await, 2);
    }

    #[tokio::test]
    async fn test_empty_commit_writes_nothing() {
        let dir = tempdir().unwrap();
        let kv = LogKv::open(dir.path().join("kv.log")).unwrap();
        kv.commit(kv.begin()).await.unwrap();
        assert_eq!(kv.size().await, 0);
    }

    #[tokio::test]
    async fn test_partial_tail_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.log");

        let kv = LogKv::open(&path).unwrap();
        let mut txn = kv.begin();
        txn.put("a", "1");
        kv.commit(txn).await.unwrap();
        let good_len = kv.size().await;
        drop(kv);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[1, 0, 0, 0, 0, 0, 0, 0, 9]).unwrap();
        drop(file);

        let kv = LogKv::open(&path).unwrap();
        assert_eq!(kv.get(b"a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);

        let mut txn = kv.begin();
        txn.put("c", "3");
        kv.commit(txn).await.unwrap();
        drop(kv);
        let kv = LogKv::open(&path).unwrap();
        assert_eq!(kv.get(b"c").await.unwrap(), Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_checksum_mismatch_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.log");

        let kv = LogKv::open(&path).unwrap();
        let mut txn = kv.begin();
        txn.put("a", "1");
        kv.commit(txn).await.unwrap();
        drop(kv);

        // Flip the last checksum byte
        let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
        let end = file.seek(std::io::SeekFrom::End(-1)).unwrap();
        let mut last = [0u8; 1];
        file.read_exact(&mut last).unwrap();
        file.seek(std::io::SeekFrom::Start(end)).unwrap();
        file.write_all(&[last[0] ^ 0xff]).unwrap();
        drop(file);

        assert!(matches!(LogKv::open(&path), Err(StoreError::CorruptedData(_))));
    }

    #[tokio::test]
    async fn test_oversized_length_is_a_partial_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.log");

        let kv = LogKv::open(&path).unwrap();
        let mut txn = kv.begin();
        txn.put("a", "1");
        kv.commit(txn).await.unwrap();
        let good_len = kv.size().await;
        drop(kv);

        // Header for seq 1 claiming a 4 GiB batch, followed by a few bytes
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&1u64.to_le_bytes()).unwrap();
        file.write_all(&u32::MAX.to_le_bytes()).unwrap();
        file.write_all(&[7; 10]).unwrap();
        drop(file);

        let kv = LogKv::open(&path).unwrap();
        assert_eq!(kv.get(b"a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(kv.current_seq().await, 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
    }

    /// Real file that accepts at most `budget` more bytes, then fails mid-write
    struct ShortFile {
        file: File,
        budget: usize,
    }

    impl Write for ShortFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(ErrorKind::Other, "no space left"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            self.file.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl LogFile for ShortFile {
        fn sync_data(&self) -> io::Result<()> {
            self.file.sync_data()
        }

        fn set_len(&self, len: u64) -> io::Result<()> {
            self.file.set_len(len)
        }
    }

    #[tokio::test]
    async fn test_failed_append_rolls_back_to_last_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kv.log");
        let first = bincode::serialize(&vec![KvOp::Put { key: b"a".to_vec(), value: b"1".to_vec() }]).unwrap();
        let second = bincode::serialize(&vec![KvOp::Put { key: b"b".to_vec(), value: b"2".to_vec() }]).unwrap();

        let file = OpenOptions::new().create(true).append(true).open(&path).unwrap();
        let mut writer = LogWriter::new(ShortFile { file, budget: usize::MAX }, 0, 0);
        writer.append(&first).unwrap();
        let good_len = writer.size;

        // Torn write: part of the frame reaches the file before the error
        writer.file.budget = 5;
        assert!(matches!(writer.append(&second), Err(StoreError::Storage(_))));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), good_len);
        assert_eq!((writer.seq, writer.size), (1, good_len));

        writer.file.budget = usize::MAX;
        writer.append(&second).unwrap();
        drop(writer);

        let kv = LogKv::open(&path).unwrap();
        assert_eq!(kv.current_seq().await, 2);
        assert_eq!(kv.get(b"a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(kv.get(b"b").await.unwrap(), Some(b"2".to_vec()));
    }
}
