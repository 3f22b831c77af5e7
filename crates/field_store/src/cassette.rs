//! Recording and replaying the intents dispatched to a store.
//!
//! A file cassette is a sequence of frames, each a little-endian `u32` byte
//! length followed by one encoded [`CassetteEntry`].

use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use serde::{de::DeserializeOwned, Serialize};

use crate::*;

/// One recorded action, numbered in the order it was recorded.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CassetteEntry<A> {
    pub seq: u64,
    pub action: A,
}

pub trait Cassette<A> {
    fn initialize(&self) -> StoreResult<()>;

    fn record_action(&self, action: &A) -> StoreResult<()>;

    fn retrieve_actions(&self) -> StoreResult<Vec<CassetteEntry<A>>>;

    /// Feed every recorded action, in order, through `state`.
    fn playback_actions<S>(&self, state: &mut S) -> StoreResult<Vec<S::Effect>>
    where
        S: State<Action = A>,
    {
        Ok(self
            .retrieve_actions()?
            .into_iter()
            .map(|entry| state.transition(entry.action))
            .collect())
    }
}

/// The unit cassette records nothing and plays back nothing.
impl<A> Cassette<A> for () {
    fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    fn record_action(&self, _: &A) -> StoreResult<()> {
        Ok(())
    }

    fn retrieve_actions(&self) -> StoreResult<Vec<CassetteEntry<A>>> {
        Ok(Vec::new())
    }
}

#[derive(Debug)]
pub struct FileCassette<E = RmpEncoder> {
    path: PathBuf,
    encoder: E,
    erase_existing: bool,
    /// `None` until the file has been initialized or its frames counted.
    next_seq: Mutex<Option<u64>>,
}

impl<E: Encoder + Default> From<PathBuf> for FileCassette<E> {
    fn from(path: PathBuf) -> Self {
        Self::new(path, Default::default(), true)
    }
}

impl From<&JournalConfig> for FileCassette<JournalEncoding> {
    fn from(config: &JournalConfig) -> Self {
        Self::new(config.path.clone(), config.encoding, config.erase_existing)
    }
}

impl<E: Encoder> FileCassette<E> {
    pub fn new(path: PathBuf, encoder: E, erase_existing: bool) -> Self {
        Self {
            path,
            encoder,
            erase_existing,
            next_seq: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Walk the frames of a journal file, handing each payload to `each`.
/// Returns the number of frames read.
fn read_frames(path: &Path, mut each: impl FnMut(&[u8]) -> StoreResult<()>) -> StoreResult<u64> {
    let mut f = BufReader::new(File::open(path)?);
    let mut lbuf = [0; 4];
    let mut abuf = Vec::new();
    let mut count = 0;
    loop {
        match f.read_exact(&mut lbuf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(count),
            Err(e) => return Err(e.into()),
        }
        let len = u32::from_le_bytes(lbuf) as usize;
        // The buffer only grows as far as the bytes actually present.
        abuf.clear();
        (&mut f).take(len as u64).read_to_end(&mut abuf)?;
        if abuf.len() != len {
            tracing::warn!(?path, frame = count, len, read = abuf.len(), "truncated journal frame");
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("journal frame {} declares {} bytes but only {} remain", count, len, abuf.len()),
            )
            .into());
        }
        each(&abuf)?;
        count += 1;
    }
}

impl<A, E> Cassette<A> for FileCassette<E>
where
    A: Serialize + DeserializeOwned,
    E: Encoder,
{
    fn initialize(&self) -> StoreResult<()> {
        let mut f = File::options();
        f.write(true);
        if self.erase_existing {
            f.create(true).truncate(true).open(&self.path)?;
        } else {
            f.create_new(true).open(&self.path)?;
        }
        *self.next_seq.lock() = Some(0);
        Ok(())
    }

    fn record_action(&self, action: &A) -> StoreResult<()> {
        let mut next_seq = self.next_seq.lock();
        let seq = match *next_seq {
            Some(seq) => seq,
            None if self.path.exists() => read_frames(&self.path, |_| Ok(()))?,
            None => 0,
        };
        let entry = CassetteEntry { seq, action };
        let bytes = self.encoder.encode(&entry)?;
        let len = u32::try_from(bytes.len()).map_err(|_| {
            std::io::Error::new(ErrorKind::InvalidInput, "journal frame exceeds u32::MAX bytes")
        })?;
        let mut f = File::options().append(true).open(&self.path)?;
        f.write_all(&len.to_le_bytes())?;
        f.write_all(&bytes)?;
        *next_seq = Some(seq + 1);
        Ok(())
    }

    fn retrieve_actions(&self) -> StoreResult<Vec<CassetteEntry<A>>> {
        let mut actions: Vec<CassetteEntry<A>> = Vec::new();
        read_frames(&self.path, |frame| {
            actions.push(self.encoder.decode(frame)?);
            Ok(())
        })?;
        Ok(actions)
    }
}

/// Keeps recorded actions in memory. Clones share the same recording.
#[derive(Clone, Debug)]
pub struct MemoryCassette<A> {
    actions: std::sync::Arc<parking_lot::RwLock<Vec<CassetteEntry<A>>>>,
}

impl<A> Default for MemoryCassette<A> {
    fn default() -> Self {
        Self {
            actions: Default::default(),
        }
    }
}

impl<A> MemoryCassette<A> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<A: Clone> Cassette<A> for MemoryCassette<A> {
    fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }

    fn record_action(&self, action: &A) -> StoreResult<()> {
        let mut actions = self.actions.write();
        let seq = actions.len() as u64;
        actions.push(CassetteEntry {
            seq,
            action: action.clone(),
        });
        Ok(())
    }

    fn retrieve_actions(&self) -> StoreResult<Vec<CassetteEntry<A>>> {
        Ok(self.actions.read().clone())
    }
}
