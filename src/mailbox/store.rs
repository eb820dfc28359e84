//! On-disk mail storage: one directory per user, one file per message.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

// Disambiguates deliveries that land within the same nanosecond.
static DELIVERY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Handle on the store's root directory. Cheap to clone, safe to share;
/// concurrent sessions for the same user are intentionally not locked
/// against each other.
#[derive(Debug, Clone)]
pub struct MailStore {
    root: PathBuf,
}

impl MailStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join(user)
    }

    /// Writes one copy of `data` into every recipient's directory, creating
    /// directories on demand. Filenames sort in delivery order.
    pub fn deliver(&self, data: &str, recipients: &[String]) -> io::Result<()> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let seq = DELIVERY_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = format!("msg.{stamp:020}.{seq:06}");

        for recipient in recipients {
            let dir = self.user_dir(recipient);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(&name), data)?;
            debug!(%recipient, message = %name, "delivered message");
        }
        Ok(())
    }

    /// Snapshots `user`'s maildrop in filename order. A missing directory is
    /// an empty maildrop.
    pub fn load_maildrop(&self, user: &str) -> io::Result<Maildrop> {
        let dir = self.user_dir(user);
        let mut paths: Vec<PathBuf> = match fs::read_dir(&dir) {
            Ok(iter) => iter
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let size = fs::metadata(&path)?.len();
            entries.push(MailItem {
                path,
                size,
                deleted: false,
            });
        }
        Ok(Maildrop { entries })
    }
}

/// One message in a loaded maildrop.
#[derive(Debug)]
pub struct MailItem {
    path: PathBuf,
    size: u64,
    deleted: bool,
}

impl MailItem {
    /// Byte size of the backing file at load time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the full stored content.
    pub fn read(&self) -> io::Result<String> {
        Ok(String::from_utf8_lossy(&fs::read(&self.path)?).into_owned())
    }
}

/// A user's mailbox as seen by one retrieval session.
///
/// Indices are stable 1-based positions for the lifetime of the session:
/// a deletion mark makes an entry absent without shifting its neighbours.
/// Marks become permanent only through [`Maildrop::commit`].
#[derive(Debug, Default)]
pub struct Maildrop {
    entries: Vec<MailItem>,
}

impl Maildrop {
    /// Entry count at load time, deletion marks included. This is the
    /// iteration bound for LIST and the commit accounting baseline.
    pub fn initial_count(&self) -> usize {
        self.entries.len()
    }

    /// Non-deleted message count.
    pub fn message_count(&self) -> usize {
        self.entries.iter().filter(|m| !m.deleted).count()
    }

    /// Total byte size over non-deleted messages.
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .filter(|m| !m.deleted)
            .map(|m| m.size)
            .sum()
    }

    /// Looks up a 1-based index; deleted and nonexistent are both absent.
    pub fn get(&self, index: usize) -> Option<&MailItem> {
        self.entries
            .get(index.checked_sub(1)?)
            .filter(|m| !m.deleted)
    }

    /// True when `index` falls inside the session's stable index range.
    pub fn in_range(&self, index: usize) -> bool {
        index >= 1 && index <= self.entries.len()
    }

    pub fn is_deleted(&self, index: usize) -> bool {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .is_some_and(|m| m.deleted)
    }

    /// Marks a message deleted; false for deleted or out-of-range indices.
    pub fn mark_deleted(&mut self, index: usize) -> bool {
        match index
            .checked_sub(1)
            .and_then(|i| self.entries.get_mut(i))
            .filter(|m| !m.deleted)
        {
            Some(item) => {
                item.deleted = true;
                true
            }
            None => false,
        }
    }

    /// Clears every deletion mark; returns the restored message count.
    pub fn reset_deleted(&mut self) -> usize {
        for item in &mut self.entries {
            item.deleted = false;
        }
        self.entries.len()
    }

    /// `(index, item)` pairs over non-deleted entries, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &MailItem)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.deleted)
            .map(|(i, m)| (i + 1, m))
    }

    /// Physically removes every marked message from storage; returns how
    /// many were destroyed. A file another session already removed still
    /// counts: the mark is satisfied either way.
    pub fn commit(self) -> io::Result<usize> {
        let mut destroyed = 0;
        for item in self.entries.into_iter().filter(|m| m.deleted) {
            match fs::remove_file(&item.path) {
                Ok(()) => destroyed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => destroyed += 1,
                Err(e) => return Err(e),
            }
        }
        Ok(destroyed)
    }
}
