use sha2::{Digest, Sha256};

use crate::session::Session;

/// Order-sensitive SHA-256 over the identifying fields of every session.
///
/// Two uploads with the same fingerprint carry the same charging history,
/// which lets a host skip recomputation.
pub fn content_fingerprint(sessions: &[Session]) -> String {
    let mut hasher = Sha256::new();
    for s in sessions {
        hasher.update(
            format!(
                "{}|{}|{}|{:.2}|{:.2}|{:.2}|{:.2}|",
                s.id,
                s.start_time.timestamp(),
                s.end_time.timestamp(),
                s.soc_start,
                s.soc_end,
                s.energy_from_grid,
                s.energy_added,
            )
            .as_bytes(),
        );
    }
    format!("{:x}", hasher.finalize())
}
