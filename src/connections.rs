//! Connection graph: request/accept lifecycle between two handles.
//!
//! A row is directed while pending (`from` asked `to`) and undirected once
//! connected. At most one row exists per unordered pair, whatever its status;
//! the storage layer enforces that with a unique index, so a re-request or a
//! racing request from the other side lands on the existing row.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::identity::{IdentityLookup, Profile};
use crate::storage::{ConnectionRow, ConnectionStatus, Storage};

/// Relationship between two handles as seen from the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    NotConnected,
    Connected,
    /// The first handle asked and is waiting on the second.
    OutgoingPending,
    /// The second handle asked and is waiting on the first.
    ReceivedRequest,
}

/// A pending request addressed to the viewer, with the requester's display
/// fields.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    pub id: i64,
    pub from_username: String,
    pub name: String,
    pub profile_photo: Option<String>,
    pub major: Option<String>,
    pub requested_at: u64,
}

/// Ask `to` for a connection on behalf of `from`.
///
/// Pending and connected rows are returned unchanged. A rejected row is
/// reopened as a fresh pending request in the caller's direction.
pub fn request_connection(
    storage: &Storage,
    from: &str,
    to: &str,
    now: u64,
) -> Result<ConnectionRow> {
    if from == to {
        return Err(Error::InvalidState(format!(
            "{from} cannot connect to themselves"
        )));
    }

    if let Some(existing) = storage.find_connection_between(from, to)? {
        if existing.status != ConnectionStatus::Rejected {
            debug!(
                "connection-request: {} -> {} already {}",
                from,
                to,
                existing.status.as_str()
            );
            return Ok(existing);
        }
        info!("connection-request: reopening rejected {} -> {}", from, to);
        return Ok(storage.reopen_connection(existing.id, from, to, now)?);
    }

    match storage.insert_connection(from, to, now) {
        Ok(row) => {
            info!("connection-request: {} -> {}", from, to);
            Ok(row)
        }
        Err(e) if e.is_unique_violation() => {
            // Lost a race with another request for the same pair.
            storage
                .find_connection_between(from, to)?
                .ok_or(Error::Storage(e))
        }
        Err(e) => Err(e.into()),
    }
}

/// How `a` relates to `b`.
pub fn status_between(storage: &Storage, a: &str, b: &str) -> Result<PairStatus> {
    if let Some(row) = storage.find_connection(a, b)? {
        match row.status {
            ConnectionStatus::Connected => return Ok(PairStatus::Connected),
            ConnectionStatus::Pending => return Ok(PairStatus::OutgoingPending),
            ConnectionStatus::Rejected => {}
        }
    }
    if let Some(row) = storage.find_connection(b, a)? {
        match row.status {
            ConnectionStatus::Connected => return Ok(PairStatus::Connected),
            ConnectionStatus::Pending => return Ok(PairStatus::ReceivedRequest),
            ConnectionStatus::Rejected => {}
        }
    }
    Ok(PairStatus::NotConnected)
}

/// Accept the pending request `from -> to`.
pub fn accept(storage: &Storage, from: &str, to: &str, now: u64) -> Result<()> {
    respond(storage, from, to, ConnectionStatus::Connected, now)?;
    info!("connection-accept: {} -> {}", from, to);
    Ok(())
}

/// Reject the pending request `from -> to`.
pub fn reject(storage: &Storage, from: &str, to: &str, now: u64) -> Result<()> {
    respond(storage, from, to, ConnectionStatus::Rejected, now)?;
    info!("connection-reject: {} -> {}", from, to);
    Ok(())
}

fn respond(
    storage: &Storage,
    from: &str,
    to: &str,
    status: ConnectionStatus,
    now: u64,
) -> Result<()> {
    if !storage.respond_to_connection(from, to, status, now)? {
        return Err(Error::NotFound(format!(
            "no pending connection request from {from} to {to}"
        )));
    }
    Ok(())
}

/// Remove any row between `a` and `b`. Succeeds when there is none.
pub fn disconnect(storage: &Storage, a: &str, b: &str) -> Result<()> {
    let removed = storage.delete_connections_between(a, b)?;
    if removed > 0 {
        info!("connection-disconnect: {} <-> {}", a, b);
    }
    Ok(())
}

/// Handles connected to `username`, including ones that no longer resolve.
pub fn connected_usernames(storage: &Storage, username: &str) -> Result<Vec<String>> {
    Ok(storage.list_connected_usernames(username)?)
}

/// Profiles of everyone connected to `username`. Handles that no longer
/// resolve are skipped.
pub fn connections_of(storage: &Storage, username: &str) -> Result<Vec<Profile>> {
    let mut profiles = Vec::new();
    for other in storage.list_connected_usernames(username)? {
        match storage.resolve(&other)? {
            Some(profile) => profiles.push(profile),
            None => debug!("connections: skipping unresolvable {}", other),
        }
    }
    Ok(profiles)
}

/// Pending requests addressed to `username`, oldest first.
pub fn pending_requests_for(storage: &Storage, username: &str) -> Result<Vec<PendingRequest>> {
    let mut requests = Vec::new();
    for row in storage.list_pending_requests_to(username)? {
        let Some(profile) = storage.resolve(&row.from_username)? else {
            debug!("connections: skipping request from unresolvable {}", row.from_username);
            continue;
        };
        requests.push(PendingRequest {
            id: row.id,
            name: profile.display_name(),
            profile_photo: profile.profile_photo,
            major: profile.major,
            from_username: row.from_username,
            requested_at: row.requested_at,
        });
    }
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UserRow;

    fn test_storage() -> Storage {
        let storage = Storage::open_in_memory().unwrap();
        for name in ["alice", "bob", "carol"] {
            storage
                .upsert_user(&UserRow {
                    username: name.to_string(),
                    first_name: name.to_uppercase(),
                    last_name: "Test".to_string(),
                    profile_photo: None,
                    major: None,
                })
                .unwrap();
        }
        storage
    }

    #[test]
    fn test_request_then_accept_is_symmetric() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        assert_eq!(
            status_between(&storage, "alice", "bob").unwrap(),
            PairStatus::OutgoingPending
        );
        assert_eq!(
            status_between(&storage, "bob", "alice").unwrap(),
            PairStatus::ReceivedRequest
        );

        accept(&storage, "alice", "bob", 20).unwrap();
        assert_eq!(
            status_between(&storage, "alice", "bob").unwrap(),
            PairStatus::Connected
        );
        assert_eq!(
            status_between(&storage, "bob", "alice").unwrap(),
            PairStatus::Connected
        );
    }

    #[test]
    fn test_rerequest_is_noop() {
        let storage = test_storage();
        let first = request_connection(&storage, "alice", "bob", 10).unwrap();
        let again = request_connection(&storage, "alice", "bob", 30).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.requested_at, 10);

        // The other side asking lands on the same pending row.
        let reverse = request_connection(&storage, "bob", "alice", 40).unwrap();
        assert_eq!(reverse.id, first.id);
        assert_eq!(reverse.from_username, "alice");
    }

    #[test]
    fn test_rejected_request_can_be_reopened() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        reject(&storage, "alice", "bob", 20).unwrap();
        assert_eq!(
            status_between(&storage, "alice", "bob").unwrap(),
            PairStatus::NotConnected
        );

        let reopened = request_connection(&storage, "alice", "bob", 30).unwrap();
        assert_eq!(reopened.status, ConnectionStatus::Pending);
        assert_eq!(reopened.requested_at, 30);
        assert!(reopened.responded_at.is_none());
    }

    #[test]
    fn test_rejected_recipient_can_ask_back() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        reject(&storage, "alice", "bob", 20).unwrap();

        let row = request_connection(&storage, "bob", "alice", 30).unwrap();
        assert_eq!(row.from_username, "bob");
        assert_eq!(
            status_between(&storage, "alice", "bob").unwrap(),
            PairStatus::ReceivedRequest
        );
    }

    #[test]
    fn test_accept_wrong_direction_is_not_found() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        let err = accept(&storage, "bob", "alice", 20).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = reject(&storage, "carol", "alice", 20).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_self_request_is_invalid() {
        let storage = test_storage();
        let err = request_connection(&storage, "alice", "alice", 10).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        accept(&storage, "alice", "bob", 20).unwrap();

        disconnect(&storage, "bob", "alice").unwrap();
        disconnect(&storage, "bob", "alice").unwrap();
        assert_eq!(
            status_between(&storage, "alice", "bob").unwrap(),
            PairStatus::NotConnected
        );
        assert!(connections_of(&storage, "alice").unwrap().is_empty());
    }

    #[test]
    fn test_connections_and_requests_skip_unknown_users() {
        let storage = test_storage();
        request_connection(&storage, "alice", "bob", 10).unwrap();
        accept(&storage, "alice", "bob", 11).unwrap();
        request_connection(&storage, "ghost", "bob", 12).unwrap();
        accept(&storage, "ghost", "bob", 13).unwrap();
        request_connection(&storage, "carol", "bob", 14).unwrap();
        request_connection(&storage, "phantom", "bob", 15).unwrap();

        let connected: Vec<String> = connections_of(&storage, "bob")
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(connected, vec!["alice"]);
        assert_eq!(
            connected_usernames(&storage, "bob").unwrap(),
            vec!["alice", "ghost"]
        );

        let pending = pending_requests_for(&storage, "bob").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].from_username, "carol");
        assert_eq!(pending[0].name, "CAROL Test");
    }
}
