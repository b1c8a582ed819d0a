//! Persistent player identities
//!
//! An identity is keyed by player name and remembers the score earned under
//! that name together with the network origin (remote IP) that first claimed
//! it. Identities outlive connections: a player who disconnects and rejoins
//! from the same origin gets their score back. Only the daily reset or the
//! operator `delete` command removes them.

use std::collections::BTreeMap;
use thiserror::Error;

/// Reasons a join request is refused. The display text is sent to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRejection {
    #[error("Server version: {server_version}")]
    VersionMismatch { server_version: String },
    #[error("The name {name} is taken by another player!")]
    NameTaken { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub score: u32,
    pub origin: String,
}

/// Maps player names to their durable identity records
#[derive(Debug, Default)]
pub struct SessionRegistry {
    identities: BTreeMap<String, Identity>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for `origin`
    ///
    /// Creates the identity with a zero score on first use. Fails with
    /// `NameTaken` when the name is already bound to a different origin.
    pub fn bind(&mut self, name: &str, origin: &str) -> Result<(), JoinRejection> {
        match self.identities.get(name) {
            Some(identity) if identity.origin != origin => Err(JoinRejection::NameTaken {
                name: name.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.identities.insert(
                    name.to_string(),
                    Identity {
                        score: 0,
                        origin: origin.to_string(),
                    },
                );
                Ok(())
            }
        }
    }

    /// Credits one kill to `name`. Returns false if the identity no longer exists.
    pub fn add_score(&mut self, name: &str) -> bool {
        match self.identities.get_mut(name) {
            Some(identity) => {
                identity.score += 1;
                true
            }
            None => false,
        }
    }

    pub fn score(&self, name: &str) -> Option<u32> {
        self.identities.get(name).map(|identity| identity.score)
    }

    pub fn get(&self, name: &str) -> Option<&Identity> {
        self.identities.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Identity> {
        self.identities.remove(name)
    }

    /// All identities ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Identity)> {
        self.identities.iter()
    }

    pub fn clear(&mut self) {
        self.identities.clear();
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
