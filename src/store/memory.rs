// In-memory datastore
// Keeps everything in process memory, lost on restart

use std::sync::RwLock;

use super::{Datastore, Message, StoreError, StoreResult, UserLocation};

#[derive(Default)]
pub struct MemoryDatastore {
    messages: RwLock<Vec<Message>>,
    locations: RwLock<Vec<UserLocation>>,
}

impl MemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Datastore for MemoryDatastore {
    fn get_messages(&self, user: &str) -> StoreResult<Vec<Message>> {
        let messages = self.messages.read().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<Message> = messages.iter().filter(|m| m.user == user).cloned().collect();
        // Stable sort keeps insertion order for equal timestamps, reversed below
        found.reverse();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(found)
    }

    fn store_message(&self, message: &Message) -> StoreResult<()> {
        self.messages
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(message.clone());
        Ok(())
    }

    fn store_location(&self, location: &UserLocation) -> StoreResult<()> {
        self.locations
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .push(location.clone());
        Ok(())
    }

    fn get_locations(&self, user: &str) -> StoreResult<Vec<UserLocation>> {
        let locations = self.locations.read().map_err(|_| StoreError::Poisoned)?;
        Ok(locations.iter().filter(|l| l.user == user).cloned().collect())
    }
}
