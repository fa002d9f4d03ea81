use crate::database::Store;
use crate::error::{Error, Result};
use crate::model::{Entity, User, UserPayload};
use crate::validation;
use chrono::Local;
use log::{info, warn};

/// User CRUD plus the friendship graph.
///
/// Friendship is symmetric: both sides are always written in the same
/// store transaction.
pub struct UserService {
    users: Store<User>,
}

fn not_friends(id: u64, friend_id: u64) -> Error {
    Error::NotFound(format!(
        "user {} is not in the friend list of user {}",
        friend_id, id
    ))
}

impl UserService {
    pub fn new(users: Store<User>) -> Self {
        UserService { users }
    }

    pub fn find_all(&self) -> Result<Vec<User>> {
        self.users.values()
    }

    pub fn get_by_id(&self, id: u64) -> Result<User> {
        self.users.get(id)
    }

    pub fn create(&self, payload: UserPayload) -> Result<User> {
        let draft = validation::user(&payload, Local::now().date_naive())?;
        let user = self.users.create(&|id| User::new(id, draft.clone()))?;
        info!("registered user {} with login {}", user.id, user.login);
        Ok(user)
    }

    pub fn update(&self, payload: UserPayload) -> Result<User> {
        let id = payload.id.ok_or_else(|| {
            warn!("user update without id");
            Error::validation("user id is required")
        })?;
        if !self.users.exists(id)? {
            warn!("user {} not found for update", id);
            return Err(Error::not_found(User::KIND, id));
        }
        let draft = validation::user(&payload, Local::now().date_naive())?;
        let user = self.users.update(id, &|user| {
            user.apply(draft.clone());
            Ok(())
        })?;
        info!("updated user {}", user.id);
        Ok(user)
    }

    /// Returns the `id` side after the friendship is recorded.
    pub fn add_friend(&self, id: u64, friend_id: u64) -> Result<User> {
        if !self.users.exists(id)? {
            return Err(Error::not_found(User::KIND, id));
        }
        if !self.users.exists(friend_id)? {
            return Err(Error::not_found(User::KIND, friend_id));
        }
        if id == friend_id {
            warn!("user {} tried to befriend themselves", id);
            return Err(Error::validation("a user cannot befriend themselves"));
        }
        let (user, _) = self.users.update_pair(id, friend_id, &|user, friend| {
            user.friends.insert(friend.id);
            friend.friends.insert(user.id);
            Ok(())
        })?;
        info!("users {} and {} are now friends", id, friend_id);
        Ok(user)
    }

    /// Fails with `NotFound` unless the two users are currently friends.
    pub fn remove_friend(&self, id: u64, friend_id: u64) -> Result<()> {
        if !self.users.exists(id)? {
            return Err(Error::not_found(User::KIND, id));
        }
        if id == friend_id {
            return Err(not_friends(id, friend_id));
        }
        if !self.users.exists(friend_id)? {
            return Err(not_friends(id, friend_id));
        }
        self.users.update_pair(id, friend_id, &|user, friend| {
            if !user.friends.remove(&friend.id) {
                return Err(not_friends(user.id, friend.id));
            }
            friend.friends.remove(&user.id);
            Ok(())
        })?;
        info!("users {} and {} are no longer friends", id, friend_id);
        Ok(())
    }

    /// Friends of `id`, ascending by id.
    pub fn friends(&self, id: u64) -> Result<Vec<User>> {
        let user = self.users.get(id)?;
        user.friends
            .iter()
            .map(|friend_id| self.users.get(*friend_id))
            .collect()
    }

    /// Users that are friends of both `id` and `other_id`, ascending by id.
    /// The two queried users never appear in the result.
    pub fn common_friends(&self, id: u64, other_id: u64) -> Result<Vec<User>> {
        let user = self.users.get(id)?;
        let other = self.users.get(other_id)?;
        user.friends
            .intersection(&other.friends)
            .filter(|friend_id| **friend_id != id && **friend_id != other_id)
            .map(|friend_id| self.users.get(*friend_id))
            .collect()
    }
}
