use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Something that lives in an [`EntityStore`](crate::database::EntityStore).
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the collection, also used as the sled tree name.
    const COLLECTION: &'static str;
    /// Singular name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> u64;
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i64,
    pub likes: BTreeSet<u64>,
}

impl Film {
    pub fn new(id: u64, draft: FilmDraft) -> Self {
        Film {
            id,
            name: draft.name,
            description: draft.description,
            release_date: draft.release_date,
            duration: draft.duration,
            likes: BTreeSet::new(),
        }
    }

    /// Replaces the mutable fields, keeping id and likes.
    pub fn apply(&mut self, draft: FilmDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.release_date = draft.release_date;
        self.duration = draft.duration;
    }
}

impl Entity for Film {
    const COLLECTION: &'static str = "films";
    const KIND: &'static str = "film";

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
    pub friends: BTreeSet<u64>,
}

impl User {
    pub fn new(id: u64, draft: UserDraft) -> Self {
        User {
            id,
            email: draft.email,
            login: draft.login,
            name: draft.name,
            birthday: draft.birthday,
            friends: BTreeSet::new(),
        }
    }

    /// Replaces the mutable fields, keeping id and friends.
    pub fn apply(&mut self, draft: UserDraft) {
        self.email = draft.email;
        self.login = draft.login;
        self.name = draft.name;
        self.birthday = draft.birthday;
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}

/// Film as submitted by a client. Every field may be missing.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilmPayload {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub duration: Option<i64>,
}

/// User as submitted by a client. Every field may be missing.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Option<u64>,
    pub email: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Film fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmDraft {
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: i64,
}

/// User fields that passed validation, with the display name resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}
