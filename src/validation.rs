//! Field checks run before anything reaches the store.
//!
//! Rules are checked in a fixed order and the first failure wins.

use crate::error::{Error, Result};
use crate::model::{FilmDraft, FilmPayload, UserDraft, UserPayload};
use chrono::NaiveDate;
use log::{debug, warn};

pub const MAX_DESCRIPTION_LEN: usize = 200;

/// The first public film screening, 1895-12-28.
fn earliest_release() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

fn reject(message: &str) -> Error {
    warn!("rejected payload: {}", message);
    Error::validation(message)
}

pub fn film(payload: &FilmPayload) -> Result<FilmDraft> {
    if is_blank(payload.name.as_deref()) {
        return Err(reject("film name must not be blank"));
    }
    let description = payload.description.clone().unwrap_or_default();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(reject("film description must be at most 200 characters"));
    }
    let release_date = payload
        .release_date
        .ok_or_else(|| reject("film release date is required"))?;
    if release_date < earliest_release() {
        return Err(reject("film release date must not be before 1895-12-28"));
    }
    let duration = match payload.duration {
        Some(duration) if duration > 0 => duration,
        _ => return Err(reject("film duration must be positive")),
    };
    Ok(FilmDraft {
        name: payload.name.clone().unwrap_or_default(),
        description,
        release_date,
        duration,
    })
}

/// Validates a user against `today`. A blank name falls back to the login.
pub fn user(payload: &UserPayload, today: NaiveDate) -> Result<UserDraft> {
    let email = match payload.email.as_deref() {
        Some(email) if !email.trim().is_empty() && email.contains('@') => email.to_owned(),
        _ => return Err(reject("email is required and must contain '@'")),
    };
    let login = match payload.login.as_deref() {
        Some(login) if !login.is_empty() && !login.chars().any(char::is_whitespace) => {
            login.to_owned()
        }
        _ => return Err(reject("login is required and must not contain whitespace")),
    };
    let name = if is_blank(payload.name.as_deref()) {
        debug!("no name given, using login {}", login);
        login.clone()
    } else {
        payload.name.clone().unwrap_or_default()
    };
    let birthday = payload
        .birthday
        .ok_or_else(|| reject("birthday is required"))?;
    if birthday > today {
        return Err(reject("birthday must not be in the future"));
    }
    Ok(UserDraft {
        email,
        login,
        name,
        birthday,
    })
}
