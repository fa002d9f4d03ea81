use crate::database::Store;
use crate::error::{Error, Result};
use crate::model::{Entity, Film, FilmPayload, User};
use crate::validation;
use log::{debug, info, warn};
use std::convert::TryFrom;

pub const DEFAULT_TOP_COUNT: i64 = 10;

/// Film CRUD plus likes and the popularity ranking.
pub struct FilmService {
    films: Store<Film>,
    users: Store<User>,
}

impl FilmService {
    pub fn new(films: Store<Film>, users: Store<User>) -> Self {
        FilmService { films, users }
    }

    pub fn find_all(&self) -> Result<Vec<Film>> {
        self.films.values()
    }

    pub fn get_by_id(&self, id: u64) -> Result<Film> {
        self.films.get(id)
    }

    pub fn create(&self, payload: FilmPayload) -> Result<Film> {
        let draft = validation::film(&payload)?;
        let film = self.films.create(&|id| Film::new(id, draft.clone()))?;
        info!("created film {} ({})", film.id, film.name);
        Ok(film)
    }

    pub fn update(&self, payload: FilmPayload) -> Result<Film> {
        let id = payload.id.ok_or_else(|| {
            warn!("film update without id");
            Error::validation("film id is required")
        })?;
        if !self.films.exists(id)? {
            warn!("film {} not found for update", id);
            return Err(Error::not_found(Film::KIND, id));
        }
        let draft = validation::film(&payload)?;
        let film = self.films.update(id, &|film| {
            film.apply(draft.clone());
            Ok(())
        })?;
        info!("updated film {}", film.id);
        Ok(film)
    }

    /// Liking the same film twice has no further effect.
    pub fn add_like(&self, film_id: u64, user_id: u64) -> Result<Film> {
        if !self.films.exists(film_id)? {
            return Err(Error::not_found(Film::KIND, film_id));
        }
        if !self.users.exists(user_id)? {
            return Err(Error::not_found(User::KIND, user_id));
        }
        let film = self.films.update(film_id, &|film| {
            film.likes.insert(user_id);
            Ok(())
        })?;
        info!("user {} likes film {}", user_id, film_id);
        Ok(film)
    }

    /// Fails with `NotFound` unless the user currently likes the film.
    pub fn remove_like(&self, film_id: u64, user_id: u64) -> Result<()> {
        self.films.update(film_id, &|film| {
            if film.likes.remove(&user_id) {
                Ok(())
            } else {
                Err(Error::NotFound(format!(
                    "user {} has not liked film {}",
                    user_id, film_id
                )))
            }
        })?;
        info!("user {} no longer likes film {}", user_id, film_id);
        Ok(())
    }

    /// Films by descending like count, ties by ascending id.
    pub fn top_films(&self, count: i64) -> Result<Vec<Film>> {
        if count < 0 {
            return Err(Error::validation("count must not be negative"));
        }
        let mut films = self.films.values()?;
        films.sort_by(|a, b| {
            b.likes
                .len()
                .cmp(&a.likes.len())
                .then_with(|| a.id.cmp(&b.id))
        });
        films.truncate(usize::try_from(count).unwrap_or(usize::MAX));
        debug!("top {} films requested, returning {}", count, films.len());
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Stores;
    use crate::model::UserPayload;
    use crate::users::UserService;
    use chrono::NaiveDate;

    fn services() -> (FilmService, UserService) {
        let stores = Stores::temporary().unwrap();
        (
            FilmService::new(stores.films.clone(), stores.users.clone()),
            UserService::new(stores.users),
        )
    }

    fn film(name: &str) -> FilmPayload {
        FilmPayload {
            id: None,
            name: Some(name.to_owned()),
            description: Some("...".to_owned()),
            release_date: NaiveDate::from_ymd_opt(1999, 3, 31),
            duration: Some(136),
        }
    }

    fn user(login: &str) -> UserPayload {
        UserPayload {
            id: None,
            email: Some(format!("{}@example.com", login)),
            login: Some(login.to_owned()),
            name: None,
            birthday: NaiveDate::from_ymd_opt(1990, 1, 1),
        }
    }

    #[test]
    fn create_assigns_increasing_ids() {
        let (films, _) = services();
        let matrix = films.create(film("Matrix")).unwrap();
        assert_eq!(matrix.id, 1);
        assert!(matrix.likes.is_empty());
        assert_eq!(films.create(film("Alien")).unwrap().id, 2);
        assert_eq!(films.find_all().unwrap().len(), 2);
    }

    #[test]
    fn create_rejects_early_release() {
        let (films, _) = services();
        let mut payload = film("Old");
        payload.release_date = NaiveDate::from_ymd_opt(1800, 1, 1);
        assert!(matches!(films.create(payload), Err(Error::Validation(_))));
        assert!(films.find_all().unwrap().is_empty());
    }

    #[test]
    fn get_unknown_film() {
        let (films, _) = services();
        assert!(matches!(films.get_by_id(42), Err(Error::NotFound(_))));
    }

    #[test]
    fn update_keeps_id_and_likes() {
        let (films, users) = services();
        let created = films.create(film("Matrix")).unwrap();
        let alice = users.create(user("alice")).unwrap();
        films.add_like(created.id, alice.id).unwrap();

        let mut payload = film("The Matrix");
        payload.id = Some(created.id);
        payload.duration = Some(138);
        let updated = films.update(payload).unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "The Matrix");
        assert_eq!(updated.duration, 138);
        assert!(updated.likes.contains(&alice.id));
        assert_eq!(films.get_by_id(created.id).unwrap(), updated);
    }

    #[test]
    fn update_requires_known_id() {
        let (films, _) = services();
        assert!(matches!(
            films.update(film("Matrix")),
            Err(Error::Validation(_))
        ));
        let mut payload = film("Matrix");
        payload.id = Some(9);
        assert!(matches!(films.update(payload), Err(Error::NotFound(_))));
    }

    #[test]
    fn update_validates_payload() {
        let (films, _) = services();
        let created = films.create(film("Matrix")).unwrap();
        let mut payload = film("");
        payload.id = Some(created.id);
        assert!(matches!(films.update(payload), Err(Error::Validation(_))));
        assert_eq!(films.get_by_id(created.id).unwrap().name, "Matrix");
    }

    #[test]
    fn like_is_idempotent() {
        let (films, users) = services();
        let matrix = films.create(film("Matrix")).unwrap();
        let alice = users.create(user("alice")).unwrap();
        films.add_like(matrix.id, alice.id).unwrap();
        let liked = films.add_like(matrix.id, alice.id).unwrap();
        assert_eq!(liked.likes.len(), 1);
    }

    #[test]
    fn like_needs_existing_film_and_user() {
        let (films, users) = services();
        let matrix = films.create(film("Matrix")).unwrap();
        let alice = users.create(user("alice")).unwrap();
        assert!(matches!(
            films.add_like(99, alice.id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            films.add_like(matrix.id, 99),
            Err(Error::NotFound(_))
        ));
        assert!(films.get_by_id(matrix.id).unwrap().likes.is_empty());
    }

    #[test]
    fn removing_a_missing_like_fails() {
        let (films, users) = services();
        let matrix = films.create(film("Matrix")).unwrap();
        let alice = users.create(user("alice")).unwrap();
        assert!(matches!(
            films.remove_like(matrix.id, alice.id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            films.remove_like(77, alice.id),
            Err(Error::NotFound(_))
        ));

        films.add_like(matrix.id, alice.id).unwrap();
        films.remove_like(matrix.id, alice.id).unwrap();
        assert!(films.get_by_id(matrix.id).unwrap().likes.is_empty());
    }

    #[test]
    fn top_films_by_likes() {
        let (films, users) = services();
        let zero = films.create(film("Zero")).unwrap();
        let two = films.create(film("Two")).unwrap();
        let one = films.create(film("One")).unwrap();
        let a = users.create(user("a")).unwrap();
        let b = users.create(user("b")).unwrap();
        films.add_like(two.id, a.id).unwrap();
        films.add_like(two.id, b.id).unwrap();
        films.add_like(one.id, a.id).unwrap();

        let top: Vec<u64> = films.top_films(2).unwrap().iter().map(|f| f.id).collect();
        assert_eq!(top, vec![two.id, one.id]);

        let all: Vec<u64> = films.top_films(50).unwrap().iter().map(|f| f.id).collect();
        assert_eq!(all, vec![two.id, one.id, zero.id]);

        assert!(films.top_films(0).unwrap().is_empty());
    }

    #[test]
    fn top_films_ties_by_id() {
        let (films, _) = services();
        for name in &["A", "B", "C"] {
            films.create(film(name)).unwrap();
        }
        let ids: Vec<u64> = films
            .top_films(DEFAULT_TOP_COUNT)
            .unwrap()
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn top_films_with_huge_count_returns_everything() {
        let (films, _) = services();
        films.create(film("A")).unwrap();
        films.create(film("B")).unwrap();
        assert_eq!(films.top_films(i64::MAX).unwrap().len(), 2);
    }

    #[test]
    fn top_films_rejects_negative_count() {
        let (films, _) = services();
        assert!(matches!(films.top_films(-1), Err(Error::Validation(_))));
    }
}
