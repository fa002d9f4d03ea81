use crate::error::Error;
use crate::films::{FilmService, DEFAULT_TOP_COUNT};
use crate::model::{FilmPayload, UserPayload};
use crate::users::UserService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

type Films = web::Data<FilmService>;
type Users = web::Data<UserService>;
type ApiResult = Result<HttpResponse, Error>;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/films", web::get().to(list_films))
        .route("/films", web::post().to(create_film))
        .route("/films", web::put().to(update_film))
        .route("/films/popular", web::get().to(top_films))
        .route("/films/{id}", web::get().to(get_film))
        .route("/films/{id}/like/{user_id}", web::put().to(like_film))
        .route("/films/{id}/like/{user_id}", web::delete().to(unlike_film))
        .route("/users", web::get().to(list_users))
        .route("/users", web::post().to(create_user))
        .route("/users", web::put().to(update_user))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}/friends", web::get().to(list_friends))
        .route("/users/{id}/friends/{friend_id}", web::put().to(add_friend))
        .route(
            "/users/{id}/friends/{friend_id}",
            web::delete().to(remove_friend),
        )
        .route(
            "/users/{id}/friends/common/{other_id}",
            web::get().to(common_friends),
        );
}

async fn list_films(films: Films) -> ApiResult {
    Ok(HttpResponse::Ok().json(films.find_all()?))
}

async fn create_film(films: Films, payload: web::Json<FilmPayload>) -> ApiResult {
    Ok(HttpResponse::Created().json(films.create(payload.into_inner())?))
}

async fn update_film(films: Films, payload: web::Json<FilmPayload>) -> ApiResult {
    Ok(HttpResponse::Ok().json(films.update(payload.into_inner())?))
}

async fn get_film(films: Films, path: web::Path<u64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(films.get_by_id(path.into_inner())?))
}

async fn like_film(films: Films, path: web::Path<(u64, u64)>) -> ApiResult {
    let (film_id, user_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(films.add_like(film_id, user_id)?))
}

async fn unlike_film(films: Films, path: web::Path<(u64, u64)>) -> ApiResult {
    let (film_id, user_id) = path.into_inner();
    films.remove_like(film_id, user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[derive(Deserialize)]
struct TopParams {
    count: Option<i64>,
}

async fn top_films(films: Films, params: web::Query<TopParams>) -> ApiResult {
    let count = params.count.unwrap_or(DEFAULT_TOP_COUNT);
    Ok(HttpResponse::Ok().json(films.top_films(count)?))
}

async fn list_users(users: Users) -> ApiResult {
    Ok(HttpResponse::Ok().json(users.find_all()?))
}

async fn create_user(users: Users, payload: web::Json<UserPayload>) -> ApiResult {
    Ok(HttpResponse::Created().json(users.create(payload.into_inner())?))
}

async fn update_user(users: Users, payload: web::Json<UserPayload>) -> ApiResult {
    Ok(HttpResponse::Ok().json(users.update(payload.into_inner())?))
}

async fn get_user(users: Users, path: web::Path<u64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(users.get_by_id(path.into_inner())?))
}

async fn add_friend(users: Users, path: web::Path<(u64, u64)>) -> ApiResult {
    let (id, friend_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(users.add_friend(id, friend_id)?))
}

async fn remove_friend(users: Users, path: web::Path<(u64, u64)>) -> ApiResult {
    let (id, friend_id) = path.into_inner();
    users.remove_friend(id, friend_id)?;
    Ok(HttpResponse::Ok().finish())
}

async fn list_friends(users: Users, path: web::Path<u64>) -> ApiResult {
    Ok(HttpResponse::Ok().json(users.friends(path.into_inner())?))
}

async fn common_friends(users: Users, path: web::Path<(u64, u64)>) -> ApiResult {
    let (id, other_id) = path.into_inner();
    Ok(HttpResponse::Ok().json(users.common_friends(id, other_id)?))
}
