#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, User};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn register(engine: &Engine, username: &str) -> User {
    engine
        .register(username, &format!("{username}@example.com"), "password")
        .await
        .unwrap()
}

pub async fn befriend(engine: &Engine, a: &User, b: &User) {
    engine.send_friend_request(a.id, b.id).await.unwrap();
    engine.accept_friend_request(b.id, a.id).await.unwrap();
}

/// A fixed instant in the middle of October 2026.
pub fn mid_october() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
}
