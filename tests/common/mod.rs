//! Shared container helpers for integration tests

#![allow(dead_code)]

use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::{postgres::Postgres, redis::Redis};

/// Start a Redis container and return it with its connection URL
pub async fn start_redis() -> (ContainerAsync<Redis>, String) {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start Redis container");
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(6379).await.unwrap();
    (container, format!("redis://{}:{}", host, port))
}

/// Start a PostgreSQL container and return it with its connection URL
pub async fn start_postgres() -> (ContainerAsync<Postgres>, String) {
    let container = Postgres::default()
        .with_user("coderoulette")
        .with_password("coderoulette_test")
        .with_db_name("coderoulette_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");
    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    (
        container,
        format!(
            "postgres://coderoulette:coderoulette_test@{}:{}/coderoulette_test",
            host, port
        ),
    )
}
