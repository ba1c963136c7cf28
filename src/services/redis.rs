//! Redis-backed visitor sessions

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// Per-session state kept between requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Count a visit of the index page; returns the number of earlier visits
    async fn record_visit(&self, session_id: &str) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct RedisService {
    client: Client,
    session_ttl_seconds: u64,
}

impl RedisService {
    /// Create a Redis client without connecting
    pub fn open(url: &str, session_ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self {
            client,
            session_ttl_seconds,
        })
    }

    /// Create a Redis service and check the server answers
    pub async fn new(url: &str, session_ttl_seconds: u64) -> AppResult<Self> {
        let service = Self::open(url, session_ttl_seconds)?;
        let mut conn = service.get_connection().await?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(service)
    }

    /// Get a Redis connection
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

pub(crate) fn visits_key(session_id: &str) -> String {
    format!("session:{}:num_visits", session_id)
}

#[async_trait]
impl SessionStore for RedisService {
    async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let mut conn = self.get_connection().await?;
        let key = visits_key(session_id);

        let visits: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count visit in Redis: {}", e)))?;

        // sliding expiry, refreshed on every visit
        let ttl = i64::try_from(self.session_ttl_seconds).unwrap_or(i64::MAX);
        conn.expire::<_, ()>(&key, ttl)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh session in Redis: {}", e)))?;

        Ok(visits - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visits_key() {
        assert_eq!(visits_key("abc"), "session:abc:num_visits");
    }

    #[test]
    fn test_open_does_not_connect() {
        assert!(RedisService::open("redis://127.0.0.1:1", 60).is_ok());
        assert!(RedisService::open("not a url", 60).is_err());
    }
}
