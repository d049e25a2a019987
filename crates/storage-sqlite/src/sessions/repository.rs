use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use uuid::Uuid;

use persona_chat_core::prompts::Exchange;
use persona_chat_core::sessions::{
    ChatMessage, HistoryEntry, NewChatMessage, NewSession, Session, SessionRepositoryTrait,
};
use persona_chat_core::utils::time_utils::now_timestamp;
use persona_chat_core::{Error, Result};

use super::model::{MessageDB, SessionDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{messages, sessions};

pub struct SessionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SessionRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        SessionRepository { pool, writer }
    }
}

fn session_not_found(session_id: &str) -> Error {
    Error::not_found(format!("Session {}", session_id))
}

fn count_messages(conn: &mut SqliteConnection, session_id: &str) -> Result<i64> {
    Ok(messages::table
        .filter(messages::session_id.eq(session_id))
        .count()
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?)
}

fn insert_session(conn: &mut SqliteConnection, new_session: NewSession) -> Result<Session> {
    let now = now_timestamp();
    let row = SessionDB {
        id: new_session
            .id
            .unwrap_or_else(|| Uuid::now_v7().to_string()),
        name: new_session.name,
        mode: new_session.mode,
        created_at: now.clone(),
        updated_at: now,
        is_special: new_session.is_special,
    };
    let stored = diesel::insert_into(sessions::table)
        .values(&row)
        .returning(SessionDB::as_returning())
        .get_result(conn)
        .map_err(StorageError::from)?;
    Ok(stored.into_session(0))
}

fn count_regular_sessions(conn: &mut SqliteConnection, mode: &str) -> Result<i64> {
    Ok(sessions::table
        .filter(sessions::mode.eq(mode))
        .filter(sessions::is_special.eq(false))
        .count()
        .get_result::<i64>(conn)
        .map_err(StorageError::from)?)
}

fn insert_message(conn: &mut SqliteConnection, message: NewChatMessage) -> Result<ChatMessage> {
    let now = now_timestamp();
    let touched = diesel::update(sessions::table.find(&message.session_id))
        .set(sessions::updated_at.eq(&now))
        .execute(conn)
        .map_err(StorageError::from)?;
    if touched == 0 {
        return Err(session_not_found(&message.session_id));
    }

    let row = MessageDB {
        id: Uuid::now_v7().to_string(),
        session_id: message.session_id,
        user_message: message.user_message,
        ai_response: message.ai_response,
        mode: message.mode,
        timestamp: now,
    };
    diesel::insert_into(messages::table)
        .values(&row)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(ChatMessage::from(row))
}

#[async_trait]
impl SessionRepositoryTrait for SessionRepository {
    fn list_sessions(&self) -> Result<Vec<Session>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = sessions::table
            .order((sessions::updated_at.desc(), sessions::id.desc()))
            .select(SessionDB::as_select())
            .load::<SessionDB>(&mut conn)
            .into_core()?;

        let counts: HashMap<String, i64> = messages::table
            .group_by(messages::session_id)
            .select((messages::session_id, count_star()))
            .load::<(String, i64)>(&mut conn)
            .into_core()?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let count = counts.get(&row.id).copied().unwrap_or(0);
                row.into_session(count)
            })
            .collect())
    }

    fn get_session(&self, session_id: &str) -> Result<Session> {
        let mut conn = get_connection(&self.pool)?;
        let row = sessions::table
            .find(session_id)
            .select(SessionDB::as_select())
            .first::<SessionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| session_not_found(session_id))?;
        let count = count_messages(&mut conn, session_id)?;
        Ok(row.into_session(count))
    }

    async fn create_session(&self, new_session: NewSession) -> Result<Session> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| insert_session(conn, new_session))
            .await
    }

    async fn create_numbered_session(&self, prefix: String, mode: String) -> Result<Session> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Session> {
                let existing = count_regular_sessions(conn, &mode)?;
                insert_session(
                    conn,
                    NewSession {
                        id: None,
                        name: format!("{} {}", prefix, existing + 1),
                        mode,
                        is_special: false,
                    },
                )
            })
            .await
    }

    async fn create_session_with_message(
        &self,
        new_session: NewSession,
        user_message: String,
        ai_response: String,
    ) -> Result<(Session, ChatMessage)> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<(Session, ChatMessage)> {
                let session = insert_session(conn, new_session)?;
                let message = insert_message(
                    conn,
                    NewChatMessage {
                        session_id: session.id.clone(),
                        user_message,
                        ai_response,
                        mode: session.mode.clone(),
                    },
                )?;
                Ok((
                    Session {
                        updated_at: message.timestamp,
                        message_count: 1,
                        ..session
                    },
                    message,
                ))
            })
            .await
    }

    async fn rename_session(&self, session_id: String, name: String) -> Result<Session> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Session> {
                let row = diesel::update(sessions::table.find(&session_id))
                    .set(sessions::name.eq(&name))
                    .returning(SessionDB::as_returning())
                    .get_result(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| session_not_found(&session_id))?;
                let count = count_messages(conn, &session_id)?;
                Ok(row.into_session(count))
            })
            .await
    }

    async fn delete_session(&self, session_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Cascades too, but connections opened without the pragma
                // would leave orphans behind.
                diesel::delete(messages::table.filter(messages::session_id.eq(&session_id)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(diesel::delete(sessions::table.find(&session_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    fn get_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = messages::table
            .filter(messages::session_id.eq(session_id))
            .order((messages::timestamp.asc(), messages::id.asc()))
            .select(MessageDB::as_select())
            .load::<MessageDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    fn recent_exchanges(&self, session_id: &str, limit: usize) -> Result<Vec<Exchange>> {
        let mut conn = get_connection(&self.pool)?;
        let mut rows = messages::table
            .filter(messages::session_id.eq(session_id))
            .order((messages::timestamp.desc(), messages::id.desc()))
            .limit(limit as i64)
            .select((messages::user_message, messages::ai_response))
            .load::<(String, String)>(&mut conn)
            .into_core()?;
        rows.reverse();
        Ok(rows
            .into_iter()
            .map(|(user_message, ai_response)| Exchange::new(user_message, ai_response))
            .collect())
    }

    async fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| insert_message(conn, message))
            .await
    }

    async fn reset(&self, fresh: NewSession) -> Result<Session> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Session> {
                diesel::delete(messages::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                diesel::delete(sessions::table)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                insert_session(conn, fresh)
            })
            .await
    }

    fn recent_history(&self, limit: i64) -> Result<Vec<HistoryEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = messages::table
            .left_join(sessions::table)
            .order((messages::timestamp.desc(), messages::id.desc()))
            .limit(limit)
            .select((MessageDB::as_select(), sessions::name.nullable()))
            .load::<(MessageDB, Option<String>)>(&mut conn)
            .into_core()?;
        Ok(rows
            .into_iter()
            .map(|(row, session_name)| row.into_history_entry(session_name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use tempfile::{tempdir, TempDir};

    fn create_test_repository() -> (SessionRepository, TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (SessionRepository::new(pool, writer), temp_dir)
    }

    fn new_session(name: &str, mode: &str) -> NewSession {
        NewSession {
            id: None,
            name: name.to_string(),
            mode: mode.to_string(),
            is_special: false,
        }
    }

    fn turn(session_id: &str, n: usize) -> NewChatMessage {
        NewChatMessage {
            session_id: session_id.to_string(),
            user_message: format!("question {}", n),
            ai_response: format!("answer {}", n),
            mode: "general".to_string(),
        }
    }

    #[tokio::test]
    async fn appending_bumps_updated_at_and_count() {
        let (repo, _dir) = create_test_repository();
        let older = repo.create_session(new_session("Older", "general")).await.unwrap();
        let newer = repo.create_session(new_session("Newer", "coding")).await.unwrap();

        repo.append_message(turn(&older.id, 1)).await.unwrap();

        let listed = repo.list_sessions().unwrap();
        assert_eq!(listed[0].id, older.id);
        assert_eq!(listed[0].message_count, 1);
        assert!(listed[0].updated_at >= older.updated_at);
        assert_eq!(listed[1].id, newer.id);
        assert_eq!(listed[1].message_count, 0);
    }

    #[tokio::test]
    async fn appending_to_missing_session_is_not_found() {
        let (repo, _dir) = create_test_repository();
        let err = repo.append_message(turn("ghost", 1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn messages_come_back_oldest_first() {
        let (repo, _dir) = create_test_repository();
        let session = repo.create_session(new_session("Chat 1", "general")).await.unwrap();
        for n in 1..=5 {
            repo.append_message(turn(&session.id, n)).await.unwrap();
        }

        let all = repo.get_messages(&session.id).unwrap();
        let texts: Vec<&str> = all.iter().map(|m| m.user_message.as_str()).collect();
        assert_eq!(
            texts,
            vec!["question 1", "question 2", "question 3", "question 4", "question 5"]
        );

        let recent = repo.recent_exchanges(&session.id, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0], Exchange::new("question 3", "answer 3"));
        assert_eq!(recent[2], Exchange::new("question 5", "answer 5"));
    }

    #[tokio::test]
    async fn deleting_a_session_removes_its_messages() {
        let (repo, _dir) = create_test_repository();
        let doomed = repo.create_session(new_session("Doomed", "general")).await.unwrap();
        let kept = repo.create_session(new_session("Kept", "general")).await.unwrap();
        repo.append_message(turn(&doomed.id, 1)).await.unwrap();
        repo.append_message(turn(&kept.id, 1)).await.unwrap();

        assert_eq!(repo.delete_session(doomed.id.clone()).await.unwrap(), 1);
        assert_eq!(repo.delete_session(doomed.id.clone()).await.unwrap(), 0);
        assert!(repo.get_messages(&doomed.id).unwrap().is_empty());
        assert!(repo.get_session(&doomed.id).unwrap_err().is_not_found());
        assert_eq!(repo.get_session(&kept.id).unwrap().message_count, 1);
    }

    #[tokio::test]
    async fn rename_keeps_count_and_reports_missing() {
        let (repo, _dir) = create_test_repository();
        let session = repo.create_session(new_session("Draft", "creative")).await.unwrap();
        repo.append_message(turn(&session.id, 1)).await.unwrap();

        let renamed = repo
            .rename_session(session.id.clone(), "Novel Planning".into())
            .await
            .unwrap();
        assert_eq!(renamed.name, "Novel Planning");
        assert_eq!(renamed.message_count, 1);

        let err = repo
            .rename_session("ghost".into(), "x".into())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn numbered_sessions_count_regular_sessions_in_mode() {
        let (repo, _dir) = create_test_repository();
        repo.create_session(new_session("Chat 1", "general")).await.unwrap();
        repo.create_session(new_session("Code", "coding")).await.unwrap();
        repo.create_session(NewSession {
            is_special: true,
            ..new_session("Pinned", "general")
        })
        .await
        .unwrap();

        let next = repo
            .create_numbered_session("Chat".into(), "general".into())
            .await
            .unwrap();
        assert_eq!(next.name, "Chat 2");
        assert_eq!(next.mode, "general");
        assert!(!next.is_special);
    }

    #[tokio::test]
    async fn concurrent_numbered_sessions_get_distinct_names() {
        let (repo, _dir) = create_test_repository();
        let repo = Arc::new(repo);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_numbered_session("Chat".into(), "general".into())
                        .await
                        .unwrap()
                        .name
                })
            })
            .collect();

        let mut names = Vec::new();
        for handle in handles {
            names.push(handle.await.unwrap());
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"Chat 8".to_string()));
    }

    #[tokio::test]
    async fn session_and_first_message_are_stored_together() {
        let (repo, _dir) = create_test_repository();
        let (session, message) = repo
            .create_session_with_message(
                new_session("Trip", "creative"),
                "plan a trip".into(),
                "sure".into(),
            )
            .await
            .unwrap();

        assert_eq!(session.message_count, 1);
        assert_eq!(message.session_id, session.id);
        assert_eq!(message.mode, "creative");
        let stored = repo.get_session(&session.id).unwrap();
        assert_eq!(stored.message_count, 1);
        assert_eq!(repo.get_messages(&session.id).unwrap(), vec![message]);
    }

    #[tokio::test]
    async fn clashing_first_turn_stores_nothing() {
        let (repo, _dir) = create_test_repository();
        let taken = repo.create_session(new_session("Taken", "general")).await.unwrap();

        let err = repo
            .create_session_with_message(
                NewSession {
                    id: Some(taken.id.clone()),
                    ..new_session("Clash", "general")
                },
                "hi".into(),
                "hello".into(),
            )
            .await;
        assert!(err.is_err());
        let listed = repo.list_sessions().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Taken");
        assert!(repo.recent_history(10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_leaves_only_the_fresh_session() {
        let (repo, _dir) = create_test_repository();
        let old = repo.create_session(new_session("Old", "coding")).await.unwrap();
        repo.append_message(turn(&old.id, 1)).await.unwrap();

        let fresh = repo.reset(new_session("Chat 1", "general")).await.unwrap();
        let listed = repo.list_sessions().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, fresh.id);
        assert!(repo.recent_history(100).unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_newest_first_with_session_names() {
        let (repo, _dir) = create_test_repository();
        let session = repo.create_session(new_session("Trip", "general")).await.unwrap();
        for n in 1..=3 {
            repo.append_message(turn(&session.id, n)).await.unwrap();
        }

        let history = repo.recent_history(2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "question 3");
        assert_eq!(history[0].session_name.as_deref(), Some("Trip"));
        assert_eq!(history[1].user_message, "question 2");
    }
}
