use log::warn;
use rusqlite::Connection;
use std::path::Path;

/// Opens a connection for one request. Foreign keys are enforced per
/// connection in SQLite, so this is the only place connections come from.
pub fn open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    Ok(conn)
}

/// Creates the schema if it does not exist yet. Safe to call on every start.
pub fn init(path: &Path) -> rusqlite::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("could not create database directory {}: {}", parent.display(), e);
            }
        }
    }
    let conn = open(path)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            display_name TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS auth_tokens(
            token TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY(teacher_id) REFERENCES teachers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES teachers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_courses_owner ON courses(owner_id)",
        [],
    )?;

    // course_id is nullified by hand when a course goes away, so no FK on it.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS materials(
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            course_id TEXT,
            title TEXT NOT NULL,
            file_name TEXT,
            file_path TEXT,
            content TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES teachers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_materials_owner_course ON materials(owner_id, course_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS quizzes(
            id TEXT PRIMARY KEY,
            material_id TEXT NOT NULL,
            title TEXT NOT NULL,
            questions TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(material_id) REFERENCES materials(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_quizzes_material ON quizzes(material_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS public_links(
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            resource_id TEXT NOT NULL,
            resource_type TEXT NOT NULL,
            short_code TEXT NOT NULL UNIQUE,
            view_only INTEGER NOT NULL,
            allow_copy INTEGER NOT NULL,
            password_hash TEXT,
            expires_at TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES teachers(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS student_results(
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            student_identifier TEXT NOT NULL,
            quiz_id TEXT NOT NULL,
            score INTEGER NOT NULL,
            weak_topics TEXT NOT NULL,
            submission_date TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES teachers(id),
            FOREIGN KEY(quiz_id) REFERENCES quizzes(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_student_results_owner ON student_results(owner_id, quiz_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignment_submissions(
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            share_code TEXT NOT NULL,
            material_id TEXT NOT NULL,
            student_name TEXT NOT NULL,
            student_key TEXT NOT NULL,
            accuracy INTEGER,
            manual_score INTEGER,
            response_text TEXT,
            file_name TEXT,
            file_path TEXT,
            feedback TEXT,
            questions TEXT NOT NULL,
            status TEXT NOT NULL,
            course_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(share_code, student_key),
            FOREIGN KEY(owner_id) REFERENCES teachers(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_submissions_owner_course ON assignment_submissions(owner_id, course_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_comments(
            owner_id TEXT NOT NULL,
            course_id TEXT NOT NULL,
            student_key TEXT NOT NULL,
            comment TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY(owner_id, course_id, student_key)
        )",
        [],
    )?;

    Ok(())
}

/// True when `err` is a UNIQUE/PRIMARY KEY violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_flags_unique_violations() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("edustream.sqlite");
        init(&path).expect("first init");
        init(&path).expect("second init");

        let conn = open(&path).expect("open");
        conn.execute(
            "INSERT INTO teachers(id, email, password_hash, created_at) VALUES ('t1', 'a@b.c', 'x', '2024-01-01')",
            [],
        )
        .expect("insert");
        let err = conn
            .execute(
                "INSERT INTO teachers(id, email, password_hash, created_at) VALUES ('t2', 'a@b.c', 'x', '2024-01-01')",
                [],
            )
            .expect_err("duplicate email");
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn init_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("nested").join("edustream.sqlite");
        init(&path).expect("init");
        assert!(path.exists());
    }

    #[test]
    fn unusable_parent_fails_at_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").expect("write");
        assert!(init(&blocker.join("edustream.sqlite")).is_err());
    }
}
